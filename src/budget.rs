// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Percentage-of-income budget envelopes and the categories that feed them.
//! Used for reporting only; nothing here blocks spending.

use rust_decimal::Decimal;
use serde::Serialize;

pub const UNBUCKETED: &str = "Sem categoria";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BudgetBucket {
    LiberdadeFinanceira,
    CustosFixos,
    Conforto,
    Metas,
    Prazeres,
    Conhecimento,
}

impl BudgetBucket {
    pub const ALL: [BudgetBucket; 6] = [
        BudgetBucket::LiberdadeFinanceira,
        BudgetBucket::CustosFixos,
        BudgetBucket::Conforto,
        BudgetBucket::Metas,
        BudgetBucket::Prazeres,
        BudgetBucket::Conhecimento,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BudgetBucket::LiberdadeFinanceira => "liberdade-financeira",
            BudgetBucket::CustosFixos => "custos-fixos",
            BudgetBucket::Conforto => "conforto",
            BudgetBucket::Metas => "metas",
            BudgetBucket::Prazeres => "prazeres",
            BudgetBucket::Conhecimento => "conhecimento",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BudgetBucket::LiberdadeFinanceira => "Liberdade Financeira",
            BudgetBucket::CustosFixos => "Custos Fixos",
            BudgetBucket::Conforto => "Conforto",
            BudgetBucket::Metas => "Metas",
            BudgetBucket::Prazeres => "Prazeres",
            BudgetBucket::Conhecimento => "Conhecimento",
        }
    }

    /// Share of monthly income, in percent.
    pub fn default_percentage(&self) -> u32 {
        match self {
            BudgetBucket::LiberdadeFinanceira => 25,
            BudgetBucket::CustosFixos => 30,
            BudgetBucket::Conforto => 15,
            BudgetBucket::Metas => 15,
            BudgetBucket::Prazeres => 10,
            BudgetBucket::Conhecimento => 5,
        }
    }

    pub fn transaction_categories(&self) -> &'static [&'static str] {
        match self {
            BudgetBucket::LiberdadeFinanceira => &["Investimentos", "Poupança", "Reserva"],
            BudgetBucket::CustosFixos => &[
                "Casa", "Contas", "Aluguel", "Água", "Luz", "Internet", "Telefone",
            ],
            BudgetBucket::Conforto => &["Alimentação", "Transporte", "Saúde", "Mercado"],
            BudgetBucket::Metas => &["Viagem", "Reservas", "Objetivos"],
            BudgetBucket::Prazeres => &["Lazer", "Compras", "Entretenimento", "Restaurante"],
            BudgetBucket::Conhecimento => &["Educação", "Livros", "Cursos"],
        }
    }

    pub fn for_category(category: &str) -> Option<BudgetBucket> {
        let wanted = category.trim().to_lowercase();
        BudgetBucket::ALL.into_iter().find(|b| {
            b.transaction_categories()
                .iter()
                .any(|c| c.to_lowercase() == wanted)
        })
    }

    pub fn planned(&self, income: Decimal) -> Decimal {
        income * Decimal::from(self.default_percentage()) / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketTotals {
    /// Every bucket, in [`BudgetBucket::ALL`] order.
    pub buckets: Vec<(BudgetBucket, Decimal)>,
    /// Expenses whose category maps to no bucket; `None` when there are none.
    pub unbucketed: Option<Decimal>,
}

impl BucketTotals {
    pub fn get(&self, bucket: BudgetBucket) -> Decimal {
        self.buckets
            .iter()
            .find(|(b, _)| *b == bucket)
            .map(|(_, v)| *v)
            .unwrap_or(Decimal::ZERO)
    }
}

pub fn group_expenses_by_bucket<'a, I>(expenses: I) -> BucketTotals
where
    I: IntoIterator<Item = (&'a str, Decimal)>,
{
    let mut buckets: Vec<(BudgetBucket, Decimal)> = BudgetBucket::ALL
        .into_iter()
        .map(|b| (b, Decimal::ZERO))
        .collect();
    let mut rest = Decimal::ZERO;
    for (category, amount) in expenses {
        match BudgetBucket::for_category(category) {
            Some(bucket) => {
                if let Some(slot) = buckets.iter_mut().find(|(b, _)| *b == bucket) {
                    slot.1 += amount;
                }
            }
            None => rest += amount,
        }
    }
    BucketTotals {
        buckets,
        unbucketed: (!rest.is_zero()).then_some(rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_cover_all_income() {
        let total: u32 = BudgetBucket::ALL.iter().map(|b| b.default_percentage()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn category_lookup_ignores_case() {
        assert_eq!(BudgetBucket::for_category("mercado"), Some(BudgetBucket::Conforto));
        assert_eq!(BudgetBucket::for_category("ÁGUA"), Some(BudgetBucket::CustosFixos));
        assert_eq!(BudgetBucket::for_category("Pets"), None);
    }

    #[test]
    fn grouping_collects_unmapped_separately() {
        let expenses = vec![
            ("Mercado", Decimal::new(300, 0)),
            ("Luz", Decimal::new(120, 0)),
            ("Transporte", Decimal::new(80, 0)),
            ("Pets", Decimal::new(45, 0)),
        ];
        let totals = group_expenses_by_bucket(expenses);
        assert_eq!(totals.get(BudgetBucket::Conforto), Decimal::new(380, 0));
        assert_eq!(totals.get(BudgetBucket::CustosFixos), Decimal::new(120, 0));
        assert_eq!(totals.get(BudgetBucket::Metas), Decimal::ZERO);
        assert_eq!(totals.unbucketed, Some(Decimal::new(45, 0)));

        let clean = group_expenses_by_bucket(vec![("Livros", Decimal::ONE)]);
        assert_eq!(clean.unbucketed, None);
        assert_eq!(clean.buckets.len(), 6);
    }

    #[test]
    fn planned_share_of_income() {
        let income = Decimal::new(1000000, 2);
        assert_eq!(BudgetBucket::CustosFixos.planned(income), Decimal::new(3000, 0));
    }
}
