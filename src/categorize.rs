// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Keyword based auto-categorization of transaction descriptions.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::models::{TxKind, UserCategory};

pub const FALLBACK_CATEGORY: &str = "Outros";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub name: String,
    pub kind: TxKind,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: &str, kind: TxKind, keywords: &[&str]) -> Self {
        CategoryRule {
            name: name.to_string(),
            kind,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl From<&UserCategory> for CategoryRule {
    fn from(c: &UserCategory) -> Self {
        CategoryRule {
            name: c.name.clone(),
            kind: c.kind,
            keywords: c.keywords.clone(),
        }
    }
}

static DEFAULT_RULES: Lazy<Vec<CategoryRule>> = Lazy::new(|| {
    use TxKind::Expense;
    vec![
        CategoryRule::new(
            "Transporte",
            Expense,
            &["uber", "99", "taxi", "posto", "estacionamento", "shell", "ipiranga"],
        ),
        CategoryRule::new(
            "Alimentação",
            Expense,
            &["ifood", "restaurante", "burger", "pizza", "mcdonalds", "padaria"],
        ),
        CategoryRule::new(
            "Mercado",
            Expense,
            &["mercado", "carrefour", "extra", "atacadão", "pão de açúcar", "walmart"],
        ),
        CategoryRule::new(
            "Saúde",
            Expense,
            &["farmacia", "farmácia", "drogaria", "hospital", "medico", "médico", "doutor"],
        ),
        CategoryRule::new(
            "Lazer",
            Expense,
            &["netflix", "spotify", "cinema", "steam", "prime", "hbo"],
        ),
        CategoryRule::new(
            "Contas",
            Expense,
            &["luz", "agua", "água", "energia", "internet", "claro", "vivo", "tim", "oi", "net"],
        ),
        CategoryRule::new(
            "Educação",
            Expense,
            &["curso", "udemy", "alura", "escola", "faculdade"],
        ),
        CategoryRule::new(
            "Casa",
            Expense,
            &["leroy", "telhanorte", "casa", "condominio", "condomínio", "aluguel"],
        ),
    ]
});

pub fn default_rules() -> &'static [CategoryRule] {
    &DEFAULT_RULES
}

struct CompiledRule {
    name: String,
    kind: TxKind,
    patterns: Vec<Regex>,
}

/// Ordered keyword matcher. Keywords match whole words, ignoring case, and
/// the first rule with a hit wins.
pub struct Categorizer {
    rules: Vec<CompiledRule>,
}

impl Categorizer {
    pub fn new(rules: &[CategoryRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledRule {
                name: rule.name.clone(),
                kind: rule.kind,
                patterns: rule
                    .keywords
                    .iter()
                    .filter_map(|kw| keyword_pattern(kw))
                    .collect(),
            })
            .filter(|rule| !rule.patterns.is_empty())
            .collect();
        Categorizer { rules }
    }

    /// User rules first, then the built-in list.
    pub fn with_defaults(user_rules: &[CategoryRule]) -> Self {
        let mut all = user_rules.to_vec();
        all.extend_from_slice(default_rules());
        Categorizer::new(&all)
    }

    pub fn categorize(&self, text: &str, kind: TxKind) -> Option<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.kind == kind)
            .find(|rule| rule.patterns.iter().any(|re| re.is_match(text)))
            .map(|rule| rule.name.as_str())
    }

    pub fn categorize_or_default(&self, text: &str, kind: TxKind) -> &str {
        self.categorize(text, kind).unwrap_or(FALLBACK_CATEGORY)
    }
}

fn keyword_pattern(keyword: &str) -> Option<Regex> {
    let kw = keyword.trim();
    if kw.is_empty() {
        return None;
    }
    // Explicit non-word guards instead of \b so keywords may start or end
    // with punctuation.
    let src = format!(r"(?i)(?:^|\W){}(?:$|\W)", regex::escape(kw));
    match Regex::new(&src) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(keyword = kw, error = %err, "skipping unusable keyword");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_whole_words_only() {
        let c = Categorizer::with_defaults(&[]);
        assert_eq!(c.categorize("UBER *TRIP", TxKind::Expense), Some("Transporte"));
        assert_eq!(c.categorize("Pão de Açúcar loja 12", TxKind::Expense), Some("Mercado"));
        // "oi" must not fire inside "biscoito", nor "net" inside "netflix".
        assert_eq!(c.categorize("biscoito", TxKind::Expense), None);
        assert_eq!(c.categorize("NETFLIX.COM", TxKind::Expense), Some("Lazer"));
    }

    #[test]
    fn first_rule_in_order_wins() {
        let rules = vec![
            CategoryRule::new("Pets", TxKind::Expense, &["petz", "casa"]),
            CategoryRule::new("Casa", TxKind::Expense, &["casa"]),
        ];
        let c = Categorizer::new(&rules);
        assert_eq!(c.categorize("Casa das Rações", TxKind::Expense), Some("Pets"));
    }

    #[test]
    fn user_rules_precede_defaults_and_respect_kind() {
        let user = vec![
            CategoryRule::new("Delivery", TxKind::Expense, &["ifood"]),
            CategoryRule::new("Salário", TxKind::Income, &["folha de pagamento"]),
        ];
        let c = Categorizer::with_defaults(&user);
        assert_eq!(c.categorize("IFOOD *pedido", TxKind::Expense), Some("Delivery"));
        assert_eq!(c.categorize("Folha de Pagamento ACME", TxKind::Income), Some("Salário"));
        assert_eq!(c.categorize("Folha de Pagamento ACME", TxKind::Expense), None);
        assert_eq!(c.categorize_or_default("uber", TxKind::Income), FALLBACK_CATEGORY);
    }

    #[test]
    fn blank_keywords_are_dropped() {
        let rules = vec![CategoryRule::new("Vazio", TxKind::Expense, &["", "  "])];
        let c = Categorizer::new(&rules);
        assert_eq!(c.categorize("anything", TxKind::Expense), None);
    }
}
