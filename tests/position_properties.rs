// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Days, NaiveDate};
use organiza::models::{InvestmentTransaction, Side};
use organiza::positions::calculate_positions;
use proptest::prelude::*;
use proptest::test_runner::Config;
use rust_decimal::Decimal;

fn buy(ticker: &str, qty: u32, price_cents: u32, fee_cents: u32, day: u64) -> InvestmentTransaction {
    InvestmentTransaction {
        ticker: ticker.to_string(),
        asset_name: String::new(),
        asset_type: String::new(),
        side: Side::Buy,
        quantity: Decimal::from(qty),
        price: Decimal::new(i64::from(price_cents), 2),
        fees: Decimal::new(i64::from(fee_cents), 2),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(day),
    }
}

fn sell(ticker: &str, qty: Decimal, date: NaiveDate) -> InvestmentTransaction {
    InvestmentTransaction {
        side: Side::Sell,
        quantity: qty,
        price: Decimal::new(1234, 2),
        fees: Decimal::ZERO,
        date,
        ..buy(ticker, 0, 0, 0, 0)
    }
}

fn buys() -> impl Strategy<Value = Vec<(u32, u32, u32, u64)>> {
    prop::collection::vec((1_u32..1_000, 1_u32..100_000, 0_u32..500, 0_u64..365), 1..20)
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn buys_only_sum_quantity_and_cost(trades in buys()) {
        let txs: Vec<_> = trades
            .iter()
            .map(|&(q, p, f, d)| buy("ITSA4", q, p, f, d))
            .collect();
        let positions = calculate_positions(&txs);
        prop_assert_eq!(positions.len(), 1);
        let qty: Decimal = txs.iter().map(|t| t.quantity).sum();
        let cost: Decimal = txs.iter().map(|t| t.quantity * t.price + t.fees).sum();
        prop_assert_eq!(positions[0].quantity, qty);
        prop_assert_eq!(positions[0].total_cost, cost);
    }

    #[test]
    fn selling_everything_closes_the_position(trades in buys()) {
        let mut txs: Vec<_> = trades
            .iter()
            .map(|&(q, p, f, d)| buy("BBAS3.SA", q, p, f, d))
            .collect();
        let total: Decimal = txs.iter().map(|t| t.quantity).sum();
        txs.push(sell("bbas3", total, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        prop_assert!(calculate_positions(&txs).is_empty());
    }

    #[test]
    fn partial_sell_keeps_average_price(trades in buys(), pct in 1_u32..100) {
        let txs: Vec<_> = trades
            .iter()
            .map(|&(q, p, f, d)| buy("WEGE3", q, p, f, d))
            .collect();
        let before = calculate_positions(&txs)[0].average_price;

        let total: Decimal = txs.iter().map(|t| t.quantity).sum();
        let sold = total * Decimal::from(pct) / Decimal::ONE_HUNDRED;
        let mut after_sell = txs.clone();
        after_sell.push(sell("WEGE3", sold, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        let after = calculate_positions(&after_sell);

        prop_assert_eq!(after.len(), 1);
        prop_assert_eq!(after[0].quantity, total - sold);
        prop_assert_eq!(after[0].average_price.round_dp(8), before.round_dp(8));
    }
}
