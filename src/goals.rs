// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Savings goals: how far along they are, what is left, and the running
//! total of contributions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Goal, GoalDraft};

/// Category of the expense transaction each contribution creates.
pub const GOALS_CATEGORY: &str = "Metas";
pub const DEFAULT_GOAL_CATEGORY: &str = "Reserva de Emergência";
pub const DEFAULT_GOAL_ICON: &str = "piggy";
pub const DEFAULT_GOAL_COLOR: &str = "hsl(var(--primary))";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GoalError {
    #[error("goal title is empty")]
    MissingTitle,
    #[error("goal target must be positive, got {0}")]
    InvalidTarget(Decimal),
    #[error("current amount cannot be negative, got {0}")]
    NegativeCurrent(Decimal),
    #[error("contribution must be positive, got {0}")]
    InvalidContribution(Decimal),
}

impl GoalDraft {
    pub fn validate(&self) -> Result<(), GoalError> {
        if self.title.trim().is_empty() {
            return Err(GoalError::MissingTitle);
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(GoalError::InvalidTarget(self.target_amount));
        }
        if self.current_amount < Decimal::ZERO {
            return Err(GoalError::NegativeCurrent(self.current_amount));
        }
        Ok(())
    }
}

impl Goal {
    /// Percentage of the target already saved, between 0 and 100.
    pub fn progress(&self) -> Decimal {
        if self.target_amount.is_zero() {
            return Decimal::ZERO;
        }
        let pct = self.current_amount / self.target_amount * Decimal::ONE_HUNDRED;
        pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED).round_dp(2)
    }

    /// Amount still missing; zero once the target is met or exceeded.
    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    pub fn is_reached(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Saved amount after adding `amount`.
    pub fn contributed(&self, amount: Decimal) -> Result<Decimal, GoalError> {
        if amount <= Decimal::ZERO {
            return Err(GoalError::InvalidContribution(amount));
        }
        Ok(self.current_amount + amount)
    }
}

/// Sum of what is still missing across `goals`.
pub fn remaining_total(goals: &[Goal]) -> Decimal {
    goals.iter().map(Goal::remaining).sum()
}

pub fn contribution_description(title: &str) -> String {
    format!("Contribuição para: {}", title)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value: Decimal,
    pub cumulative: Decimal,
}

/// Contributions in date order with their running total. Same-day entries
/// keep their input order.
pub fn contribution_history(contributions: &[(NaiveDate, Decimal)]) -> Vec<HistoryPoint> {
    let mut sorted = contributions.to_vec();
    sorted.sort_by_key(|(date, _)| *date);
    let mut cumulative = Decimal::ZERO;
    sorted
        .into_iter()
        .map(|(date, value)| {
            cumulative += value;
            HistoryPoint {
                date,
                value,
                cumulative,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target: i64, current: i64) -> Goal {
        Goal {
            id: 1,
            title: "Viagem".into(),
            description: None,
            target_amount: Decimal::from(target),
            current_amount: Decimal::from(current),
            deadline: None,
            category: DEFAULT_GOAL_CATEGORY.into(),
            icon: DEFAULT_GOAL_ICON.into(),
            color: DEFAULT_GOAL_COLOR.into(),
            group_id: None,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(goal(1000, 250).progress(), Decimal::from(25));
        assert_eq!(goal(3, 1).progress(), Decimal::new(3333, 2));
        assert_eq!(goal(1000, 1500).progress(), Decimal::ONE_HUNDRED);
        assert_eq!(goal(0, 10).progress(), Decimal::ZERO);
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(goal(1000, 250).remaining(), Decimal::from(750));
        assert_eq!(goal(1000, 1500).remaining(), Decimal::ZERO);
        assert!(goal(1000, 1000).is_reached());
        assert_eq!(
            remaining_total(&[goal(1000, 250), goal(500, 800), goal(200, 0)]),
            Decimal::from(950)
        );
    }

    #[test]
    fn contributions_must_be_positive() {
        let g = goal(1000, 250);
        assert_eq!(g.contributed(Decimal::from(50)), Ok(Decimal::from(300)));
        assert_eq!(
            g.contributed(Decimal::ZERO),
            Err(GoalError::InvalidContribution(Decimal::ZERO))
        );
        assert!(g.contributed(Decimal::from(-5)).is_err());
    }

    #[test]
    fn draft_validation() {
        let mut draft = GoalDraft {
            title: "Carro".into(),
            description: None,
            target_amount: Decimal::from(30000),
            current_amount: Decimal::ZERO,
            deadline: Some(ymd(2026, 12, 31)),
            category: DEFAULT_GOAL_CATEGORY.into(),
            icon: DEFAULT_GOAL_ICON.into(),
            color: DEFAULT_GOAL_COLOR.into(),
            group_id: None,
        };
        assert_eq!(draft.validate(), Ok(()));
        draft.current_amount = Decimal::from(-1);
        assert_eq!(draft.validate(), Err(GoalError::NegativeCurrent(Decimal::from(-1))));
        draft.target_amount = Decimal::ZERO;
        assert_eq!(draft.validate(), Err(GoalError::InvalidTarget(Decimal::ZERO)));
        draft.title = "  ".into();
        assert_eq!(draft.validate(), Err(GoalError::MissingTitle));
    }

    #[test]
    fn history_accumulates_in_date_order() {
        let points = contribution_history(&[
            (ymd(2024, 3, 1), Decimal::from(200)),
            (ymd(2024, 1, 10), Decimal::from(100)),
            (ymd(2024, 3, 1), Decimal::from(50)),
        ]);
        let summary: Vec<_> = points.iter().map(|p| (p.date, p.cumulative)).collect();
        assert_eq!(
            summary,
            vec![
                (ymd(2024, 1, 10), Decimal::from(100)),
                (ymd(2024, 3, 1), Decimal::from(300)),
                (ymd(2024, 3, 1), Decimal::from(350)),
            ]
        );
    }
}
