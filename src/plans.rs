// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Subscription plans and the quotas they grant.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown plan '{0}', expected free|basic|advanced")]
pub struct PlanError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    #[default]
    Free,
    Basic,
    Advanced,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "free",
            PlanType::Basic => "basic",
            PlanType::Advanced => "advanced",
        }
    }

    pub fn limits(&self) -> PlanLimits {
        use Limit::{Blocked, Capped, Unlimited};
        match self {
            PlanType::Free => PlanLimits {
                name: "Plano Gratuito",
                monthly_price_cents: 0,
                accounts: Capped(1),
                transactions_per_month: Capped(50),
                goals: Capped(3),
                tasks: Capped(5),
                assets: Blocked,
                groups: Blocked,
                group_members: Blocked,
                reports_history_months: Capped(1),
                forecast_months: Blocked,
                can_export_reports: false,
                has_advanced_analytics: false,
            },
            PlanType::Basic => PlanLimits {
                name: "Plano Básico",
                monthly_price_cents: 990,
                accounts: Capped(3),
                transactions_per_month: Unlimited,
                goals: Capped(10),
                tasks: Unlimited,
                assets: Capped(20),
                groups: Capped(1),
                group_members: Capped(3),
                reports_history_months: Capped(12),
                forecast_months: Capped(3),
                can_export_reports: false,
                has_advanced_analytics: false,
            },
            PlanType::Advanced => PlanLimits {
                name: "Plano Avançado",
                monthly_price_cents: 1590,
                accounts: Unlimited,
                transactions_per_month: Unlimited,
                goals: Unlimited,
                tasks: Unlimited,
                assets: Unlimited,
                groups: Capped(3),
                group_members: Unlimited,
                reports_history_months: Unlimited,
                forecast_months: Capped(12),
                can_export_reports: true,
                has_advanced_analytics: true,
            },
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" | "gratuito" => Ok(PlanType::Free),
            "basic" | "basico" | "básico" => Ok(PlanType::Basic),
            "advanced" | "avancado" | "avançado" => Ok(PlanType::Advanced),
            other => Err(PlanError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "max", rename_all = "lowercase")]
pub enum Limit {
    Blocked,
    Capped(u32),
    Unlimited,
}

impl Limit {
    /// Whether one more item may be created when `current` already exist.
    pub fn allows(&self, current: usize) -> bool {
        match self {
            Limit::Blocked => false,
            Limit::Capped(max) => current < *max as usize,
            Limit::Unlimited => true,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Limit::Blocked)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Blocked => f.write_str("blocked"),
            Limit::Capped(n) => write!(f, "{}", n),
            Limit::Unlimited => f.write_str("unlimited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub name: &'static str,
    pub monthly_price_cents: u32,
    pub accounts: Limit,
    pub transactions_per_month: Limit,
    pub goals: Limit,
    pub tasks: Limit,
    pub assets: Limit,
    pub groups: Limit,
    pub group_members: Limit,
    pub reports_history_months: Limit,
    pub forecast_months: Limit,
    pub can_export_reports: bool,
    pub has_advanced_analytics: bool,
}

/// Quota names understood by the commands that enforce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    TransactionsPerMonth,
    Goals,
    Tasks,
    Assets,
    ForecastMonths,
}

impl Quota {
    pub fn label(&self) -> &'static str {
        match self {
            Quota::TransactionsPerMonth => "transactions per month",
            Quota::Goals => "savings goals",
            Quota::Tasks => "open tasks",
            Quota::Assets => "investment assets",
            Quota::ForecastMonths => "forecast months",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LimitError {
    #[error("{} are not available on the {plan} plan", .quota.label())]
    Blocked { plan: PlanType, quota: Quota },
    #[error("{plan} plan allows at most {max} {}", .quota.label())]
    Reached { plan: PlanType, quota: Quota, max: u32 },
}

impl PlanLimits {
    pub fn limit(&self, quota: Quota) -> Limit {
        match quota {
            Quota::TransactionsPerMonth => self.transactions_per_month,
            Quota::Goals => self.goals,
            Quota::Tasks => self.tasks,
            Quota::Assets => self.assets,
            Quota::ForecastMonths => self.forecast_months,
        }
    }
}

/// Fail when creating one more item would exceed the plan's quota.
pub fn check(plan: PlanType, quota: Quota, current: usize) -> Result<(), LimitError> {
    let limit = plan.limits().limit(quota);
    if limit.allows(current) {
        return Ok(());
    }
    Err(match limit {
        Limit::Capped(max) => LimitError::Reached { plan, quota, max },
        _ => LimitError::Blocked { plan, quota },
    })
}

/// Whether `requested` items fit in the quota at once (used for batch
/// imports and forecast horizons).
pub fn check_total(plan: PlanType, quota: Quota, requested: usize) -> Result<(), LimitError> {
    match requested {
        0 => Ok(()),
        n => check(plan, quota, n - 1),
    }
}
