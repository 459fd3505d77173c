// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::plans::{PlanLimits, PlanType};
use crate::utils::{PLAN_KEY, arg, current_plan, maybe_print_json, pretty_table, set_setting};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Serialize)]
struct PlanView {
    plan: PlanType,
    limits: PlanLimits,
}

fn limit_rows(l: &PlanLimits) -> Vec<Vec<String>> {
    let quotas = [
        ("Accounts", l.accounts),
        ("Transactions / month", l.transactions_per_month),
        ("Goals", l.goals),
        ("Open tasks", l.tasks),
        ("Investment assets", l.assets),
        ("Groups", l.groups),
        ("Group members", l.group_members),
        ("Report history (months)", l.reports_history_months),
        ("Forecast (months)", l.forecast_months),
    ];
    let flags = [
        ("Report export", l.can_export_reports),
        ("Advanced analytics", l.has_advanced_analytics),
    ];
    let yes_no = |b: bool| (if b { "yes" } else { "no" }).to_string();
    quotas
        .iter()
        .map(|(name, limit)| vec![name.to_string(), limit.to_string(), yes_no(!limit.is_blocked())])
        .chain(
            flags
                .iter()
                .map(|(name, on)| vec![name.to_string(), String::new(), yes_no(*on)]),
        )
        .collect()
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let plan = current_plan(conn)?;
            let view = PlanView {
                plan,
                limits: plan.limits(),
            };
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
                let l = &view.limits;
                println!("{} ({})", l.name, plan);
                println!(
                    "{}",
                    pretty_table(&["Limit", "Value", "Available"], limit_rows(l))
                );
            }
        }
        Some(("set", sub)) => {
            let plan: PlanType = arg(sub, "plan")?.parse()?;
            set_setting(conn, PLAN_KEY, plan.as_str())?;
            tracing::info!(%plan, "plan changed");
            println!("Plan set to {}", plan);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row<'a>(rows: &'a [Vec<String>], name: &str) -> &'a [String] {
        rows.iter().find(|r| r[0] == name).unwrap()
    }

    #[test]
    fn blocked_quotas_show_as_unavailable() {
        let free = limit_rows(&PlanType::Free.limits());
        assert_eq!(row(&free, "Investment assets"), ["Investment assets", "blocked", "no"]);
        assert_eq!(row(&free, "Goals"), ["Goals", "3", "yes"]);
        assert_eq!(row(&free, "Report export")[2], "no");

        let advanced = limit_rows(&PlanType::Advanced.limits());
        assert_eq!(row(&advanced, "Investment assets")[1..], ["unlimited", "yes"]);
        assert_eq!(row(&advanced, "Advanced analytics")[2], "yes");
    }
}
