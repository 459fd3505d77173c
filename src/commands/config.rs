// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::import::NumberLocale;
use crate::plans::PlanType;
use crate::utils::{
    LOCALE_KEY, PLAN_KEY, SETTING_KEYS, arg, current_plan, number_locale, opt_arg, pretty_table,
    set_setting,
};
use anyhow::{Result, bail};
use rusqlite::Connection;

/// Effective value of a known setting, defaults included.
fn effective(conn: &Connection, key: &str) -> Result<String> {
    Ok(match key {
        PLAN_KEY => current_plan(conn)?.to_string(),
        LOCALE_KEY => number_locale(conn)?.to_string(),
        other => bail!("Unknown setting '{}' (known: {})", other, SETTING_KEYS.join(", ")),
    })
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => match opt_arg(sub, "key") {
            Some(key) => println!("{}", effective(conn, key)?),
            None => {
                let mut rows = Vec::new();
                for key in SETTING_KEYS {
                    rows.push(vec![key.to_string(), effective(conn, key)?]);
                }
                println!("{}", pretty_table(&["Key", "Value"], rows));
            }
        },
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let raw = arg(sub, "value")?;
            // Store the canonical spelling so reads never fail later.
            let value = match key {
                PLAN_KEY => raw.parse::<PlanType>()?.to_string(),
                LOCALE_KEY => raw.parse::<NumberLocale>()?.to_string(),
                other => bail!("Unknown setting '{}' (known: {})", other, SETTING_KEYS.join(", ")),
            };
            set_setting(conn, key, &value)?;
            println!("{} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
