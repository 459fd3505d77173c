// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{TxKind, UserCategory};
use crate::store::{insert_category, load_categories, split_keywords};
use crate::styles::StyleRegistry;
use crate::utils::{arg, maybe_print_json, opt_arg, pretty_table};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            let kind: TxKind = arg(sub, "type")?.parse()?;
            let n = conn.execute(
                "DELETE FROM categories WHERE lower(name)=lower(?1) AND type=?2",
                params![name, kind.as_str()],
            )?;
            if n == 0 {
                bail!("Category '{}' ({}) not found", name, kind);
            }
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = UserCategory {
        id: 0,
        name: arg(sub, "name")?.to_string(),
        kind: arg(sub, "type")?.parse()?,
        icon: opt_arg(sub, "icon").map(str::to_string),
        color: opt_arg(sub, "color").map(str::to_string),
        keywords: opt_arg(sub, "keywords").map(split_keywords).unwrap_or_default(),
    };
    insert_category(conn, &category)?;
    println!(
        "Added {} category '{}' ({} keywords)",
        category.kind,
        category.name,
        category.keywords.len()
    );
    Ok(())
}

#[derive(Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub kind: TxKind,
    pub icon: String,
    pub color: String,
    pub default_style: bool,
    pub keywords: Vec<String>,
}

pub fn category_rows(conn: &Connection) -> Result<Vec<CategoryRow>> {
    let categories = load_categories(conn)?;
    let styles = StyleRegistry::with_user_categories(&categories);
    Ok(categories
        .into_iter()
        .map(|c| {
            let resolved = styles.resolve(&c.name);
            CategoryRow {
                icon: resolved.style().icon.clone(),
                color: resolved.style().color.clone(),
                default_style: resolved.is_default(),
                name: c.name,
                kind: c.kind,
                keywords: c.keywords,
            }
        })
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = category_rows(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.kind.to_string(),
                    c.icon.clone(),
                    c.color.clone(),
                    c.keywords.join(", "),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Type", "Icon", "Color", "Keywords"], rows)
        );
    }
    Ok(())
}
