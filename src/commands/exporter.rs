// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::models::Transaction;
use crate::store;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

const HEADER: [&str; 14] = [
    "id",
    "date",
    "payment_date",
    "shop_name",
    "total_amount",
    "currency",
    "type",
    "status",
    "is_debt",
    "debt_to",
    "is_recurring",
    "group_id",
    "recurrence_end_date",
    "tags",
];

fn tag_names(t: &Transaction, names: &HashMap<i64, String>) -> Vec<String> {
    t.tag_ids
        .iter()
        .filter_map(|id| names.get(id).cloned())
        .collect()
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let mut rows = store::load_transactions(conn)?;
    rows.sort_by_key(|t| (t.date, t.id));
    let names: HashMap<i64, String> = store::load_tags(conn)?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(HEADER)?;
        for t in &rows {
            wtr.write_record([
                t.id.to_string(),
                t.date.to_string(),
                t.payment_date.map(|d| d.to_string()).unwrap_or_default(),
                t.shop_name.clone(),
                t.total_amount.to_string(),
                t.currency.clone(),
                t.r#type.to_string(),
                t.status.to_string(),
                t.is_debt.to_string(),
                t.debt_to.clone().unwrap_or_default(),
                t.is_recurring.to_string(),
                t.group_id.clone().unwrap_or_default(),
                t.recurrence_end_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                tag_names(t, &names).join("|"),
            ])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<serde_json::Value> = rows
            .iter()
            .map(|t| {
                json!({
                    "id": t.id,
                    "date": t.date,
                    "payment_date": t.payment_date,
                    "shop_name": t.shop_name,
                    "total_amount": t.total_amount.to_string(),
                    "currency": t.currency,
                    "type": t.r#type,
                    "status": t.status,
                    "is_debt": t.is_debt,
                    "debt_to": t.debt_to,
                    "is_recurring": t.is_recurring,
                    "group_id": t.group_id,
                    "recurrence_end_date": t.recurrence_end_date,
                    "tags": tag_names(t, &names),
                    "items": t.items.iter().map(|i| json!({
                        "name": i.name,
                        "price": i.price.to_string(),
                        "quantity": i.quantity,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
