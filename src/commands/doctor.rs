// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::parse_amount;
use crate::utils::pretty_table;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::collections::{BTreeMap, BTreeSet};

static INSTALLMENT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" \((\d+)/(\d+)\)$").expect("static regex"));

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = rows.into_iter().map(|(k, d)| vec![k, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// `(issue, detail)` pairs, in a stable order.
pub fn find_issues(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut rows = Vec::new();

    // 1) Installment groups missing some of their (i/N) rows
    let mut stmt = conn.prepare(
        "SELECT group_id, shop_name FROM transactions WHERE group_id IS NOT NULL ORDER BY id",
    )?;
    let mut cur = stmt.query([])?;
    let mut groups: BTreeMap<String, (u32, BTreeSet<u32>)> = BTreeMap::new();
    while let Some(r) = cur.next()? {
        let group: String = r.get(0)?;
        let shop: String = r.get(1)?;
        if let Some(c) = INSTALLMENT_SUFFIX.captures(&shop) {
            let (Ok(i), Ok(n)) = (c[1].parse::<u32>(), c[2].parse::<u32>()) else {
                continue;
            };
            let entry = groups.entry(group).or_insert((n, BTreeSet::new()));
            entry.0 = entry.0.max(n);
            entry.1.insert(i);
        }
    }
    for (group, (n, seen)) in groups {
        let missing: Vec<String> = (1..=n)
            .filter(|i| !seen.contains(i))
            .map(|i| i.to_string())
            .collect();
        if !missing.is_empty() {
            rows.push((
                "incomplete_installments".into(),
                format!("group {}: missing {} of {}", group, missing.join(","), n),
            ));
        }
    }

    // 2) Rows pointing at deleted transactions or tags
    let orphan_checks = [
        (
            "orphan_item",
            "SELECT id FROM items WHERE transaction_id NOT IN (SELECT id FROM transactions)",
        ),
        (
            "orphan_tag_link",
            "SELECT transaction_id FROM transaction_tags
             WHERE transaction_id NOT IN (SELECT id FROM transactions)
                OR tag_id NOT IN (SELECT id FROM tags)",
        ),
    ];
    for (issue, sql) in orphan_checks {
        let mut stmt = conn.prepare(sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            rows.push((issue.into(), id.to_string()));
        }
    }

    // 3) Amounts that cannot be read back, and recurring rows that never project
    let mut stmt =
        conn.prepare("SELECT id, total_amount, is_recurring, group_id FROM transactions ORDER BY id")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let amount: String = r.get(1)?;
        let recurring: i64 = r.get(2)?;
        let group: Option<String> = r.get(3)?;
        if parse_amount(&amount).is_err() {
            rows.push(("bad_amount".into(), format!("{} '{}'", id, amount)));
        }
        if recurring != 0 && group.as_deref().is_none_or(str::is_empty) {
            rows.push(("recurring_without_group".into(), id.to_string()));
        }
    }

    Ok(rows)
}
