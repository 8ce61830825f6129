// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::today;
use crate::insights::{self, AlertLevel};
use crate::store;
use crate::utils::{fmt_ars, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::Datelike;
use rusqlite::Connection;

pub fn dashboard(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let all = store::load_transactions(conn)?;
    let d = insights::dashboard(&all, today());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &d)? {
        return Ok(());
    }
    println!("{}", d.month.label_es());
    println!(
        "{}",
        pretty_table(
            &["Gastos del mes", "Pendiente del mes", "Deuda pendiente"],
            vec![vec![
                fmt_ars(&d.monthly_expenses),
                fmt_ars(&d.pending_this_month),
                fmt_ars(&d.total_debt),
            ]],
        )
    );
    if !d.upcoming.is_empty() {
        let rows = d
            .upcoming
            .iter()
            .map(|u| {
                vec![
                    u.id.to_string(),
                    u.due.to_string(),
                    u.shop_name.clone(),
                    fmt_ars(&u.amount),
                    match u.alert {
                        AlertLevel::Danger => "!!".to_string(),
                        AlertLevel::Warning => "!".to_string(),
                        AlertLevel::None => String::new(),
                    },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Due", "Shop", "Amount", "Alert"], rows)
        );
    }
    Ok(())
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub
        .get_one::<i32>("year")
        .copied()
        .unwrap_or_else(|| today().year());
    let month = sub.get_one::<u32>("month").copied();
    let all = store::load_transactions(conn)?;
    let r = insights::report(&all, year, month);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r)? {
        return Ok(());
    }

    let rows = r
        .monthly_totals
        .iter()
        .map(|m| {
            let flag = if r.critical_months.contains(&m.month) {
                "crítico"
            } else {
                ""
            };
            vec![m.month.clone(), fmt_ars(&m.total), flag.to_string()]
        })
        .collect();
    println!("{}", pretty_table(&["Mes", "Total", ""], rows));
    println!(
        "Total: {}  Promedio {}: {}  Suscripciones: {}",
        fmt_ars(&r.total),
        if r.month.is_some() { "diario" } else { "mensual" },
        fmt_ars(&r.average),
        fmt_ars(&r.subscriptions)
    );
    if !r.top.is_empty() {
        let rows = r
            .top
            .iter()
            .map(|(shop, amount)| vec![shop.clone(), fmt_ars(amount)])
            .collect();
        println!("{}", pretty_table(&["Mayores gastos", "Monto"], rows));
    }
    Ok(())
}
