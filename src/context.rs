// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::YearMonth;
use crate::models::{Status, Tag, Transaction};
use crate::projection::project;
use crate::utils::{fmt_ars, fmt_whole};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

const TOP_EXPENSES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthDigest {
    pub month: YearMonth,
    pub label: String,
    pub total: Decimal,
    pub pending: Decimal,
    pub top_expenses: String,
}

/// Projects `month_count` consecutive months starting at `start`.
pub fn summarize(all: &[Transaction], start: YearMonth, month_count: u32) -> Vec<MonthDigest> {
    (0..month_count)
        .map(|i| digest(all, start.add_months(i)))
        .collect()
}

/// [`summarize`] starting at the month containing `today`.
pub fn summarize_from_today(all: &[Transaction], today: NaiveDate, month_count: u32) -> Vec<MonthDigest> {
    summarize(all, YearMonth::of(today), month_count)
}

fn digest(all: &[Transaction], month: YearMonth) -> MonthDigest {
    let mut rows: Vec<Transaction> = project(all, month)
        .into_iter()
        .map(|p| p.transaction)
        .collect();

    let total: Decimal = rows.iter().map(|t| t.total_amount).sum();
    let pending: Decimal = rows
        .iter()
        .filter(|t| t.status == Status::Pending)
        .map(|t| t.total_amount)
        .sum();

    rows.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    let top_expenses = rows
        .iter()
        .take(TOP_EXPENSES)
        .map(|t| format!("{}: ${}", t.shop_name, fmt_whole(&t.total_amount)))
        .collect::<Vec<_>>()
        .join(", ");

    MonthDigest {
        month,
        label: month.label_es(),
        total,
        pending,
        top_expenses,
    }
}

/// Recurring rows, or rows tagged with a "suscri..." tag, one per group
/// (or shop name when ungrouped), taking the newest row of each.
pub fn active_subscriptions<'a>(all: &'a [Transaction], tags: &[Tag]) -> Vec<&'a Transaction> {
    let sub_tag = tags
        .iter()
        .find(|t| t.name.to_lowercase().contains("suscri"))
        .map(|t| t.id);

    let mut newest_first: Vec<&Transaction> = all.iter().collect();
    newest_first.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for t in newest_first {
        let tagged = sub_tag.is_some_and(|id| t.tag_ids.contains(&id));
        if !(t.is_recurring || tagged) {
            continue;
        }
        let key = t.group_id.as_deref().unwrap_or(t.shop_name.as_str());
        if seen.insert(key) {
            out.push(t);
        }
    }
    out
}

/// The text block handed to the assistant together with the chat history.
pub fn assistant_context(all: &[Transaction], tags: &[Tag], digests: &[MonthDigest]) -> String {
    let subs = active_subscriptions(all, tags);
    let subs_total: Decimal = subs.iter().map(|t| t.total_amount).sum();
    let subs_section = if subs.is_empty() {
        "No hay suscripciones activas.".to_string()
    } else {
        let lines = subs
            .iter()
            .map(|t| format!("- {}: {} por mes", t.shop_name, fmt_ars(&t.total_amount)))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "{}\nTotal mensual en suscripciones: {}",
            lines,
            fmt_ars(&subs_total)
        )
    };

    let projections = digests
        .iter()
        .map(|d| {
            format!(
                "- {}: total {} (pendiente {})\n  Mayores gastos: {}",
                d.label,
                fmt_ars(&d.total),
                fmt_ars(&d.pending),
                if d.top_expenses.is_empty() {
                    "ninguno"
                } else {
                    d.top_expenses.as_str()
                }
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let pending_total: Decimal = all
        .iter()
        .filter(|t| t.status == Status::Pending)
        .map(|t| t.total_amount)
        .sum();
    let debt_total: Decimal = all
        .iter()
        .filter(|t| t.is_debt && t.status == Status::Pending)
        .map(|t| t.total_amount)
        .sum();

    format!(
        "SUSCRIPCIONES (gastos fijos):\n{subs_section}\n\n\
         PROYECCION MENSUAL (incluye cuotas y suscripciones):\n{projections}\n\n\
         SITUACION GENERAL:\n\
         - Pendiente de pago (registros reales): {}\n\
         - Deuda acumulada: {}\n\n\
         Los montos estan en pesos argentinos con formato $1.000,00 (punto para miles, coma para decimales).",
        fmt_ars(&pending_total),
        fmt_ars(&debt_total),
    )
}
