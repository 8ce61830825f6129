// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard and report figures.

use crate::calendar::{YearMonth, month_name_es};
use crate::models::{Status, Transaction, TransactionType};
use crate::projection::project;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

const UPCOMING: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    None,
    Warning,
    Danger,
}

impl AlertLevel {
    /// Danger when due within two days (or overdue), warning within five.
    pub fn for_due(due: Option<NaiveDate>, today: NaiveDate) -> Self {
        match due.map(|d| (d - today).num_days()) {
            Some(days) if days <= 2 => AlertLevel::Danger,
            Some(days) if days <= 5 => AlertLevel::Warning,
            _ => AlertLevel::None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Upcoming {
    pub id: i64,
    pub shop_name: String,
    pub due: NaiveDate,
    pub amount: Decimal,
    pub alert: AlertLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub month: YearMonth,
    pub monthly_expenses: Decimal,
    pub pending_this_month: Decimal,
    pub total_debt: Decimal,
    pub upcoming: Vec<Upcoming>,
}

pub fn dashboard(all: &[Transaction], today: NaiveDate) -> Dashboard {
    let month = YearMonth::of(today);
    let projected = project(all, month);
    let monthly_expenses = projected.iter().map(|p| p.transaction.total_amount).sum();
    let pending_this_month = projected
        .iter()
        .filter(|p| p.transaction.status == Status::Pending)
        .map(|p| p.transaction.total_amount)
        .sum();
    let total_debt = all
        .iter()
        .filter(|t| t.is_debt && t.status == Status::Pending)
        .map(|t| t.total_amount)
        .sum();

    let mut pending: Vec<&Transaction> =
        all.iter().filter(|t| t.status == Status::Pending).collect();
    pending.sort_by_key(|t| (t.effective_date(), t.id));
    let upcoming = pending
        .into_iter()
        .take(UPCOMING)
        .map(|t| Upcoming {
            id: t.id,
            shop_name: t.shop_name.clone(),
            due: t.effective_date(),
            amount: t.total_amount,
            alert: AlertLevel::for_due(t.payment_date, today),
        })
        .collect();

    Dashboard {
        month,
        monthly_expenses,
        pending_this_month,
        total_debt,
        upcoming,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthTotal {
    pub month: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub year: i32,
    /// 1-based month the figures are filtered to; `None` for the whole year.
    pub month: Option<u32>,
    pub monthly_totals: Vec<MonthTotal>,
    pub total: Decimal,
    /// Per month for a yearly report, per day for a single month.
    pub average: Decimal,
    pub subscriptions: Decimal,
    pub critical_months: Vec<String>,
    pub top: Vec<(String, Decimal)>,
}

/// Real rows only, bucketed by effective date.
pub fn report(all: &[Transaction], year: i32, month: Option<u32>) -> Report {
    let mut totals = [Decimal::ZERO; 12];
    for t in all {
        let d = t.effective_date();
        if d.year() == year {
            totals[d.month0() as usize] += t.total_amount;
        }
    }

    let mut filtered: Vec<&Transaction> = all
        .iter()
        .filter(|t| {
            let d = t.effective_date();
            d.year() == year && month.is_none_or(|m| d.month() == m)
        })
        .collect();

    let total: Decimal = filtered.iter().map(|t| t.total_amount).sum();
    let average = match month.and_then(|m| YearMonth::new(year, m)) {
        Some(ym) => total / Decimal::from(ym.days()),
        None => total / Decimal::from(12),
    };
    let subscriptions = filtered
        .iter()
        .filter(|t| t.r#type == TransactionType::Subscription)
        .map(|t| t.total_amount)
        .sum();

    let annual_average = totals.iter().copied().sum::<Decimal>() / Decimal::from(12);
    let threshold = annual_average * Decimal::new(12, 1);
    let critical_months = totals
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > threshold)
        .map(|(i, _)| month_name_es(i).to_string())
        .collect();

    filtered.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    let top = filtered
        .iter()
        .take(UPCOMING)
        .map(|t| (t.shop_name.clone(), t.total_amount))
        .collect();

    Report {
        year,
        month,
        monthly_totals: totals
            .iter()
            .enumerate()
            .map(|(i, v)| MonthTotal {
                month: month_name_es(i).to_string(),
                total: *v,
            })
            .collect(),
        total,
        average,
        subscriptions,
        critical_months,
        top,
    }
}
