// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly projection: what is due in a given month.
//!
//! Installment purchases already have one real row per month. Recurring
//! subscriptions and services are stored once (the generator) plus any
//! occurrence the user has materialized; the months in between are
//! synthesized here as virtual instances and never written back.

use crate::calendar::YearMonth;
use crate::models::{Origin, Projected, Status, Transaction};
use std::collections::{HashMap, HashSet};

/// Real rows whose effective date falls in `month`, plus one virtual
/// occurrence per recurring group that has no real row there.
pub fn project(all: &[Transaction], month: YearMonth) -> Vec<Projected> {
    let first = month.first_day();
    let last = month.last_day();

    let real_groups: HashSet<&str> = all
        .iter()
        .filter(|t| month.contains(t.effective_date()))
        .filter_map(|t| t.group_id.as_deref())
        .collect();

    let mut out = Vec::new();
    // generator per group, in first-seen order
    let mut generators: Vec<&Transaction> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for t in all {
        let effective = t.effective_date();
        if month.contains(effective) {
            out.push(Projected {
                transaction: t.clone(),
                origin: Origin::Real,
            });
            continue;
        }
        if !t.is_recurring {
            continue;
        }
        let Some(group) = t.group_id.as_deref() else {
            continue;
        };
        if real_groups.contains(group) || effective > last {
            continue;
        }
        if t.recurrence_end_date.is_some_and(|end| end < first) {
            continue;
        }
        match slot.get(group) {
            Some(&i) => {
                if effective > generators[i].effective_date() {
                    generators[i] = t;
                }
            }
            None => {
                slot.insert(group, generators.len());
                generators.push(t);
            }
        }
    }

    out.extend(generators.into_iter().map(|t| virtual_occurrence(t, month)));
    out
}

/// The occurrence's `date` takes its day from the generator's effective
/// date, so a due day set through `payment_date` carries into `date` too.
fn virtual_occurrence(t: &Transaction, month: YearMonth) -> Projected {
    let mut transaction = t.clone();
    transaction.date = month.shift(t.effective_date());
    transaction.payment_date = t.payment_date.map(|p| month.shift(p));
    transaction.status = Status::Pending;
    Projected {
        transaction,
        origin: Origin::Virtual { source_id: t.id },
    }
}
