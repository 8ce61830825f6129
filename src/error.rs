// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Input rejected before it reaches the writer.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Shop name is required")]
    MissingShopName,
    #[error("At least one item is required")]
    NoItems,
    #[error("Item name is required")]
    MissingItemName,
    #[error("Quantity for '{0}' must be at least 1 (got {1})")]
    Quantity(String, i64),
    #[error("Installments must be between 1 and 120 (got {0})")]
    Installments(u32),
    #[error("Amount must not be negative (got {0})")]
    NegativeAmount(Decimal),
    #[error("Recurrence end {0} is before the start date {1}")]
    EndBeforeStart(NaiveDate, NaiveDate),
    #[error("Tag name is required")]
    MissingTagName,
    #[error("Invalid tag color '{0}', expected #rrggbb")]
    TagColor(String),
}

#[derive(Debug, Error)]
pub enum CuotiError {
    #[error("{0} {1} not found")]
    NotFound(&'static str, String),
    #[error("Only virtual occurrences can be materialized")]
    NotVirtual,
    #[error("Nothing to toggle: no transaction {id} in {month}")]
    NotInMonth { id: i64, month: String },
}
