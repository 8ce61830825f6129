// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod assistant;
pub mod dolar;
pub mod doctor;
pub mod exporter;
pub mod reports;
pub mod settings;
pub mod tags;
pub mod transactions;
pub mod wishlist;

use crate::calendar::YearMonth;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing required argument '{}'", name))
}

pub(crate) fn strings(m: &clap::ArgMatches, name: &str) -> Vec<String> {
    m.get_many::<String>(name)
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default()
}

/// `--month YYYY-MM`, or the current month when absent.
pub(crate) fn month_or_current(m: &clap::ArgMatches) -> Result<YearMonth> {
    match m.get_one::<String>("month") {
        Some(s) => s.parse(),
        None => Ok(YearMonth::of(today())),
    }
}
