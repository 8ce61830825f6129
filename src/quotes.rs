// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dollar and USDC quotes in ARS from public market APIs.

use crate::utils::http_client;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

const CRIPTOYA_URL: &str = "https://criptoya.com/api/dolar";
const COINGECKO_URL: &str = "https://api.coingecko.com/api/v3/coins/usd-coin/market_chart";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub price: f64,
    /// Daily variation in percent.
    pub variation: f64,
}

impl Quote {
    /// Price before today's variation was applied.
    pub fn previous_price(&self) -> f64 {
        previous_price(self.price, self.variation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DollarQuotes {
    pub official: Quote,
    pub usdc: Quote,
}

pub fn previous_price(price: f64, variation_pct: f64) -> f64 {
    price / (1.0 + variation_pct / 100.0)
}

fn number_at(v: &Value, path: &[&str]) -> f64 {
    path.iter()
        .try_fold(v, |acc, key| acc.get(*key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Missing fields read as zero, the way the CriptoYa payload is rendered.
pub fn parse_dollar_quotes(body: &str) -> Result<DollarQuotes> {
    let v: Value = serde_json::from_str(body).context("Invalid dolar quotes payload")?;
    Ok(DollarQuotes {
        official: Quote {
            price: number_at(&v, &["oficial", "price"]),
            variation: number_at(&v, &["oficial", "variation"]),
        },
        usdc: Quote {
            price: number_at(&v, &["cripto", "usdc", "ask"]),
            variation: number_at(&v, &["cripto", "usdc", "variation"]),
        },
    })
}

pub fn fetch_dollar_quotes() -> Result<DollarQuotes> {
    let client = http_client()?;
    let body = client
        .get(CRIPTOYA_URL)
        .send()
        .context("Failed to fetch dolar quotes")?
        .error_for_status()?
        .text()?;
    debug!(bytes = body.len(), "fetched dolar quotes");
    parse_dollar_quotes(&body)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPrice {
    pub date: NaiveDate,
    pub price: i64,
}

#[derive(Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

/// Collapses `[timestamp_ms, price]` points to the last price of each UTC
/// day, rounded to whole pesos.
pub fn parse_market_chart(body: &str) -> Result<Vec<DailyPrice>> {
    let chart: MarketChart = serde_json::from_str(body).context("Invalid market chart payload")?;
    let mut out: Vec<DailyPrice> = Vec::new();
    for (ts, price) in chart.prices {
        let Some(at) = DateTime::from_timestamp_millis(ts as i64) else {
            continue;
        };
        let date = at.date_naive();
        let rounded = price.round() as i64;
        match out.last_mut() {
            Some(last) if last.date == date => last.price = rounded,
            _ => out.push(DailyPrice {
                date,
                price: rounded,
            }),
        }
    }
    Ok(out)
}

pub fn fetch_usdc_history(days: u32) -> Result<Vec<DailyPrice>> {
    let client = http_client()?;
    let body = client
        .get(COINGECKO_URL)
        .query(&[("vs_currency", "ars".to_string()), ("days", days.to_string())])
        .send()
        .context("Failed to fetch crypto chart data")?
        .error_for_status()?
        .text()?;
    parse_market_chart(&body)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    OfficialToArs,
    UsdcToArs,
    ArsToOfficial,
    ArsToUsdc,
}

impl Direction {
    pub fn result_currency(&self) -> &'static str {
        match self {
            Direction::OfficialToArs | Direction::UsdcToArs => "ARS",
            Direction::ArsToOfficial => "USD",
            Direction::ArsToUsdc => "USDC",
        }
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "usd_oficial_to_ars" | "usd_to_ars" => Ok(Direction::OfficialToArs),
            "usdc_to_ars" => Ok(Direction::UsdcToArs),
            "ars_to_usd_oficial" | "ars_to_usd" => Ok(Direction::ArsToOfficial),
            "ars_to_usdc" => Ok(Direction::ArsToUsdc),
            other => Err(anyhow!(
                "Unknown direction '{}' (use usd-to-ars|usdc-to-ars|ars-to-usd|ars-to-usdc)",
                other
            )),
        }
    }
}

pub fn convert(amount: f64, direction: Direction, quotes: &DollarQuotes) -> Result<f64> {
    let rate = match direction {
        Direction::OfficialToArs | Direction::ArsToOfficial => quotes.official.price,
        Direction::UsdcToArs | Direction::ArsToUsdc => quotes.usdc.price,
    };
    match direction {
        Direction::OfficialToArs | Direction::UsdcToArs => Ok(amount * rate),
        Direction::ArsToOfficial | Direction::ArsToUsdc => {
            if rate == 0.0 {
                return Err(anyhow!("No quote available for this conversion"));
            }
            Ok(amount / rate)
        }
    }
}

/// Reads es-AR input: dots group thousands, the comma is the decimal mark.
/// Unparseable input reads as zero.
pub fn parse_amount_input(input: &str) -> f64 {
    input
        .trim()
        .replace('.', "")
        .replacen(',', ".", 1)
        .parse()
        .unwrap_or(0.0)
}
