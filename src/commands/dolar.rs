// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::quotes::{self, Direction};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("quotes", sub)) => show_quotes(sub)?,
        Some(("history", sub)) => history(sub)?,
        Some(("convert", sub)) => convert(sub)?,
        _ => {}
    }
    Ok(())
}

fn signed(v: f64) -> String {
    if v > 0.0 {
        format!("+{:.2}%", v)
    } else {
        format!("{:.2}%", v)
    }
}

fn show_quotes(sub: &clap::ArgMatches) -> Result<()> {
    let q = quotes::fetch_dollar_quotes()?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &q)? {
        return Ok(());
    }
    let rows = vec![
        vec![
            "Dólar oficial".to_string(),
            format!("{:.2}", q.official.price),
            signed(q.official.variation),
            format!("{:.2}", q.official.previous_price()),
        ],
        vec![
            "USDC".to_string(),
            format!("{:.2}", q.usdc.price),
            signed(q.usdc.variation),
            format!("{:.2}", q.usdc.previous_price()),
        ],
    ];
    println!(
        "{}",
        pretty_table(&["Quote", "ARS", "24h", "Previous"], rows)
    );
    if q.usdc.price > 0.0 {
        println!("100k ARS = {:.2} USDC", 100_000.0 / q.usdc.price);
    }
    Ok(())
}

fn history(sub: &clap::ArgMatches) -> Result<()> {
    let days = sub.get_one::<u32>("days").copied().unwrap_or(30);
    let data = quotes::fetch_usdc_history(days)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|p| vec![p.date.format("%d/%m").to_string(), p.price.to_string()])
            .collect();
        println!("{}", pretty_table(&["Day", "USDC (ARS)"], rows));
    }
    Ok(())
}

fn convert(sub: &clap::ArgMatches) -> Result<()> {
    let amount = quotes::parse_amount_input(required(sub, "amount")?);
    let direction: Direction = required(sub, "direction")?.parse()?;
    let q = quotes::fetch_dollar_quotes()?;
    let result = quotes::convert(amount, direction, &q)?;
    println!("{:.2} {}", result, direction.result_currency());
    Ok(())
}
