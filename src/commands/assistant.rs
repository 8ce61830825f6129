// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{month_or_current, strings, today};
use crate::ai::{ChatMessage, OllamaClient, Role};
use crate::calendar::YearMonth;
use crate::config::Config;
use crate::context::{MonthDigest, assistant_context, summarize, summarize_from_today};
use crate::utils::{fmt_ars, maybe_print_json, pretty_table};
use crate::{store, writer};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;
use std::io::{BufRead, Write};

#[derive(Serialize)]
struct ContextView<'a> {
    digests: &'a [MonthDigest],
    context: &'a str,
}

fn build_context(
    conn: &Connection,
    start: YearMonth,
    months: u32,
) -> Result<(Vec<MonthDigest>, String)> {
    let all = store::load_transactions(conn)?;
    let tags = store::load_tags(conn)?;
    let digests = summarize(&all, start, months);
    let text = assistant_context(&all, &tags, &digests);
    Ok((digests, text))
}

pub fn context(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cfg = Config::load(conn)?;
    let months = sub
        .get_one::<u32>("months")
        .copied()
        .unwrap_or(cfg.context_months);
    let (digests, text) = build_context(conn, month_or_current(sub)?, months)?;
    let view = ContextView {
        digests: &digests,
        context: &text,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }
    let rows = digests
        .iter()
        .map(|d| {
            vec![
                d.label.clone(),
                fmt_ars(&d.total),
                fmt_ars(&d.pending),
                d.top_expenses.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Mes", "Total", "Pendiente", "Mayores gastos"], rows)
    );
    println!("{}", text);
    Ok(())
}

pub fn chat(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cfg = Config::load(conn)?;
    let client = OllamaClient::from_config(&cfg)?;
    if sub.get_flag("models") {
        for name in client.list_models()? {
            println!("{}", name);
        }
        return Ok(());
    }
    let all = store::load_transactions(conn)?;
    let tags = store::load_tags(conn)?;
    let digests = summarize_from_today(&all, today(), cfg.context_months);
    let text = assistant_context(&all, &tags, &digests);

    let words = strings(sub, "message");
    if !words.is_empty() {
        let history = vec![ChatMessage::user(&words.join(" "))];
        println!("{}", client.chat(&history, &text));
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut history: Vec<ChatMessage> = Vec::new();
    print!("> ");
    std::io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let question = line.trim();
        if question.eq_ignore_ascii_case("salir") || question.eq_ignore_ascii_case("exit") {
            break;
        }
        if !question.is_empty() {
            history.push(ChatMessage::user(question));
            let answer = client.chat(&history, &text);
            println!("{}\n", answer);
            history.push(ChatMessage {
                role: Role::Assistant,
                content: answer,
            });
        }
        print!("> ");
        std::io::stdout().flush()?;
    }
    Ok(())
}

pub fn smart(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let words = strings(sub, "text");
    if words.is_empty() {
        return Err(anyhow!("Describe the purchase, e.g. \"zapatillas 120000 en 6 cuotas\""));
    }
    let cfg = Config::load(conn)?;
    let client = OllamaClient::from_config(&cfg)?;
    let model = sub.get_one::<String>("model").map(String::as_str);
    let intent = client.parse_entry(&words.join(" "), model, today())?.normalized();
    intent.validate()?;

    println!(
        "{}",
        pretty_table(
            &["Shop", "Date", "Total", "Installments", "Items"],
            vec![vec![
                intent.shop_name.clone(),
                intent.date.to_string(),
                fmt_ars(&intent.total_amount),
                intent.installments.to_string(),
                intent
                    .items
                    .iter()
                    .map(|i| format!("{} x{}", i.name, i.quantity))
                    .collect::<Vec<_>>()
                    .join(", "),
            ]],
        )
    );
    if sub.get_flag("dry-run") {
        return Ok(());
    }
    let ids = writer::create(conn, &intent)?;
    println!("Recorded {} row(s)", ids.len());
    Ok(())
}
