// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{month_or_current, required, strings, today};
use crate::calendar::YearMonth;
use crate::error::CuotiError;
use crate::models::{NewItem, NewTransaction, Origin, Projected, Transaction, TransactionType};
use crate::projection::project;
use crate::utils::{fmt_ars, maybe_print_json, parse_date, parse_decimal, pretty_table};
use crate::{store, tags, writer};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("group", sub)) => group(conn, sub)?,
        Some(("toggle", sub)) => toggle(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Parses `name:price[:qty]`. The name may itself contain colons.
pub fn parse_item(spec: &str) -> Result<NewItem> {
    let parts: Vec<&str> = spec.split(':').collect();
    let bad = || anyhow!("Invalid item '{}', expected name:price[:qty]", spec);
    if parts.len() < 2 {
        return Err(bad());
    }
    let n = parts.len();
    let (name_parts, price, quantity) = match (n >= 3)
        .then(|| parts[n - 1].trim().parse::<i64>().ok())
        .flatten()
    {
        Some(qty) if parse_decimal(parts[n - 2]).is_ok() => (&parts[..n - 2], parts[n - 2], qty),
        _ => (&parts[..n - 1], parts[n - 1], 1),
    };
    let name = name_parts.join(":").trim().to_string();
    if name.is_empty() {
        return Err(bad());
    }
    Ok(NewItem {
        name,
        price: parse_decimal(price)?,
        quantity,
        link: None,
        image_url: None,
    })
}

fn parse_items(sub: &clap::ArgMatches) -> Result<Vec<NewItem>> {
    strings(sub, "item").iter().map(|s| parse_item(s)).collect()
}

fn opt_date(sub: &clap::ArgMatches, name: &str) -> Result<Option<chrono::NaiveDate>> {
    sub.get_one::<String>(name)
        .map(|s| parse_date(s))
        .transpose()
}

fn recurring_flag(sub: &clap::ArgMatches) -> Option<bool> {
    if sub.get_flag("recurring") {
        Some(true)
    } else if sub.get_flag("once") {
        Some(false)
    } else {
        None
    }
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let shop = required(sub, "shop")?.trim().to_string();
    let amount = parse_decimal(required(sub, "amount")?)?;
    let date = opt_date(sub, "date")?.unwrap_or_else(today);
    let r#type: TransactionType = sub
        .get_one::<String>("type")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(TransactionType::Purchase);

    let mut intent = NewTransaction::simple(r#type, &shop, date, amount);
    intent.installments = sub.get_one::<u32>("installments").copied().unwrap_or(1).max(1);
    if let Some(recurring) = recurring_flag(sub) {
        intent.is_recurring = recurring;
    }
    intent.payment_date = opt_date(sub, "payment-date")?;
    intent.recurrence_end_date = opt_date(sub, "end-date")?;
    intent.debt_to = sub.get_one::<String>("debt-to").cloned();
    intent.is_debt = intent.debt_to.is_some();
    intent.group_id = sub.get_one::<String>("group").cloned();
    intent.tag_ids = tags::resolve(conn, &strings(sub, "tag"))?;
    let items = parse_items(sub)?;
    if !items.is_empty() {
        intent.items = items;
    }

    let intent = intent.normalized();
    intent.validate()?;
    let ids = writer::create(conn, &intent)?;
    println!(
        "Recorded '{}' ({} row{}, {} each) ids: {}",
        shop,
        ids.len(),
        if ids.len() == 1 { "" } else { "s" },
        fmt_ars(&(intent.total_amount / Decimal::from(intent.row_count()))),
        ids.iter().map(i64::to_string).collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

/// The stored row as an editable intent.
fn intent_from(t: &Transaction) -> NewTransaction {
    NewTransaction {
        date: t.date,
        shop_name: t.shop_name.clone(),
        total_amount: t.total_amount,
        installments: 1,
        is_debt: t.is_debt,
        debt_to: t.debt_to.clone(),
        r#type: t.r#type,
        is_recurring: t.is_recurring,
        group_id: t.group_id.clone(),
        payment_date: t.payment_date,
        recurrence_end_date: t.recurrence_end_date,
        tag_ids: t.tag_ids.clone(),
        items: t
            .items
            .iter()
            .map(|i| NewItem {
                name: i.name.clone(),
                price: i.price,
                quantity: i.quantity,
                link: i.link.clone(),
                image_url: i.image_url.clone(),
            })
            .collect(),
    }
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("Missing transaction id"))?;
    let current = store::load_transaction(conn, id)?
        .ok_or_else(|| CuotiError::NotFound("Transaction", id.to_string()))?;
    let mut intent = intent_from(&current);

    if let Some(shop) = sub.get_one::<String>("shop") {
        intent.shop_name = shop.trim().to_string();
    }
    let new_amount = sub
        .get_one::<String>("amount")
        .map(|s| parse_decimal(s))
        .transpose()?;
    if let Some(amount) = new_amount {
        intent.total_amount = amount;
    }
    if let Some(date) = opt_date(sub, "date")? {
        intent.date = date;
    }
    if let Some(t) = sub.get_one::<String>("type") {
        intent.r#type = t.parse()?;
    }
    if let Some(recurring) = recurring_flag(sub) {
        intent.is_recurring = recurring;
    }
    if let Some(d) = opt_date(sub, "payment-date")? {
        intent.payment_date = Some(d);
    }
    if let Some(d) = opt_date(sub, "end-date")? {
        intent.recurrence_end_date = Some(d);
    }
    if let Some(creditor) = sub.get_one::<String>("debt-to") {
        intent.debt_to = Some(creditor.clone());
        intent.is_debt = true;
    }
    let tag_names = strings(sub, "tag");
    if !tag_names.is_empty() {
        intent.tag_ids = tags::resolve(conn, &tag_names)?;
    }
    let items = parse_items(sub)?;
    if !items.is_empty() {
        intent.items = items;
    } else if let (Some(amount), [only]) = (new_amount, intent.items.as_mut_slice()) {
        // a lone item follows the row's amount
        only.price = amount;
    }
    if intent.items.is_empty() {
        intent.items = NewTransaction::simple(
            intent.r#type,
            &intent.shop_name,
            intent.date,
            intent.total_amount,
        )
        .items;
    }

    let intent = intent.normalized();
    intent.validate()?;
    writer::update(conn, id, &intent)?;
    println!("Updated transaction {}", id);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ListedRow {
    /// Row id for stored rows, `v{source}-{YYYY-MM}` for projected occurrences.
    pub key: String,
    pub id: Option<i64>,
    pub source_id: Option<i64>,
    pub date: String,
    pub payment_date: Option<String>,
    pub shop_name: String,
    pub amount: Decimal,
    pub status: String,
    pub r#type: String,
    pub group_id: Option<String>,
    pub is_virtual: bool,
}

pub fn display_key(p: &Projected, month: YearMonth) -> String {
    match p.origin {
        Origin::Real => p.transaction.id.to_string(),
        Origin::Virtual { source_id } => format!("v{}-{}", source_id, month),
    }
}

fn row_of(t: &Transaction, key: String, origin: Origin) -> ListedRow {
    let (id, source_id, is_virtual) = match origin {
        Origin::Real => (Some(t.id), None, false),
        Origin::Virtual { source_id } => (None, Some(source_id), true),
    };
    ListedRow {
        key,
        id,
        source_id,
        date: t.date.to_string(),
        payment_date: t.payment_date.map(|d| d.to_string()),
        shop_name: t.shop_name.clone(),
        amount: t.total_amount,
        status: t.status.to_string(),
        r#type: t.r#type.to_string(),
        group_id: t.group_id.clone(),
        is_virtual,
    }
}

/// Projected rows for `month`, ordered by effective date.
pub fn month_rows(all: &[Transaction], month: YearMonth) -> Vec<ListedRow> {
    let mut projected = project(all, month);
    projected.sort_by_key(|p| (p.transaction.effective_date(), p.transaction.id));
    projected
        .iter()
        .map(|p| row_of(&p.transaction, display_key(p, month), p.origin))
        .collect()
}

fn print_rows(rows: &[ListedRow]) {
    let table_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.key.clone(),
                r.payment_date.clone().unwrap_or_else(|| r.date.clone()),
                r.shop_name.clone(),
                fmt_ars(&r.amount),
                r.status.clone(),
                r.r#type.clone(),
                if r.is_virtual { "projected".into() } else { String::new() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Key", "Due", "Shop", "Amount", "Status", "Type", "Origin"],
            table_rows,
        )
    );
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let all = store::load_transactions(conn)?;
    let mut rows: Vec<ListedRow> = if sub.get_flag("all") {
        all.iter()
            .map(|t| row_of(t, t.id.to_string(), Origin::Real))
            .collect()
    } else {
        let month = month_or_current(sub)?;
        month_rows(&all, month)
    };
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        print_rows(&rows);
        let total: Decimal = rows.iter().map(|r| r.amount).sum();
        println!("Total: {}", fmt_ars(&total));
    }
    Ok(())
}

fn group(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let group_id = required(sub, "group_id")?;
    let rows: Vec<ListedRow> = store::transactions_by_group(conn, group_id)?
        .iter()
        .map(|t| row_of(t, t.id.to_string(), Origin::Real))
        .collect();
    if rows.is_empty() {
        return Err(CuotiError::NotFound("Group", group_id.to_string()).into());
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        print_rows(&rows);
    }
    Ok(())
}

fn toggle(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("Missing transaction id"))?;
    let month = month_or_current(sub)?;
    let all = store::load_transactions(conn)?;
    match writer::toggle(conn, &all, month, id)? {
        writer::Toggle::Updated { id, status } => {
            println!("Transaction {} is now {}", id, status)
        }
        writer::Toggle::Materialized { source_id, id } => println!(
            "Recorded {} occurrence of {} as paid (new id {})",
            month, source_id, id
        ),
    }
    Ok(())
}

fn remove(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("Missing transaction id"))?;
    if sub.get_flag("group") {
        let t = store::load_transaction(conn, id)?
            .ok_or_else(|| CuotiError::NotFound("Transaction", id.to_string()))?;
        if let Some(group_id) = t.group_id {
            let removed = writer::delete_group(conn, &group_id)?;
            println!("Deleted {} row(s) of group {}", removed, group_id);
            return Ok(());
        }
    }
    writer::delete(conn, id)?;
    println!("Deleted transaction {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn item_specs() {
        let i = parse_item("Zapatillas:120000").unwrap();
        assert_eq!(i.name, "Zapatillas");
        assert_eq!(i.price, Decimal::from(120000));
        assert_eq!(i.quantity, 1);

        let i = parse_item("Medias:1500.50:3").unwrap();
        assert_eq!(i.name, "Medias");
        assert_eq!(i.price, Decimal::from_str("1500.50").unwrap());
        assert_eq!(i.quantity, 3);

        let i = parse_item("Cable USB:C:2500").unwrap();
        assert_eq!(i.name, "Cable USB:C");
        assert_eq!(i.quantity, 1);

        assert!(parse_item("sin precio").is_err());
        assert!(parse_item(":100").is_err());
    }
}
