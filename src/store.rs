// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row mapping: raw SQLite rows into domain records.

use crate::models::{Status, Tag, Transaction, TransactionItem, TransactionType};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

const TX_COLUMNS: &str = "id, date, shop_name, total_amount, currency, status, is_debt, debt_to, \
     type, is_recurring, group_id, payment_date, recurrence_end_date, created_at";

/// A transactions row exactly as stored.
#[derive(Debug)]
struct RawTransaction {
    id: i64,
    date: String,
    shop_name: String,
    total_amount: String,
    currency: Option<String>,
    status: Option<String>,
    is_debt: Option<i64>,
    debt_to: Option<String>,
    r#type: Option<String>,
    is_recurring: Option<i64>,
    group_id: Option<String>,
    payment_date: Option<String>,
    recurrence_end_date: Option<String>,
    created_at: Option<String>,
}

impl RawTransaction {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            date: r.get(1)?,
            shop_name: r.get(2)?,
            total_amount: r.get(3)?,
            currency: r.get(4)?,
            status: r.get(5)?,
            is_debt: r.get(6)?,
            debt_to: r.get(7)?,
            r#type: r.get(8)?,
            is_recurring: r.get(9)?,
            group_id: r.get(10)?,
            payment_date: r.get(11)?,
            recurrence_end_date: r.get(12)?,
            created_at: r.get(13)?,
        })
    }

    fn into_transaction(self) -> Result<Transaction> {
        let id = self.id;
        Ok(Transaction {
            id,
            date: coerce_date(&self.date)
                .with_context(|| format!("Invalid date '{}' on transaction {}", self.date, id))?,
            shop_name: self.shop_name,
            total_amount: parse_amount(&self.total_amount)
                .with_context(|| format!("Invalid amount on transaction {}", id))?,
            currency: self.currency.unwrap_or_else(|| "ARS".to_string()),
            status: match self.status.as_deref() {
                Some(s) => s.parse()?,
                None => Status::Completed,
            },
            is_debt: coerce_bool(self.is_debt),
            debt_to: non_empty(self.debt_to),
            r#type: match self.r#type.as_deref() {
                Some(s) if !s.trim().is_empty() => s.parse()?,
                _ => TransactionType::Purchase,
            },
            is_recurring: coerce_bool(self.is_recurring),
            group_id: non_empty(self.group_id),
            payment_date: coerce_opt_date(self.payment_date.as_deref())
                .with_context(|| format!("Invalid payment date on transaction {}", id))?,
            recurrence_end_date: coerce_opt_date(self.recurrence_end_date.as_deref())
                .with_context(|| format!("Invalid recurrence end on transaction {}", id))?,
            tag_ids: Vec::new(),
            items: Vec::new(),
            created_at: self.created_at.as_deref().and_then(coerce_datetime),
        })
    }
}

fn coerce_bool(v: Option<i64>) -> bool {
    matches!(v, Some(n) if n != 0)
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Accepts `YYYY-MM-DD` with or without a trailing time part.
pub fn coerce_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

fn coerce_opt_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    match s.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(Some(coerce_date(v)?)),
        _ => Ok(None),
    }
}

fn coerce_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

pub fn parse_amount(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .or_else(|_| {
            // legacy REAL columns may come back in exponent form
            Decimal::from_scientific(s.trim())
        })
        .with_context(|| format!("Invalid amount '{}'", s))
}

fn map_item(r: &Row<'_>) -> rusqlite::Result<(i64, i64, String, String, i64, Option<String>, Option<String>)> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
    ))
}

fn collect_items(
    stmt: &mut rusqlite::Statement<'_>,
    p: impl rusqlite::Params,
) -> Result<HashMap<i64, Vec<TransactionItem>>> {
    let rows = stmt.query_map(p, map_item)?;
    let mut out: HashMap<i64, Vec<TransactionItem>> = HashMap::new();
    for row in rows {
        let (id, transaction_id, name, price, quantity, link, image_url) = row?;
        out.entry(transaction_id).or_default().push(TransactionItem {
            id,
            transaction_id,
            name,
            price: parse_amount(&price).with_context(|| format!("Invalid price on item {}", id))?,
            quantity,
            link: non_empty(link),
            image_url: non_empty(image_url),
        });
    }
    Ok(out)
}

fn collect_links(
    stmt: &mut rusqlite::Statement<'_>,
    p: impl rusqlite::Params,
) -> Result<HashMap<i64, Vec<i64>>> {
    let rows = stmt.query_map(p, |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)))?;
    let mut out: HashMap<i64, Vec<i64>> = HashMap::new();
    for row in rows {
        let (owner, tag) = row?;
        out.entry(owner).or_default().push(tag);
    }
    Ok(out)
}

fn attach(
    raws: Vec<RawTransaction>,
    mut items: HashMap<i64, Vec<TransactionItem>>,
    mut tags: HashMap<i64, Vec<i64>>,
) -> Result<Vec<Transaction>> {
    let mut out = Vec::with_capacity(raws.len());
    for raw in raws {
        let mut t = raw.into_transaction()?;
        t.items = items.remove(&t.id).unwrap_or_default();
        t.tag_ids = tags.remove(&t.id).unwrap_or_default();
        out.push(t);
    }
    Ok(out)
}

/// Every transaction, newest first, with items and tags attached.
pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TX_COLUMNS} FROM transactions ORDER BY date DESC, id DESC"
    ))?;
    let raws = stmt
        .query_map([], RawTransaction::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut items_stmt = conn.prepare(
        "SELECT id, transaction_id, name, price, quantity, link, image_url FROM items ORDER BY id",
    )?;
    let items = collect_items(&mut items_stmt, [])?;
    let mut tags_stmt = conn.prepare(
        "SELECT transaction_id, tag_id FROM transaction_tags ORDER BY transaction_id, tag_id",
    )?;
    let tags = collect_links(&mut tags_stmt, [])?;

    let out = attach(raws, items, tags)?;
    debug!(count = out.len(), "loaded transactions");
    Ok(out)
}

/// Rows of one group in date order. Items are left empty, as the group view
/// only shows amounts and dates.
pub fn transactions_by_group(conn: &Connection, group_id: &str) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TX_COLUMNS} FROM transactions WHERE group_id=?1 ORDER BY date ASC, id ASC"
    ))?;
    let raws = stmt
        .query_map(params![group_id], RawTransaction::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    let mut tags_stmt = conn.prepare(
        "SELECT tt.transaction_id, tt.tag_id FROM transaction_tags tt
         WHERE tt.transaction_id IN (SELECT id FROM transactions WHERE group_id=?1)
         ORDER BY tt.transaction_id, tt.tag_id",
    )?;
    let tags = collect_links(&mut tags_stmt, params![group_id])?;
    attach(raws, HashMap::new(), tags)
}

pub fn load_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let mut stmt = conn.prepare(&format!("SELECT {TX_COLUMNS} FROM transactions WHERE id=?1"))?;
    let raws = stmt
        .query_map(params![id], RawTransaction::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    if raws.is_empty() {
        return Ok(None);
    }
    let mut items_stmt = conn.prepare(
        "SELECT id, transaction_id, name, price, quantity, link, image_url FROM items
         WHERE transaction_id=?1 ORDER BY id",
    )?;
    let items = collect_items(&mut items_stmt, params![id])?;
    let mut tags_stmt = conn.prepare(
        "SELECT transaction_id, tag_id FROM transaction_tags WHERE transaction_id=?1 ORDER BY tag_id",
    )?;
    let tags = collect_links(&mut tags_stmt, params![id])?;
    Ok(attach(raws, items, tags)?.into_iter().next())
}

pub fn load_tags(conn: &Connection) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM tags ORDER BY name, id")?;
    let rows = stmt.query_map([], |r| {
        Ok(Tag {
            id: r.get(0)?,
            name: r.get(1)?,
            color: r.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Wishlist tag links keyed by item id.
pub(crate) fn wishlist_tag_links(conn: &Connection) -> Result<HashMap<i64, Vec<i64>>> {
    let mut stmt =
        conn.prepare("SELECT item_id, tag_id FROM wishlist_item_tags ORDER BY item_id, tag_id")?;
    collect_links(&mut stmt, [])
}
