// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Writes transactions: installment expansion, edits, deletes and
//! materialization of projected occurrences.

use crate::calendar::{YearMonth, add_months};
use crate::error::{CuotiError, ValidationError};
use crate::models::{
    MAX_INSTALLMENTS, NewItem, NewTransaction, Origin, Projected, Status, Transaction,
};
use crate::projection::project;
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Expands `intent` into its installment rows and returns their ids in order.
///
/// A purchase in `N` installments becomes `N` rows one calendar month apart,
/// each carrying `1/N` of the amount and of every item price, and a
/// ` (i/N)` suffix on the shop name. Everything else becomes one row. All
/// rows share a group id, freshly generated unless the intent brings one.
/// The rows are written in a single SQLite transaction.
pub fn create(conn: &mut Connection, intent: &NewTransaction) -> Result<Vec<i64>> {
    let tx = conn.transaction()?;
    let ids = insert_rows(&tx, intent, Status::Pending)?;
    tx.commit()?;
    info!(
        shop = %intent.shop_name,
        rows = ids.len(),
        "recorded transaction"
    );
    Ok(ids)
}

fn insert_rows(conn: &Connection, intent: &NewTransaction, status: Status) -> Result<Vec<i64>> {
    let loop_count = intent.row_count();
    if loop_count > MAX_INSTALLMENTS {
        return Err(ValidationError::Installments(loop_count).into());
    }
    let divisor = Decimal::from(loop_count);
    let group_id = intent
        .group_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let amount = intent.total_amount / divisor;

    let mut ids = Vec::with_capacity(loop_count as usize);
    for i in 0..loop_count {
        let date = add_months(intent.date, i);
        let payment_date = intent.payment_date.map(|p| add_months(p, i));
        let shop_name = if loop_count > 1 {
            format!("{} ({}/{})", intent.shop_name, i + 1, loop_count)
        } else {
            intent.shop_name.clone()
        };

        conn.execute(
            "INSERT INTO transactions(date, shop_name, total_amount, is_debt, debt_to, type,
                is_recurring, group_id, status, payment_date, recurrence_end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                date.to_string(),
                shop_name,
                amount.to_string(),
                intent.is_debt,
                intent.debt_to,
                intent.r#type.as_str(),
                intent.is_recurring,
                group_id,
                status.as_str(),
                payment_date.map(|d| d.to_string()),
                intent.recurrence_end_date.map(|d| d.to_string()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        insert_tags(conn, id, &intent.tag_ids)?;
        insert_items(conn, id, &intent.items, divisor)?;
        debug!(id, %date, %amount, "inserted installment row");
        ids.push(id);
    }
    Ok(ids)
}

fn insert_tags(conn: &Connection, transaction_id: i64, tag_ids: &[i64]) -> Result<()> {
    let mut stmt = conn
        .prepare_cached("INSERT OR IGNORE INTO transaction_tags(transaction_id, tag_id) VALUES (?1, ?2)")?;
    for tag_id in tag_ids {
        stmt.execute(params![transaction_id, tag_id])?;
    }
    Ok(())
}

fn insert_items(
    conn: &Connection,
    transaction_id: i64,
    items: &[NewItem],
    divisor: Decimal,
) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO items(transaction_id, name, price, quantity, link, image_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for item in items {
        stmt.execute(params![
            transaction_id,
            item.name,
            (item.price / divisor).to_string(),
            item.quantity,
            item.link,
            item.image_url,
        ])?;
    }
    Ok(())
}

/// Replaces one row's fields, tags and items. Sibling installments are untouched.
pub fn update(conn: &mut Connection, id: i64, intent: &NewTransaction) -> Result<()> {
    let tx = conn.transaction()?;
    let changed = tx.execute(
        "UPDATE transactions SET
            date=?1, shop_name=?2, total_amount=?3, is_debt=?4, debt_to=?5, type=?6,
            is_recurring=?7, payment_date=?8, recurrence_end_date=?9
         WHERE id=?10",
        params![
            intent.date.to_string(),
            intent.shop_name,
            intent.total_amount.to_string(),
            intent.is_debt,
            intent.debt_to,
            intent.r#type.as_str(),
            intent.is_recurring,
            intent.payment_date.map(|d| d.to_string()),
            intent.recurrence_end_date.map(|d| d.to_string()),
            id,
        ],
    )?;
    if changed == 0 {
        return Err(CuotiError::NotFound("Transaction", id.to_string()).into());
    }

    tx.execute(
        "DELETE FROM transaction_tags WHERE transaction_id=?1",
        params![id],
    )?;
    insert_tags(&tx, id, &intent.tag_ids)?;
    tx.execute("DELETE FROM items WHERE transaction_id=?1", params![id])?;
    insert_items(&tx, id, &intent.items, Decimal::ONE)?;
    tx.commit()?;
    info!(id, "updated transaction");
    Ok(())
}

pub fn delete(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM items WHERE transaction_id=?1", params![id])?;
    tx.execute(
        "DELETE FROM transaction_tags WHERE transaction_id=?1",
        params![id],
    )?;
    let removed = tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if removed == 0 {
        return Err(CuotiError::NotFound("Transaction", id.to_string()).into());
    }
    tx.commit()?;
    info!(id, "deleted transaction");
    Ok(())
}

/// Deletes every row sharing `group_id`; returns how many transactions went.
pub fn delete_group(conn: &mut Connection, group_id: &str) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM items WHERE transaction_id IN (SELECT id FROM transactions WHERE group_id=?1)",
        params![group_id],
    )?;
    tx.execute(
        "DELETE FROM transaction_tags WHERE transaction_id IN (SELECT id FROM transactions WHERE group_id=?1)",
        params![group_id],
    )?;
    let removed = tx.execute("DELETE FROM transactions WHERE group_id=?1", params![group_id])?;
    tx.commit()?;
    info!(group_id, removed, "deleted transaction group");
    Ok(removed)
}

pub fn set_status(conn: &Connection, id: i64, status: Status) -> Result<()> {
    let changed = conn.execute(
        "UPDATE transactions SET status=?1 WHERE id=?2",
        params![status.as_str(), id],
    )?;
    if changed == 0 {
        return Err(CuotiError::NotFound("Transaction", id.to_string()).into());
    }
    info!(id, %status, "status changed");
    Ok(())
}

/// Turns a virtual occurrence into a real row of its group, with `status`
/// applied in the same write.
pub fn materialize(conn: &mut Connection, occurrence: &Projected, status: Status) -> Result<i64> {
    let Origin::Virtual { source_id } = occurrence.origin else {
        return Err(CuotiError::NotVirtual.into());
    };
    let intent = occurrence_intent(&occurrence.transaction);
    let tx = conn.transaction()?;
    let ids = insert_rows(&tx, &intent, status)?;
    tx.commit()?;
    let id = ids
        .first()
        .copied()
        .ok_or_else(|| CuotiError::NotFound("Materialized row for", source_id.to_string()))?;
    info!(source_id, id, %status, "materialized occurrence");
    Ok(id)
}

/// The monthly instance is a plain row of the group, not another generator.
fn occurrence_intent(t: &Transaction) -> NewTransaction {
    NewTransaction {
        date: t.date,
        shop_name: t.shop_name.clone(),
        total_amount: t.total_amount,
        installments: 1,
        is_debt: t.is_debt,
        debt_to: t.debt_to.clone(),
        r#type: t.r#type,
        is_recurring: false,
        group_id: t.group_id.clone(),
        payment_date: t.payment_date,
        recurrence_end_date: None,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Toggle {
    Updated { id: i64, status: Status },
    Materialized { source_id: i64, id: i64 },
}

/// Flips the payment state of `id` as seen in `month`: a real row changes
/// status, a virtual occurrence of generator `id` becomes a completed row.
pub fn toggle(
    conn: &mut Connection,
    all: &[Transaction],
    month: YearMonth,
    id: i64,
) -> Result<Toggle> {
    let projected = project(all, month);
    if let Some(p) = projected
        .iter()
        .find(|p| p.origin == Origin::Real && p.transaction.id == id)
    {
        let status = p.transaction.status.toggled();
        set_status(conn, id, status)?;
        return Ok(Toggle::Updated { id, status });
    }
    if let Some(p) = projected
        .iter()
        .find(|p| p.origin == Origin::Virtual { source_id: id })
    {
        let new_id = materialize(conn, p, Status::Completed)?;
        return Ok(Toggle::Materialized {
            source_id: id,
            id: new_id,
        });
    }
    Err(CuotiError::NotInMonth {
        id,
        month: month.to_string(),
    }
    .into())
}
