// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::CuotiError;
use crate::models::{WishlistItem, WishlistOption};
use crate::store::{parse_amount, wishlist_tag_links};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct NewWish {
    pub name: String,
    pub price: Decimal,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub priority: i64,
    pub tag_ids: Vec<i64>,
}

/// Fields left as `None` keep their stored value; `tag_ids` replaces the
/// links only when present.
#[derive(Debug, Clone, Default)]
pub struct WishPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<i64>,
    pub tag_ids: Option<Vec<i64>>,
}

pub fn add_item(conn: &mut Connection, wish: &NewWish) -> Result<i64> {
    if wish.name.trim().is_empty() {
        return Err(anyhow!("Wishlist item name is required"));
    }
    if wish.price < Decimal::ZERO {
        return Err(anyhow!("Wishlist price must not be negative"));
    }
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO wishlist_items(name, price, link, image_url, notes, priority)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            wish.name.trim(),
            wish.price.to_string(),
            wish.link,
            wish.image_url,
            wish.notes,
            wish.priority
        ],
    )?;
    let id = tx.last_insert_rowid();
    for tag_id in &wish.tag_ids {
        tx.execute(
            "INSERT OR IGNORE INTO wishlist_item_tags(item_id, tag_id) VALUES (?1, ?2)",
            params![id, tag_id],
        )?;
    }
    tx.commit()?;
    info!(id, name = %wish.name, "added wishlist item");
    Ok(id)
}

pub fn update_item(conn: &mut Connection, id: i64, patch: &WishPatch) -> Result<()> {
    let tx = conn.transaction()?;
    let changed = tx.execute(
        "UPDATE wishlist_items SET
            name=COALESCE(?1, name),
            price=COALESCE(?2, price),
            link=COALESCE(?3, link),
            image_url=COALESCE(?4, image_url),
            notes=COALESCE(?5, notes),
            priority=COALESCE(?6, priority)
         WHERE id=?7",
        params![
            patch.name,
            patch.price.map(|p| p.to_string()),
            patch.link,
            patch.image_url,
            patch.notes,
            patch.priority,
            id
        ],
    )?;
    if changed == 0 {
        return Err(CuotiError::NotFound("Wishlist item", id.to_string()).into());
    }
    if let Some(tag_ids) = &patch.tag_ids {
        tx.execute(
            "DELETE FROM wishlist_item_tags WHERE item_id=?1",
            params![id],
        )?;
        for tag_id in tag_ids {
            tx.execute(
                "INSERT OR IGNORE INTO wishlist_item_tags(item_id, tag_id) VALUES (?1, ?2)",
                params![id, tag_id],
            )?;
        }
    }
    tx.commit()?;
    info!(id, "updated wishlist item");
    Ok(())
}

/// Removes the item with its financing options and tag links.
pub fn delete_item(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM wishlist_options WHERE item_id=?1", params![id])?;
    tx.execute(
        "DELETE FROM wishlist_item_tags WHERE item_id=?1",
        params![id],
    )?;
    let removed = tx.execute("DELETE FROM wishlist_items WHERE id=?1", params![id])?;
    if removed == 0 {
        return Err(CuotiError::NotFound("Wishlist item", id.to_string()).into());
    }
    tx.commit()?;
    info!(id, "deleted wishlist item");
    Ok(())
}

/// Financed total for `price` at `interest_rate` percent.
pub fn financed_total(price: Decimal, interest_rate: Decimal) -> Decimal {
    price * (Decimal::ONE + interest_rate / Decimal::ONE_HUNDRED)
}

pub fn add_option(
    conn: &Connection,
    item_id: i64,
    installments: i64,
    interest_rate: Decimal,
) -> Result<WishlistOption> {
    if installments < 1 {
        return Err(anyhow!("Installments must be at least 1 (got {})", installments));
    }
    let price: String = conn
        .query_row(
            "SELECT price FROM wishlist_items WHERE id=?1",
            params![item_id],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| CuotiError::NotFound("Wishlist item", item_id.to_string()))?;
    let total_amount = financed_total(parse_amount(&price)?, interest_rate);
    let description = if interest_rate.is_zero() {
        "Sin interés"
    } else {
        "Con interés"
    };
    conn.execute(
        "INSERT INTO wishlist_options(item_id, installments, interest_rate, total_amount, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item_id,
            installments,
            interest_rate.to_string(),
            total_amount.to_string(),
            description
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, item_id, installments, "added wishlist option");
    Ok(WishlistOption {
        id,
        item_id,
        installments,
        interest_rate,
        total_amount,
        description: Some(description.to_string()),
    })
}

pub fn delete_option(conn: &Connection, id: i64) -> Result<()> {
    let removed = conn.execute("DELETE FROM wishlist_options WHERE id=?1", params![id])?;
    if removed == 0 {
        return Err(CuotiError::NotFound("Wishlist option", id.to_string()).into());
    }
    Ok(())
}

/// All items, newest first, with options and tags attached.
pub fn load_wishlist(conn: &Connection) -> Result<Vec<WishlistItem>> {
    let mut opt_stmt = conn.prepare(
        "SELECT id, item_id, installments, interest_rate, total_amount, description
         FROM wishlist_options ORDER BY installments, id",
    )?;
    let opt_rows = opt_stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, i64>(1)?,
            r.get::<_, i64>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<String>>(5)?,
        ))
    })?;
    let mut options: HashMap<i64, Vec<WishlistOption>> = HashMap::new();
    for row in opt_rows {
        let (id, item_id, installments, rate, total, description) = row?;
        options.entry(item_id).or_default().push(WishlistOption {
            id,
            item_id,
            installments,
            interest_rate: parse_amount(&rate)?,
            total_amount: parse_amount(&total)?,
            description,
        });
    }
    let mut tags = wishlist_tag_links(conn)?;

    let mut stmt = conn.prepare(
        "SELECT id, name, price, link, image_url, priority, notes
         FROM wishlist_items ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, Option<i64>>(5)?,
            r.get::<_, Option<String>>(6)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, price, link, image_url, priority, notes) = row?;
        out.push(WishlistItem {
            id,
            name,
            price: parse_amount(&price)?,
            link,
            image_url,
            priority: priority.unwrap_or(0),
            notes,
            tag_ids: tags.remove(&id).unwrap_or_default(),
            options: options.remove(&id).unwrap_or_default(),
        });
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionComparison {
    pub installments: i64,
    pub monthly: Decimal,
    pub surcharge: Decimal,
    /// Surcharge as a percentage of the cash price; zero when the price is zero.
    pub surcharge_pct: Decimal,
}

pub fn compare(item: &WishlistItem, option: &WishlistOption) -> OptionComparison {
    let monthly = option.total_amount / Decimal::from(option.installments.max(1));
    let surcharge = option.total_amount - item.price;
    let surcharge_pct = if item.price.is_zero() {
        Decimal::ZERO
    } else {
        surcharge / item.price * Decimal::ONE_HUNDRED
    };
    OptionComparison {
        installments: option.installments,
        monthly,
        surcharge,
        surcharge_pct,
    }
}
