// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{CuotiError, ValidationError};
use crate::models::Tag;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("static regex"));

pub fn validate(name: &str, color: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingTagName);
    }
    if !HEX_COLOR.is_match(color.trim()) {
        return Err(ValidationError::TagColor(color.to_string()));
    }
    Ok(())
}

pub fn add_tag(conn: &Connection, name: &str, color: &str) -> Result<Tag> {
    validate(name, color)?;
    let name = name.trim();
    let color = color.trim().to_lowercase();
    conn.execute(
        "INSERT INTO tags(name, color) VALUES (?1, ?2)",
        params![name, color],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, name, "added tag");
    Ok(Tag {
        id,
        name: name.to_string(),
        color,
    })
}

/// Removes the tag and every transaction and wishlist link to it.
pub fn delete_tag(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM transaction_tags WHERE tag_id=?1",
        params![id],
    )?;
    conn.execute(
        "DELETE FROM wishlist_item_tags WHERE tag_id=?1",
        params![id],
    )?;
    let removed = conn.execute("DELETE FROM tags WHERE id=?1", params![id])?;
    if removed == 0 {
        return Err(CuotiError::NotFound("Tag", id.to_string()).into());
    }
    info!(id, "deleted tag");
    Ok(())
}

/// Resolves tag names (case-insensitive) or numeric ids to ids.
pub fn resolve(conn: &Connection, names: &[String]) -> Result<Vec<i64>> {
    let mut out = Vec::with_capacity(names.len());
    for raw in names {
        let key = raw.trim();
        if key.is_empty() {
            continue;
        }
        let id: Option<i64> = if let Ok(n) = key.parse::<i64>() {
            conn.query_row("SELECT id FROM tags WHERE id=?1", params![n], |r| r.get(0))
                .optional()?
        } else {
            conn.query_row(
                "SELECT id FROM tags WHERE lower(name)=lower(?1) ORDER BY id LIMIT 1",
                params![key],
                |r| r.get(0),
            )
            .optional()?
        };
        match id {
            Some(id) if !out.contains(&id) => out.push(id),
            Some(_) => {}
            None => return Err(CuotiError::NotFound("Tag", key.to_string()).into()),
        }
    }
    Ok(out)
}
