// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{required, strings};
use crate::utils::{fmt_ars, maybe_print_json, parse_decimal, pretty_table};
use crate::wishlist::{self, NewWish, WishPatch};
use crate::tags;
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            wishlist::delete_item(conn, id)?;
            println!("Deleted wishlist item {}", id);
        }
        Some(("option-add", sub)) => {
            let item_id = id_arg(sub, "item_id")?;
            let installments = *sub
                .get_one::<i64>("installments")
                .ok_or_else(|| anyhow!("Missing --installments"))?;
            let rate = parse_decimal(required(sub, "rate")?)?;
            let opt = wishlist::add_option(conn, item_id, installments, rate)?;
            println!(
                "Added option {}: {} cuotas, total {} ({})",
                opt.id,
                opt.installments,
                fmt_ars(&opt.total_amount),
                opt.description.as_deref().unwrap_or("")
            );
        }
        Some(("option-rm", sub)) => {
            let id = id_arg(sub, "id")?;
            wishlist::delete_option(conn, id)?;
            println!("Deleted option {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn id_arg(sub: &clap::ArgMatches, name: &str) -> Result<i64> {
    sub.get_one::<i64>(name)
        .copied()
        .ok_or_else(|| anyhow!("Missing {}", name))
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let wish = NewWish {
        name: required(sub, "name")?.to_string(),
        price: parse_decimal(required(sub, "price")?)?,
        link: sub.get_one::<String>("link").cloned(),
        image_url: sub.get_one::<String>("image").cloned(),
        notes: sub.get_one::<String>("notes").cloned(),
        priority: sub.get_one::<i64>("priority").copied().unwrap_or(0),
        tag_ids: tags::resolve(conn, &strings(sub, "tag"))?,
    };
    let id = wishlist::add_item(conn, &wish)?;
    println!("Added '{}' to the wishlist (id {})", wish.name, id);
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    let tag_names = strings(sub, "tag");
    let tag_ids = if sub.get_flag("clear-tags") {
        Some(Vec::new())
    } else if tag_names.is_empty() {
        None
    } else {
        Some(tags::resolve(conn, &tag_names)?)
    };
    let patch = WishPatch {
        name: sub.get_one::<String>("name").cloned(),
        price: sub
            .get_one::<String>("price")
            .map(|s| parse_decimal(s))
            .transpose()?,
        link: sub.get_one::<String>("link").cloned(),
        image_url: sub.get_one::<String>("image").cloned(),
        notes: sub.get_one::<String>("notes").cloned(),
        priority: sub.get_one::<i64>("priority").copied(),
        tag_ids,
    };
    wishlist::update_item(conn, id, &patch)?;
    println!("Updated wishlist item {}", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let items = wishlist::load_wishlist(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let mut rows = Vec::new();
    for item in &items {
        rows.push(vec![
            item.id.to_string(),
            item.name.clone(),
            fmt_ars(&item.price),
            item.priority.to_string(),
            String::new(),
            String::new(),
        ]);
        for opt in &item.options {
            let cmp = wishlist::compare(item, opt);
            rows.push(vec![
                format!("  opt {}", opt.id),
                format!("{} cuotas de {}", cmp.installments, fmt_ars(&cmp.monthly)),
                fmt_ars(&opt.total_amount),
                String::new(),
                fmt_ars(&cmp.surcharge),
                format!("{}%", cmp.surcharge_pct.round_dp(1)),
            ]);
        }
    }
    println!(
        "{}",
        pretty_table(
            &["ID", "Item", "Price", "Priority", "Surcharge", "Surcharge %"],
            rows,
        )
    );
    Ok(())
}
