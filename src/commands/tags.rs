// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::utils::{maybe_print_json, pretty_table};
use crate::{store, tags};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let tag = tags::add_tag(conn, required(sub, "name")?, required(sub, "color")?)?;
            println!("Added tag '{}' ({}) id {}", tag.name, tag.color, tag.id);
        }
        Some(("list", sub)) => {
            let data = store::load_tags(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|t| vec![t.id.to_string(), t.name.clone(), t.color.clone()])
                    .collect();
                println!("{}", pretty_table(&["ID", "Name", "Color"], rows));
            }
        }
        Some(("rm", sub)) => {
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| anyhow!("Missing tag id"))?;
            tags::delete_tag(conn, id)?;
            println!("Deleted tag {}", id);
        }
        _ => {}
    }
    Ok(())
}
