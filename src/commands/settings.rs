// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::config::{Config, KEYS};
use crate::utils::pretty_table;
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let cfg = Config::load(conn)?;
            let value = serde_json::to_value(&cfg)?;
            match sub.get_one::<String>("key") {
                Some(key) => {
                    let v = value
                        .get(key.as_str())
                        .ok_or_else(|| anyhow!("Unknown setting '{}' (known: {})", key, KEYS.join(", ")))?;
                    println!("{}", v.as_str().map_or_else(|| v.to_string(), str::to_string));
                }
                None => {
                    let rows = KEYS
                        .iter()
                        .map(|k| {
                            let v = value.get(*k).map_or_else(String::new, |v| {
                                v.as_str().map_or_else(|| v.to_string(), str::to_string)
                            });
                            vec![k.to_string(), v]
                        })
                        .collect();
                    println!("{}", pretty_table(&["Key", "Value"], rows));
                }
            }
        }
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            Config::set(conn, key, required(sub, "value")?)?;
            println!("{} updated", key);
        }
        _ => {}
    }
    Ok(())
}
