// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_setting, set_setting};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;

pub const KEYS: [&str; 4] = [
    "ollama_url",
    "ollama_model",
    "ollama_fallback_model",
    "context_months",
];

/// Runtime settings: `settings` table first, then environment, then defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub ollama_url: String,
    pub ollama_model: String,
    pub ollama_fallback_model: String,
    pub context_months: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            ollama_fallback_model: "llama3".to_string(),
            context_months: 4,
        }
    }
}

impl Config {
    pub fn load(conn: &Connection) -> Result<Self> {
        let defaults = Self::default();
        let pick = |key: &str, env: Option<&str>, fallback: String| -> Result<String> {
            if let Some(v) = get_setting(conn, key)? {
                return Ok(v);
            }
            if let Some(name) = env {
                if let Ok(v) = std::env::var(name) {
                    if !v.trim().is_empty() {
                        return Ok(v.trim().to_string());
                    }
                }
            }
            Ok(fallback)
        };

        let months = pick(
            "context_months",
            None,
            defaults.context_months.to_string(),
        )?;
        Ok(Self {
            ollama_url: pick("ollama_url", Some("OLLAMA_HOST"), defaults.ollama_url)?,
            ollama_model: pick("ollama_model", Some("OLLAMA_MODEL"), defaults.ollama_model)?,
            ollama_fallback_model: pick(
                "ollama_fallback_model",
                None,
                defaults.ollama_fallback_model,
            )?,
            context_months: months
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid context_months '{}'", months))?,
        })
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        if !KEYS.contains(&key) {
            return Err(anyhow!(
                "Unknown setting '{}' (known: {})",
                key,
                KEYS.join(", ")
            ));
        }
        if key == "context_months" {
            let n: u32 = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("context_months must be a positive integer"))?;
            if n == 0 {
                return Err(anyhow!("context_months must be a positive integer"));
            }
        }
        set_setting(conn, key, value.trim())
    }
}
