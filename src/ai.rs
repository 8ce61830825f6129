// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local assistant backed by an Ollama server.

use crate::config::Config;
use crate::models::{NewItem, NewTransaction, TransactionType};
use crate::utils::parse_date;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Shown instead of an answer whenever the assistant cannot be reached.
pub const APOLOGY: &str = "Lo siento, no pude comunicarme con el asistente local (Ollama). \
     Revisá que Ollama esté en ejecución e intentá de nuevo.";

/// Chat turns sent along with the system prompt.
pub const HISTORY_WINDOW: usize = 10;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }
}

pub fn system_prompt(context: &str) -> String {
    format!(
        "Sos \"Cuoti AI\", un asistente de finanzas personales claro y amable.\n\
         Ayudás a la persona a entender sus gastos usando solamente los datos de abajo.\n\n\
         DATOS FINANCIEROS:\n{context}\n\n\
         PAUTAS:\n\
         - Respondé en español, de forma breve y directa.\n\
         - Para gastos futuros usá solo la proyección provista; si falta información, decilo.\n\
         - Ante \"¿qué pasa si gasto X?\", sumalo al total del mes y mostrá el resultado.\n\
         - Podés sugerir hábitos básicos (ahorro, evitar deudas) cuando venga al caso.\n\
         - Usá Markdown para listas y resaltados.\n\
         - Respetá el formato de montos $1.000,00 y los totales ya calculados."
    )
}

/// System prompt followed by the last [`HISTORY_WINDOW`] turns.
pub fn build_messages(history: &[ChatMessage], context: &str) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut out = Vec::with_capacity(HISTORY_WINDOW + 1);
    out.push(ChatMessage {
        role: Role::System,
        content: system_prompt(context),
    });
    out.extend(history[start..].iter().cloned());
    out
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    name: String,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    fallback_model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, fallback_model: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            fallback_model: fallback_model.to_string(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(&cfg.ollama_url, &cfg.ollama_model, &cfg.ollama_fallback_model)
    }

    /// Answers the last user turn. Never fails: any problem is logged and
    /// replaced by [`APOLOGY`].
    pub fn chat(&self, history: &[ChatMessage], context: &str) -> String {
        match self.try_chat(history, context) {
            Ok(answer) => answer,
            Err(err) => {
                error!(error = %err, "assistant chat failed");
                APOLOGY.to_string()
            }
        }
    }

    fn try_chat(&self, history: &[ChatMessage], context: &str) -> Result<String> {
        let messages = build_messages(history, context);
        let url = format!("{}/api/chat", self.base_url);
        let mut resp = self.post_chat(&url, &self.model, &messages)?;
        if !resp.status().is_success() {
            warn!(
                model = %self.model,
                status = %resp.status(),
                fallback = %self.fallback_model,
                "chat model rejected request, retrying with fallback"
            );
            resp = self
                .post_chat(&url, &self.fallback_model, &messages)?
                .error_for_status()?;
        }
        let body: ChatResponse = resp.json().context("Unexpected chat response")?;
        Ok(body.message.content)
    }

    fn post_chat(
        &self,
        url: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<reqwest::blocking::Response> {
        debug!(model, turns = messages.len(), "posting chat");
        let resp = self
            .http
            .post(url)
            .json(&ChatRequest {
                model,
                messages,
                stream: false,
            })
            .send()?;
        Ok(resp)
    }

    pub fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self.http.get(url).send()?.error_for_status()?;
        let tags: TagsResponse = resp.json()?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Turns a free-text description ("zapatillas en 6 cuotas de 20000")
    /// into a purchase intent.
    pub fn parse_entry(
        &self,
        text: &str,
        model: Option<&str>,
        today: NaiveDate,
    ) -> Result<NewTransaction> {
        let prompt = entry_prompt(text, today);
        let model = model.unwrap_or(&self.model);
        let url = format!("{}/api/generate", self.base_url);
        let resp = self
            .http
            .post(url)
            .json(&GenerateRequest {
                model,
                prompt: &prompt,
                stream: false,
                format: "json",
            })
            .send()?
            .error_for_status()?;
        let body: GenerateResponse = resp.json().context("Unexpected generate response")?;
        entry_from_json(&body.response, today)
    }
}

fn entry_prompt(text: &str, today: NaiveDate) -> String {
    format!(
        "Extraé los datos de esta compra: \"{text}\".\n\
         Devolvé SOLO un objeto JSON con esta forma:\n\
         {{\"shopName\": string, \"date\": \"YYYY-MM-DD\", \"totalAmount\": number, \
         \"installments\": number, \"items\": [{{\"name\": string, \"price\": number, \"quantity\": number}}]}}\n\
         Si no hay fecha usá {today}. \"installments\" vale 1 salvo que el texto diga \
         algo como \"en 12 cuotas\" o \"a 3 meses\"."
    )
}

#[derive(Debug, Deserialize)]
struct ParsedEntry {
    #[serde(rename = "shopName", alias = "shop_name", default)]
    shop_name: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(rename = "totalAmount", alias = "total_amount", default)]
    total_amount: Option<f64>,
    #[serde(default)]
    installments: Option<u32>,
    #[serde(default)]
    items: Vec<ParsedItem>,
}

#[derive(Debug, Deserialize)]
struct ParsedItem {
    name: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    quantity: Option<i64>,
}

fn to_decimal(v: f64) -> Result<Decimal> {
    Decimal::try_from(v).with_context(|| format!("Invalid amount {}", v))
}

/// Builds the intent from the model's JSON answer, tolerating code fences
/// and missing fields.
pub fn entry_from_json(raw: &str, today: NaiveDate) -> Result<NewTransaction> {
    let json = CODE_FENCE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or(raw, |m| m.as_str());
    let parsed: ParsedEntry = serde_json::from_str(json)
        .map_err(|e| anyhow!("Model did not return the expected JSON: {}", e))?;

    let shop_name = parsed
        .shop_name
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Desconocido".to_string());
    let date = match parsed.date.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => parse_date(d).unwrap_or(today),
        _ => today,
    };

    let mut items = Vec::with_capacity(parsed.items.len());
    for i in parsed.items {
        items.push(NewItem {
            name: i.name,
            price: to_decimal(i.price)?,
            quantity: i.quantity.unwrap_or(1).max(1),
            link: None,
            image_url: None,
        });
    }
    let total_amount = match parsed.total_amount {
        Some(v) => to_decimal(v)?,
        None => items
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum(),
    };

    let mut intent = NewTransaction::simple(TransactionType::Purchase, &shop_name, date, total_amount);
    intent.installments = parsed.installments.unwrap_or(1).max(1);
    if !items.is_empty() {
        intent.items = items;
    }
    Ok(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn history_is_trimmed_to_window() {
        let history: Vec<ChatMessage> = (0..15).map(|i| ChatMessage::user(&i.to_string())).collect();
        let msgs = build_messages(&history, "ctx");
        assert_eq!(msgs.len(), HISTORY_WINDOW + 1);
        assert_eq!(msgs[0].role, Role::System);
        assert!(msgs[0].content.contains("ctx"));
        assert_eq!(msgs[1].content, "5");
        assert_eq!(msgs.last().unwrap().content, "14");
    }

    #[test]
    fn entry_defaults_fill_gaps() {
        let intent = entry_from_json(r#"{"totalAmount": 1200}"#, today()).unwrap();
        assert_eq!(intent.shop_name, "Desconocido");
        assert_eq!(intent.date, today());
        assert_eq!(intent.installments, 1);
        assert_eq!(intent.total_amount, Decimal::from(1200));
        assert_eq!(intent.items.len(), 1);
    }

    #[test]
    fn entry_accepts_fenced_json() {
        let raw = "```json\n{\"shopName\":\"Garbarino\",\"date\":\"2024-04-20\",\"installments\":12,\
                   \"items\":[{\"name\":\"TV\",\"price\":600000,\"quantity\":1}]}\n```";
        let intent = entry_from_json(raw, today()).unwrap();
        assert_eq!(intent.shop_name, "Garbarino");
        assert_eq!(intent.date, NaiveDate::from_ymd_opt(2024, 4, 20).unwrap());
        assert_eq!(intent.installments, 12);
        assert_eq!(intent.total_amount, Decimal::from(600000));
        assert_eq!(intent.items[0].name, "TV");
    }

    #[test]
    fn entry_rejects_non_json() {
        assert!(entry_from_json("no entiendo", today()).is_err());
    }
}
