// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValidationError;
use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Purchase,
    Subscription,
    Service,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "purchase",
            TransactionType::Subscription => "subscription",
            TransactionType::Service => "service",
        }
    }
}

impl FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "purchase" => Ok(TransactionType::Purchase),
            "subscription" => Ok(TransactionType::Subscription),
            "service" => Ok(TransactionType::Service),
            other => Err(anyhow!(
                "Unknown transaction type '{}' (use purchase|subscription|service)",
                other
            )),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Completed => "completed",
        }
    }

    pub fn toggled(&self) -> Status {
        match self {
            Status::Pending => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "completed" => Ok(Status::Completed),
            other => Err(anyhow!("Unknown status '{}' (use pending|completed)", other)),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: i64,
    pub transaction_id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
    pub link: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub shop_name: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: Status,
    pub is_debt: bool,
    pub debt_to: Option<String>,
    pub r#type: TransactionType,
    pub is_recurring: bool,
    pub group_id: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub tag_ids: Vec<i64>,
    pub items: Vec<TransactionItem>,
    pub created_at: Option<NaiveDateTime>,
}

impl Transaction {
    /// Date used for month matching: the payment date when present.
    pub fn effective_date(&self) -> NaiveDate {
        self.payment_date.unwrap_or(self.date)
    }
}

/// Line item as submitted, before it has a row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// What the user asked to record. One intent may become several installment rows.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub shop_name: String,
    pub total_amount: Decimal,
    pub installments: u32,
    pub is_debt: bool,
    pub debt_to: Option<String>,
    pub r#type: TransactionType,
    pub is_recurring: bool,
    pub group_id: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub tag_ids: Vec<i64>,
    pub items: Vec<NewItem>,
}

/// Longest installment plan accepted (ten years of monthly rows).
pub const MAX_INSTALLMENTS: u32 = 120;

impl NewTransaction {
    /// A single-item intent whose item mirrors the shop name and amount.
    pub fn simple(
        r#type: TransactionType,
        shop_name: &str,
        date: NaiveDate,
        total_amount: Decimal,
    ) -> Self {
        Self {
            date,
            shop_name: shop_name.to_string(),
            total_amount,
            installments: 1,
            is_debt: false,
            debt_to: None,
            r#type,
            is_recurring: r#type != TransactionType::Purchase,
            group_id: None,
            payment_date: None,
            recurrence_end_date: None,
            tag_ids: Vec::new(),
            items: vec![NewItem {
                name: shop_name.to_string(),
                price: total_amount,
                quantity: 1,
                link: None,
                image_url: None,
            }],
        }
    }

    /// Number of rows this intent expands into.
    pub fn row_count(&self) -> u32 {
        match self.r#type {
            TransactionType::Purchase => self.installments.max(1),
            _ => 1,
        }
    }

    /// Applies the form rules: only subscriptions and services recur, and
    /// they always carry one item mirroring shop name and amount.
    pub fn normalized(mut self) -> Self {
        if self.r#type == TransactionType::Purchase {
            self.is_recurring = false;
        } else {
            self.installments = 1;
            self.items = vec![NewItem {
                name: self.shop_name.clone(),
                price: self.total_amount,
                quantity: 1,
                link: None,
                image_url: None,
            }];
        }
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.shop_name.trim().is_empty() {
            return Err(ValidationError::MissingShopName);
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        if !(1..=MAX_INSTALLMENTS).contains(&self.installments) {
            return Err(ValidationError::Installments(self.installments));
        }
        if self.total_amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount(self.total_amount));
        }
        for item in &self.items {
            if item.name.trim().is_empty() {
                return Err(ValidationError::MissingItemName);
            }
            if item.quantity < 1 {
                return Err(ValidationError::Quantity(item.name.clone(), item.quantity));
            }
            if item.price < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount(item.price));
            }
        }
        if let Some(end) = self.recurrence_end_date {
            if end < self.date {
                return Err(ValidationError::EndBeforeStart(end, self.date));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistOption {
    pub id: i64,
    pub item_id: i64,
    pub installments: i64,
    pub interest_rate: Decimal,
    pub total_amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub priority: i64,
    pub notes: Option<String>,
    pub tag_ids: Vec<i64>,
    pub options: Vec<WishlistOption>,
}

/// Where a projected instance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Origin {
    Real,
    /// Synthesized from the recurring row `source_id`; never persisted as such.
    Virtual { source_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projected {
    pub transaction: Transaction,
    pub origin: Origin,
}

impl Projected {
    pub fn is_virtual(&self) -> bool {
        matches!(self.origin, Origin::Virtual { .. })
    }
}
