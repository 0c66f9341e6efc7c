//! Payment card model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::last_four;
use super::money::deserialize_optional_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Debit,
    Credit,
    #[serde(other)]
    Other,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Debit => "debit",
            CardType::Credit => "credit",
            CardType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Blocked,
    Expired,
    #[serde(other)]
    Unknown,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Active => "active",
            CardStatus::Blocked => "blocked",
            CardStatus::Expired => "expired",
            CardStatus::Unknown => "unknown",
        }
    }
}

impl Default for CardStatus {
    fn default() -> Self {
        CardStatus::Unknown
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: String,
    pub card_type: CardType,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub status: CardStatus,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub credit_limit: Option<Decimal>,
}

impl Card {
    /// Full number split into groups of four, e.g. "4111 1111 1111 1111"
    pub fn formatted_number(&self) -> String {
        let chars: Vec<char> = self.card_number.chars().collect();
        chars
            .chunks(4)
            .map(|group| group.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number with all but the last four digits hidden
    pub fn masked_number(&self) -> String {
        format!("•••• •••• •••• {}", last_four(&self.card_number))
    }

    /// Credit limit, only meaningful for credit cards
    pub fn display_limit(&self) -> Option<Decimal> {
        match self.card_type {
            CardType::Credit => Some(self.credit_limit.unwrap_or(Decimal::ZERO)),
            _ => None,
        }
    }
}
