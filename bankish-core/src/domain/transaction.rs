//! Transaction history model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::deserialize_amount;
use super::result::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
    #[serde(other)]
    Other,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Transfer => "transfer",
            TransactionKind::Payment => "payment",
            TransactionKind::Other => "other",
        }
    }

    /// Money coming into the account
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionKind::Deposit)
    }

    /// Money leaving the account
    pub fn is_debit(&self) -> bool {
        matches!(
            self,
            TransactionKind::Withdrawal | TransactionKind::Transfer | TransactionKind::Payment
        )
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            "transfer" => Ok(TransactionKind::Transfer),
            "payment" => Ok(TransactionKind::Payment),
            other => Err(Error::validation(format!(
                "unknown transaction type '{}' (expected deposit, withdrawal, transfer or payment)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Unknown => "unknown",
        }
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

/// A posted or pending transaction as returned by `GET /transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(id: impl Into<String>, kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            id: id.into(),
            kind,
            amount,
            description: None,
            recipient_name: None,
            status: TransactionStatus::Completed,
            created_at: None,
        }
    }

    /// Case-insensitive match against description or recipient name
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [self.description.as_deref(), self.recipient_name.as_deref()]
            .iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Amount with the sign implied by the transaction kind
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_debit() {
            -self.amount.abs()
        } else {
            self.amount.abs()
        }
    }
}
