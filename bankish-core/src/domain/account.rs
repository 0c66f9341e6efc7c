//! Account domain model

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::deserialize_amount;

/// Account category as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
    #[serde(other)]
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::Credit => "credit",
            AccountType::Other => "other",
        }
    }

    /// Human-readable label, e.g. "Savings Account"
    pub fn display_name(&self) -> &'static str {
        match self {
            AccountType::Checking => "Checking Account",
            AccountType::Savings => "Savings Account",
            AccountType::Credit => "Credit Account",
            AccountType::Other => "Account",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
    #[serde(other)]
    Unknown,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Unknown => "unknown",
        }
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        AccountStatus::Active
    }
}

/// A bank account owned by the signed-in user
///
/// The client holds a read-only copy; it is replaced wholesale whenever the
/// account list is re-fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub account_number: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub balance: Decimal,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        account_type: AccountType,
        account_number: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            account_type,
            account_number: account_number.into(),
            balance,
            status: AccountStatus::Active,
            created_at: None,
        }
    }

    /// Last four digits of the account number
    pub fn last_four(&self) -> &str {
        last_four(&self.account_number)
    }

    /// Account number with everything but the last four digits hidden
    pub fn masked_number(&self) -> String {
        format!("••••{}", self.last_four())
    }

    /// Selector label, e.g. "savings (••••5678)"
    pub fn selector_label(&self) -> String {
        format!("{} ({})", self.account_type, self.masked_number())
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Last four characters of an identifier (fewer if it is shorter)
pub(crate) fn last_four(value: &str) -> &str {
    let count = value.chars().count();
    if count <= 4 {
        return value;
    }
    let start = value
        .char_indices()
        .nth(count - 4)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &value[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_account() {
        let json = r#"{
            "_id": "64f0c1",
            "accountType": "savings",
            "accountNumber": "1000200030005678",
            "balance": 500.25,
            "status": "active",
            "createdAt": "2024-01-15T10:00:00.000Z"
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.id, "64f0c1");
        assert_eq!(account.account_type, AccountType::Savings);
        assert_eq!(account.balance, Decimal::new(50025, 2));
        assert!(account.is_active());
        assert!(account.created_at.is_some());
    }

    #[test]
    fn test_unknown_type_and_status() {
        let json = r#"{"_id": "x", "accountType": "business", "balance": "10", "status": "frozen"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.account_type, AccountType::Other);
        assert_eq!(account.status, AccountStatus::Unknown);
        assert_eq!(account.account_type.display_name(), "Account");
    }

    #[test]
    fn test_masked_number_shows_last_four_only() {
        let account = Account::new("a", AccountType::Checking, "123456781234", Decimal::ZERO);
        assert_eq!(account.masked_number(), "••••1234");
        assert_eq!(account.selector_label(), "checking (••••1234)");

        let short = Account::new("b", AccountType::Checking, "12", Decimal::ZERO);
        assert_eq!(short.masked_number(), "••••12");
    }
}
