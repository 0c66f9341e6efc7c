//! User profile and admin-console models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::Account;
use super::money::deserialize_amount;
use super::transaction::{Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(other)]
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Current user as returned by `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// Confirmation code the transfer wizard asks for before submitting
    #[serde(default, skip_serializing)]
    pub awc_code: Option<String>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Aggregates shown on the dashboard (`GET /dashboard/stats`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub total_balance: Decimal,
    #[serde(default)]
    pub account_count: u32,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub monthly_spending: Decimal,
    #[serde(default)]
    pub recent_transactions: Vec<Transaction>,
}

/// A user with their accounts, as listed by `GET /admin/users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl AdminUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Body of `POST /admin/transactions`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualTransaction {
    pub user_id: String,
    pub account_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Sent as a JSON number
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
}
