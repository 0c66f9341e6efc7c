//! Banking backend port
//!
//! Everything the client asks of the remote REST service. Every call takes
//! the caller's [`Credentials`] explicitly; nothing reads the token store
//! behind the caller's back.

use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::domain::result::Result;
use crate::domain::{Account, AdminUser, Card, DashboardStats, ManualTransaction, Transaction, UserProfile};

use super::session::Credentials;

/// Backend acknowledgement of a mutating request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Acknowledgement {
    /// Optional `message` field from the response body
    pub message: Option<String>,
}

/// Remote banking API
pub trait BankingApi: Send + Sync {
    /// `GET /accounts`, in backend order
    fn get_accounts(&self, credentials: &Credentials) -> Result<Vec<Account>>;

    /// `GET /auth/me`, including the transfer confirmation code
    fn get_profile(&self, credentials: &Credentials) -> Result<UserProfile>;

    /// `POST /transactions/transfer` with the flattened transfer payload
    fn submit_transfer(&self, credentials: &Credentials, payload: &JsonValue) -> Result<Acknowledgement>;

    /// `GET /transactions`
    fn get_transactions(&self, credentials: &Credentials) -> Result<Vec<Transaction>>;

    /// `GET /cards`
    fn get_cards(&self, credentials: &Credentials) -> Result<Vec<Card>>;

    /// `GET /dashboard/stats`
    fn get_dashboard_stats(&self, credentials: &Credentials) -> Result<DashboardStats>;

    /// `GET /admin/users`
    fn admin_list_users(&self, credentials: &Credentials) -> Result<Vec<AdminUser>>;

    /// `PATCH /admin/accounts/{id}` with `{ balance }`
    fn admin_update_balance(
        &self,
        credentials: &Credentials,
        account_id: &str,
        balance: Decimal,
    ) -> Result<Acknowledgement>;

    /// `POST /admin/transactions`
    fn admin_add_transaction(
        &self,
        credentials: &Credentials,
        transaction: &ManualTransaction,
    ) -> Result<Acknowledgement>;
}
