//! Admin console
//!
//! The role check here only hides the console from non-admins; the backend
//! enforces the real permission. Every change re-reads the user list so the
//! caller always renders what the backend now holds.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::logging::{note, ClientEvent, LogEvent, LoggingService};
use crate::domain::result::{Error, Result};
use crate::domain::{AdminUser, ManualTransaction, TransactionKind, UserProfile};
use crate::ports::{BankingApi, Credentials};

pub struct AdminService {
    api: Arc<dyn BankingApi>,
    logger: Option<Arc<LoggingService>>,
}

impl AdminService {
    pub fn new(api: Arc<dyn BankingApi>) -> Self {
        Self { api, logger: None }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Profile of the caller, if they are an admin
    pub fn authorize(&self, credentials: &Credentials) -> Result<UserProfile> {
        let profile = self.api.get_profile(credentials)?;
        if !profile.is_admin() {
            return Err(Error::api(403, "Admin access required"));
        }
        Ok(profile)
    }

    pub fn users(&self, credentials: &Credentials) -> Result<Vec<AdminUser>> {
        self.authorize(credentials)?;
        self.api.admin_list_users(credentials)
    }

    /// Set an account balance, then return the refreshed user list
    pub fn set_balance(
        &self,
        credentials: &Credentials,
        account_id: &str,
        balance: &str,
    ) -> Result<Vec<AdminUser>> {
        self.authorize(credentials)?;
        let account_id = non_empty(account_id, "account id")?;
        let balance: Decimal = balance
            .trim()
            .parse()
            .map_err(|_| Error::validation(format!("balance '{}' is not a number", balance.trim())))?;

        self.api.admin_update_balance(credentials, account_id, balance)?;
        self.log(ClientEvent::BalanceCorrected);
        self.api.admin_list_users(credentials)
    }

    /// Post a manual transaction, then return the refreshed user list
    pub fn add_transaction(
        &self,
        credentials: &Credentials,
        user_id: &str,
        account_id: &str,
        kind: TransactionKind,
        amount: &str,
        description: &str,
    ) -> Result<Vec<AdminUser>> {
        self.authorize(credentials)?;
        let amount: Decimal = amount
            .trim()
            .parse()
            .map_err(|_| Error::validation(format!("amount '{}' is not a number", amount.trim())))?;
        if amount <= Decimal::ZERO {
            return Err(Error::validation("amount must be greater than zero"));
        }

        let transaction = ManualTransaction {
            user_id: non_empty(user_id, "user id")?.to_string(),
            account_id: non_empty(account_id, "account id")?.to_string(),
            kind,
            amount,
            description: description.trim().to_string(),
        };

        self.api.admin_add_transaction(credentials, &transaction)?;
        self.log(ClientEvent::TransactionPosted);
        self.api.admin_list_users(credentials)
    }

    fn log(&self, event: ClientEvent) {
        note(self.logger.as_deref(), LogEvent::new(event));
    }
}

fn non_empty<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} is required", name)));
    }
    Ok(value)
}
