//! Account service
//!
//! `load` is the forgiving read used by the transfer form: one GET, order
//! kept, and any failure becomes an empty list. `list` is the strict read
//! behind the accounts view.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use super::logging::{note, ClientEvent, LogEvent, LoggingService};
use crate::domain::money::format_currency;
use crate::domain::result::Result;
use crate::domain::Account;
use crate::ports::{BankingApi, Credentials};

/// Service over the caller's own accounts
pub struct AccountService {
    api: Arc<dyn BankingApi>,
    logger: Option<Arc<LoggingService>>,
}

impl AccountService {
    pub fn new(api: Arc<dyn BankingApi>) -> Self {
        Self { api, logger: None }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Accounts in backend order, or an empty list on any failure
    pub fn load(&self, credentials: &Credentials) -> Vec<Account> {
        match self.api.get_accounts(credentials) {
            Ok(accounts) => accounts,
            Err(e) => {
                note(self.logger.as_deref(), LogEvent::new(ClientEvent::AccountsUnavailable).failed_with(e));
                Vec::new()
            }
        }
    }

    /// Accounts in backend order; failures are returned
    pub fn list(&self, credentials: &Credentials) -> Result<Vec<Account>> {
        self.api.get_accounts(credentials)
    }
}

/// One row of the accounts view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRow {
    pub id: String,
    pub account_type: String,
    pub number: String,
    pub balance: String,
    pub status: String,
}

/// Presentation of the account list, with balances optionally hidden
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsView {
    pub rows: Vec<AccountRow>,
    pub total: String,
    pub show_balances: bool,
}

const HIDDEN_BALANCE: &str = "••••••";

impl AccountsView {
    pub fn new(accounts: &[Account], currency: &str, show_balances: bool) -> Self {
        let shown = |amount: Decimal| {
            if show_balances {
                format_currency(amount, currency)
            } else {
                HIDDEN_BALANCE.to_string()
            }
        };

        let rows = accounts
            .iter()
            .map(|a| AccountRow {
                id: a.id.clone(),
                account_type: a.account_type.display_name().to_string(),
                number: a.masked_number(),
                balance: shown(a.balance),
                status: a.status.as_str().to_string(),
            })
            .collect();

        let total: Decimal = accounts.iter().map(|a| a.balance).sum();

        Self {
            rows,
            total: shown(total),
            show_balances,
        }
    }
}
