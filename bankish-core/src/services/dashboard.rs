//! Dashboard: stats, accounts and display-only currency conversion

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use super::account::AccountService;
use super::logging::{note, ClientEvent, LogEvent, LoggingService};
use crate::domain::result::{Error, Result};
use crate::domain::{Account, DashboardStats};
use crate::ports::{BankingApi, Credentials, RateSource};

pub const BASE_CURRENCY: &str = "USD";
pub const SUPPORTED_CURRENCIES: [&str; 3] = ["USD", "GBP", "EUR"];

/// Rates used when the rate endpoint cannot be reached
pub fn fallback_rates() -> HashMap<String, Decimal> {
    HashMap::from([
        ("USD".to_string(), Decimal::ONE),
        ("GBP".to_string(), Decimal::new(79, 2)),
        ("EUR".to_string(), Decimal::new(92, 2)),
    ])
}

/// USD-based rates, never authoritative
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    pub rates: HashMap<String, Decimal>,
    /// True when the built-in defaults are in use
    pub fallback: bool,
}

impl ExchangeRates {
    pub fn fallback() -> Self {
        Self {
            rates: fallback_rates(),
            fallback: true,
        }
    }

    /// Convert a USD amount for display
    pub fn convert(&self, amount: Decimal, currency: &str) -> Result<Decimal> {
        let rate = self
            .rates
            .get(&currency.to_uppercase())
            .ok_or_else(|| Error::validation(format!("no exchange rate for '{}'", currency)))?;
        Ok(amount * rate)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub accounts: Vec<Account>,
    pub rates: ExchangeRates,
}

pub struct DashboardService {
    api: Arc<dyn BankingApi>,
    rates: Arc<dyn RateSource>,
    accounts: AccountService,
    logger: Option<Arc<LoggingService>>,
}

impl DashboardService {
    pub fn new(api: Arc<dyn BankingApi>, rates: Arc<dyn RateSource>) -> Self {
        Self {
            accounts: AccountService::new(api.clone()),
            api,
            rates,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.accounts = AccountService::new(self.api.clone()).with_logger(logger.clone());
        self.logger = Some(logger);
        self
    }

    /// Latest rates, or the built-in defaults on any failure
    pub fn rates(&self) -> ExchangeRates {
        match self.rates.latest(BASE_CURRENCY, &SUPPORTED_CURRENCIES) {
            Ok(rates) => ExchangeRates {
                rates,
                fallback: false,
            },
            Err(e) => {
                note(self.logger.as_deref(), LogEvent::new(ClientEvent::RatesUnavailable).failed_with(e));
                ExchangeRates::fallback()
            }
        }
    }

    /// Stats are required; accounts and rates degrade quietly
    pub fn load(&self, credentials: &Credentials) -> Result<Dashboard> {
        let stats = self.api.get_dashboard_stats(credentials)?;
        Ok(Dashboard {
            stats,
            accounts: self.accounts.load(credentials),
            rates: self.rates(),
        })
    }
}
