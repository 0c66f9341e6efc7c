//! Bankish Core - client-side logic for the Bankish retail banking API
//!
//! This crate follows a hexagonal architecture:
//!
//! - **domain**: Core entities (Account, Transaction, TransferDraft, etc.)
//! - **ports**: Traits for external collaborators (BankingApi, FeeSource, TokenStore)
//! - **services**: Orchestration (transfer wizard, dashboard, admin console, ...)
//! - **adapters**: Concrete implementations (reqwest client, fee endpoints, files)

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::fees::{LiveFeeSource, PlaceholderFeeSource};
use adapters::http_api::BankishClient;
use adapters::rates::ExchangeRateClient;
use adapters::token_file::FileTokenStore;
use config::{Config, FeePolicy};
use ports::{BankingApi, FeeSource, RateSource, TokenStore};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    Account, AdminUser, Card, CryptoCurrency, DashboardStats, Section, Transaction, TransferDraft,
    TransferRequest, TransferResult, TransferType, UserProfile,
};
pub use ports::Credentials;

/// Main context for Bankish operations
///
/// Holds configuration, the adapters chosen by it, and one instance of
/// each service. Credentials are not held here; every call takes them.
pub struct BankishContext {
    pub config: Config,
    pub bankish_dir: PathBuf,
    pub api: Arc<dyn BankingApi>,
    pub token_store: Arc<dyn TokenStore>,
    pub fee_source: Arc<dyn FeeSource>,
    pub rate_source: Arc<dyn RateSource>,
    pub logger: Option<Arc<LoggingService>>,
    pub session_service: SessionService,
    pub account_service: AccountService,
    pub transaction_service: TransactionService,
    pub card_service: CardService,
    pub dashboard_service: DashboardService,
    pub admin_service: AdminService,
}

impl BankishContext {
    /// Create a context for the given Bankish directory
    pub fn new(bankish_dir: &Path, logger: Option<Arc<LoggingService>>) -> Result<Self> {
        let config = Config::load(bankish_dir).context("Failed to load settings")?;

        let api: Arc<dyn BankingApi> = Arc::new(BankishClient::new(&config.api_base_url)?);
        let token_store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(bankish_dir));
        let fee_source: Arc<dyn FeeSource> = match config.fee_policy {
            FeePolicy::Live => Arc::new(LiveFeeSource::new(config.fee_endpoints.clone())?),
            FeePolicy::Placeholder => Arc::new(PlaceholderFeeSource::new()),
        };
        let rate_source: Arc<dyn RateSource> = Arc::new(ExchangeRateClient::new(&config.rates_url)?);

        Ok(Self::from_parts(
            config,
            bankish_dir,
            api,
            token_store,
            fee_source,
            rate_source,
            logger,
        ))
    }

    /// Assemble a context from ready-made adapters
    pub fn from_parts(
        config: Config,
        bankish_dir: &Path,
        api: Arc<dyn BankingApi>,
        token_store: Arc<dyn TokenStore>,
        fee_source: Arc<dyn FeeSource>,
        rate_source: Arc<dyn RateSource>,
        logger: Option<Arc<LoggingService>>,
    ) -> Self {
        let mut session_service = SessionService::new(api.clone(), token_store.clone());
        let mut account_service = AccountService::new(api.clone());
        let mut dashboard_service = DashboardService::new(api.clone(), rate_source.clone());
        let mut admin_service = AdminService::new(api.clone());
        if let Some(logger) = &logger {
            session_service = session_service.with_logger(logger.clone());
            account_service = account_service.with_logger(logger.clone());
            dashboard_service = dashboard_service.with_logger(logger.clone());
            admin_service = admin_service.with_logger(logger.clone());
        }

        Self {
            transaction_service: TransactionService::new(api.clone()),
            card_service: CardService::new(api.clone()),
            config,
            bankish_dir: bankish_dir.to_path_buf(),
            api,
            token_store,
            fee_source,
            rate_source,
            logger,
            session_service,
            account_service,
            dashboard_service,
            admin_service,
        }
    }

    /// Credentials from the stored session
    pub fn credentials(&self) -> Result<Credentials> {
        Ok(self.session_service.credentials()?)
    }

    /// A transfer wizard, mounted and ready for input
    pub fn transfer_wizard(&self, credentials: Credentials) -> TransferWizard {
        let mut wizard = TransferWizard::new(self.api.clone(), self.fee_source.clone(), credentials)
            .with_processing_delay(self.config.processing_delay);
        if let Some(logger) = &self.logger {
            wizard = wizard.with_logger(logger.clone());
        }
        wizard.mount();
        wizard
    }

    pub fn bill_pay(&self) -> Result<BillPayBook> {
        BillPayBook::open(&self.bankish_dir).context("Failed to open payee list")
    }
}
