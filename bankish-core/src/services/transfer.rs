//! Transfer wizard
//!
//! Drives one transfer from form entry to the result screen:
//!
//! ```text
//! Editing ──submit──▶ Processing ──open_code_prompt──▶ AwaitingCode
//!    ▲                                                   │    │
//!    │◀──────────────cancel─────────────────────────────┘    │ confirm (code matches)
//!    │                                                        ▼
//!    │◀──────────── submit failed ─────────────────────── Submitting
//!    │                                                        │
//!    └──────────────start_another──────── Success ◀───────────┘
//! ```
//!
//! The confirmation code is read from the profile once, on mount, and
//! compared byte for byte. A wrong code keeps the prompt open.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::account::AccountService;
use super::fee::FeeEstimator;
use super::logging::{note, ClientEvent, LogEvent, LoggingService};
use crate::domain::result::{Error, Result};
use crate::domain::{Account, Section, TransferDraft, TransferResult, TransferType};
use crate::ports::{BankingApi, Credentials, FeeSource};

pub const INVALID_CODE_MESSAGE: &str = "Invalid code. Please try again.";

const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(2000);

/// Where the wizard is
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum WizardState {
    /// Form is editable; `error` is the last submission failure
    Editing { error: Option<String> },
    /// Simulated processing before the code prompt
    Processing,
    AwaitingCode { entered: String, error: Option<String> },
    /// Request in flight
    Submitting,
    Success(TransferResult),
}

impl WizardState {
    fn name(&self) -> &'static str {
        match self {
            WizardState::Editing { .. } => "editing",
            WizardState::Processing => "processing",
            WizardState::AwaitingCode { .. } => "awaiting code",
            WizardState::Submitting => "submitting",
            WizardState::Success(_) => "success",
        }
    }
}

pub struct TransferWizard {
    api: Arc<dyn BankingApi>,
    account_service: AccountService,
    fees: FeeEstimator,
    logger: Option<Arc<LoggingService>>,
    credentials: Credentials,
    processing_delay: Duration,
    accounts: Vec<Account>,
    expected_code: Option<String>,
    draft: TransferDraft,
    state: WizardState,
    processing_since: Option<Instant>,
}

impl TransferWizard {
    pub fn new(api: Arc<dyn BankingApi>, fee_source: Arc<dyn FeeSource>, credentials: Credentials) -> Self {
        Self {
            account_service: AccountService::new(api.clone()),
            api,
            fees: FeeEstimator::new(fee_source),
            logger: None,
            credentials,
            processing_delay: DEFAULT_PROCESSING_DELAY,
            accounts: Vec::new(),
            expected_code: None,
            draft: TransferDraft::default(),
            state: WizardState::Editing { error: None },
            processing_since: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.account_service = AccountService::new(self.api.clone()).with_logger(logger.clone());
        self.fees = self.fees.with_logger(logger.clone());
        self.logger = Some(logger);
        self
    }

    /// Zero skips the Processing state entirely
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    /// Load accounts and the expected confirmation code
    ///
    /// Neither failure is fatal: no accounts leaves the selectors empty,
    /// no code makes every confirmation attempt fail.
    pub fn mount(&mut self) {
        self.accounts = self.account_service.load(&self.credentials);

        self.expected_code = match self.api.get_profile(&self.credentials) {
            Ok(profile) => profile.awc_code.filter(|c| !c.is_empty()),
            Err(e) => {
                note(self.logger.as_deref(), LogEvent::new(ClientEvent::CodeUnavailable).failed_with(e));
                None
            }
        };

        self.draft = TransferDraft::with_defaults(&self.accounts);
        self.state = WizardState::Editing { error: None };
        self.fees.sync(&self.draft);
        self.log(LogEvent::new(ClientEvent::TransferOpened));
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn draft(&self) -> &TransferDraft {
        &self.draft
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Whether a code was available at mount time
    pub fn has_expected_code(&self) -> bool {
        self.expected_code.is_some()
    }

    /// Destination choices for an internal transfer
    pub fn to_account_candidates(&self) -> Vec<&Account> {
        self.draft.to_account_candidates(&self.accounts)
    }

    pub fn fees(&self) -> &FeeEstimator {
        &self.fees
    }

    /// Current network fee text; picks up finished estimates first
    pub fn fee_display(&mut self) -> String {
        self.fees.poll();
        self.fees.display().to_string()
    }

    /// Block until the running fee estimate settles
    pub fn wait_for_fee(&mut self, timeout: Duration) -> String {
        self.fees.wait(timeout);
        self.fees.display().to_string()
    }

    pub fn set_transfer_type(&mut self, transfer_type: TransferType) -> Result<()> {
        self.require_editing("change the transfer type")?;
        self.draft.set_transfer_type(transfer_type);
        self.fees.sync(&self.draft);
        Ok(())
    }

    pub fn set_field(&mut self, section: Section, field: &str, value: impl Into<String>) -> Result<()> {
        self.require_editing("edit the form")?;
        self.draft.set_field(section, field, value)?;
        self.fees.sync(&self.draft);
        Ok(())
    }

    /// Accept the form and start processing
    pub fn submit(&mut self) -> Result<&WizardState> {
        self.require_editing("submit")?;
        self.draft.check_input_constraints()?;

        if self.draft.transfer_type == TransferType::Crypto {
            self.draft.crypto.network_fee = self.fee_display();
        }

        self.state = WizardState::Processing;
        self.processing_since = Some(Instant::now());
        self.log(LogEvent::new(ClientEvent::TransferStarted).about(self.draft.transfer_type.as_str()));

        if self.processing_delay.is_zero() {
            self.open_code_prompt()?;
        }
        Ok(&self.state)
    }

    /// Finish processing and ask for the code; waits out whatever is left
    /// of the processing delay
    pub fn open_code_prompt(&mut self) -> Result<&WizardState> {
        if self.state != WizardState::Processing {
            return Err(self.wrong_state("open the code prompt"));
        }

        let elapsed = self.processing_since.map(|t| t.elapsed()).unwrap_or_default();
        let remaining = self.processing_delay.saturating_sub(elapsed);
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }

        self.processing_since = None;
        self.state = WizardState::AwaitingCode {
            entered: String::new(),
            error: None,
        };
        Ok(&self.state)
    }

    pub fn enter_code(&mut self, code: &str) -> Result<()> {
        match &mut self.state {
            WizardState::AwaitingCode { entered, .. } => {
                *entered = code.to_string();
                Ok(())
            }
            _ => Err(self.wrong_state("enter a code")),
        }
    }

    /// Check the entered code and, on a match, send the transfer
    pub fn confirm(&mut self) -> Result<&WizardState> {
        let entered = match &self.state {
            WizardState::AwaitingCode { entered, .. } => entered.clone(),
            _ => return Err(self.wrong_state("confirm")),
        };

        let matches = self
            .expected_code
            .as_deref()
            .map(|expected| expected.as_bytes() == entered.as_bytes())
            .unwrap_or(false);

        if !matches {
            self.state = WizardState::AwaitingCode {
                entered: String::new(),
                error: Some(INVALID_CODE_MESSAGE.to_string()),
            };
            self.log(LogEvent::new(ClientEvent::CodeRejected).about(self.draft.transfer_type.as_str()));
            return Ok(&self.state);
        }

        self.state = WizardState::Submitting;
        let transfer_type = self.draft.transfer_type;
        let outcome = self
            .draft
            .request()
            .to_payload()
            .and_then(|payload| self.api.submit_transfer(&self.credentials, &payload));

        match outcome {
            Ok(ack) => {
                // Strictly after the response, exactly once
                self.accounts = self.account_service.load(&self.credentials);
                self.draft = TransferDraft::with_defaults(&self.accounts);
                self.fees.sync(&self.draft);
                self.state = WizardState::Success(TransferResult::succeeded(ack.message));
                self.log(LogEvent::new(ClientEvent::TransferSucceeded).about(transfer_type.as_str()));
            }
            Err(e) => {
                let message = e.to_string();
                self.log(
                    LogEvent::new(ClientEvent::TransferFailed)
                        .about(transfer_type.as_str())
                        .failed_with(&message),
                );
                self.state = WizardState::Editing { error: Some(message) };
            }
        }
        Ok(&self.state)
    }

    /// Close the code prompt; the form keeps its values
    pub fn cancel(&mut self) -> Result<()> {
        match self.state {
            WizardState::AwaitingCode { .. } | WizardState::Processing => {
                self.processing_since = None;
                self.state = WizardState::Editing { error: None };
                Ok(())
            }
            _ => Err(self.wrong_state("cancel")),
        }
    }

    /// Leave the result screen for a fresh form
    pub fn start_another(&mut self) -> Result<()> {
        match self.state {
            WizardState::Success(_) => {
                self.state = WizardState::Editing { error: None };
                Ok(())
            }
            _ => Err(self.wrong_state("start another transfer")),
        }
    }

    /// Throw the draft away and go back to a blank form
    pub fn discard(&mut self) -> Result<()> {
        if self.state == WizardState::Submitting {
            return Err(self.wrong_state("discard the form"));
        }
        self.draft = TransferDraft::with_defaults(&self.accounts);
        self.fees.sync(&self.draft);
        self.processing_since = None;
        self.state = WizardState::Editing { error: None };
        Ok(())
    }

    fn require_editing(&self, action: &str) -> Result<()> {
        match self.state {
            WizardState::Editing { .. } => Ok(()),
            _ => Err(self.wrong_state(action)),
        }
    }

    fn wrong_state(&self, action: &str) -> Error {
        Error::invalid_state(format!("cannot {} while {}", action, self.state.name()))
    }

    fn log(&self, event: LogEvent) {
        note(self.logger.as_deref(), event);
    }
}
