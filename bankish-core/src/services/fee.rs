//! Network fee estimator for the crypto transfer form
//!
//! Each change of (currency, amount) starts one background estimate. Only
//! the answer to the latest request is kept; answers to superseded
//! requests are dropped by generation number, so the form never shows a
//! fee computed for inputs it no longer has.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::logging::{note, ClientEvent, LogEvent, LoggingService};
use crate::domain::result::{Error, Result};
use crate::domain::{CryptoCurrency, TransferDraft, TransferType};
use crate::ports::FeeSource;

pub const FETCHING_TEXT: &str = "Fetching...";
pub const ERROR_TEXT: &str = "Error";

/// Where the current estimate stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeStatus {
    /// Nothing to estimate (not crypto, or no amount)
    Idle,
    Fetching,
    Ready(String),
    Failed,
}

impl FeeStatus {
    /// Text for the read-only network fee field; empty when idle
    pub fn display(&self) -> &str {
        match self {
            FeeStatus::Idle => "",
            FeeStatus::Fetching => FETCHING_TEXT,
            FeeStatus::Ready(fee) => fee,
            FeeStatus::Failed => ERROR_TEXT,
        }
    }
}

type Answer = (u64, Result<String>);

pub struct FeeEstimator {
    source: Arc<dyn FeeSource>,
    logger: Option<Arc<LoggingService>>,
    status: FeeStatus,
    inputs: Option<(CryptoCurrency, String)>,
    generation: u64,
    tx: Sender<Answer>,
    rx: Receiver<Answer>,
}

impl FeeEstimator {
    pub fn new(source: Arc<dyn FeeSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            logger: None,
            status: FeeStatus::Idle,
            inputs: None,
            generation: 0,
            tx,
            rx,
        }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn status(&self) -> &FeeStatus {
        &self.status
    }

    pub fn display(&self) -> &str {
        self.status.display()
    }

    /// React to the current form inputs
    pub fn sync(&mut self, draft: &TransferDraft) {
        self.request(draft.transfer_type, draft.crypto.currency, &draft.crypto.amount);
    }

    /// Start an estimate if the inputs changed since the last one
    pub fn request(&mut self, transfer_type: TransferType, currency: CryptoCurrency, amount: &str) {
        if transfer_type != TransferType::Crypto || amount.trim().is_empty() {
            if self.inputs.is_some() {
                // Invalidate anything still in flight
                self.generation += 1;
                self.inputs = None;
            }
            self.status = FeeStatus::Idle;
            return;
        }

        let inputs = (currency, amount.to_string());
        if self.inputs.as_ref() == Some(&inputs) {
            return;
        }

        self.generation += 1;
        self.inputs = Some(inputs);
        self.status = FeeStatus::Fetching;

        let generation = self.generation;
        let source = self.source.clone();
        let tx = self.tx.clone();
        let amount = amount.to_string();
        thread::spawn(move || {
            // A panicking source still has to settle the status
            let answer = panic::catch_unwind(AssertUnwindSafe(|| source.estimate(currency, &amount)))
                .unwrap_or_else(|_| Err(Error::http("fee estimate aborted")));
            // The estimator may be gone by now
            let _ = tx.send((generation, answer));
        });
    }

    /// Apply any answers that arrived, without blocking
    pub fn poll(&mut self) -> &FeeStatus {
        while let Ok(answer) = self.rx.try_recv() {
            self.apply(answer);
        }
        &self.status
    }

    /// Block until the current estimate settles or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> &FeeStatus {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.status == FeeStatus::Fetching {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.rx.recv_timeout(remaining) {
                Ok(answer) => self.apply(answer),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        &self.status
    }

    fn apply(&mut self, (generation, answer): Answer) {
        if generation != self.generation || self.status != FeeStatus::Fetching {
            return;
        }
        self.status = match answer {
            Ok(fee) => FeeStatus::Ready(fee),
            Err(e) => {
                note(
                    self.logger.as_deref(),
                    LogEvent::new(ClientEvent::FeeUnavailable).about(self.source.name()).failed_with(e),
                );
                FeeStatus::Failed
            }
        };
    }
}
