//! CLI command implementations

pub mod accounts;
pub mod admin;
pub mod billpay;
pub mod cards;
pub mod dashboard;
pub mod logs;
pub mod session;
pub mod transactions;
pub mod transfer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bankish_core::services::{ClientEvent, EntryPoint, LogEvent, LoggingService};
use bankish_core::BankishContext;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<Arc<LoggingService>> {
    let bankish_dir = get_bankish_dir();
    std::fs::create_dir_all(&bankish_dir).ok()?;
    LoggingService::new(&bankish_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
        .ok()
        .map(Arc::new)
}

/// Record an event; a broken log never fails the command
fn log_event(logger: &Option<Arc<LoggingService>>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the bankish directory from environment or default
pub fn get_bankish_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BANKISH_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bankish")
    }
}

/// Build a context and record which command is running
pub fn get_context(command: &str) -> Result<BankishContext> {
    let bankish_dir = get_bankish_dir();

    std::fs::create_dir_all(&bankish_dir)
        .with_context(|| format!("Failed to create bankish directory: {:?}", bankish_dir))?;

    let ctx = BankishContext::new(&bankish_dir, get_logger())
        .context("Failed to initialize bankish context")?;
    log_event(&ctx.logger, LogEvent::new(ClientEvent::CommandRun).about(command));
    Ok(ctx)
}

/// Whether prompts can be shown
pub fn interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}
