//! Third-party, unauthenticated market data ports
//!
//! Used for display only: crypto network fee estimates and fiat exchange
//! rates. Nothing returned here is authoritative for settlement.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::CryptoCurrency;

/// Network fee estimate for a crypto transfer
pub trait FeeSource: Send + Sync {
    /// Source name (e.g., "live", "placeholder")
    fn name(&self) -> &str;

    /// Display string such as `0.000140 BTC`
    fn estimate(&self, currency: CryptoCurrency, amount: &str) -> Result<String>;
}

/// Fiat exchange rates relative to a base currency
pub trait RateSource: Send + Sync {
    /// Rates keyed by ISO 4217 code; the base maps to 1
    fn latest(&self, base: &str, symbols: &[&str]) -> Result<HashMap<String, Decimal>>;
}
