//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the BankingApi port
//! - Public chain endpoints (or a random placeholder) for FeeSource
//! - exchangerate.host-compatible client for RateSource
//! - JSON file in the Bankish directory for TokenStore

pub mod fees;
pub mod http_api;
pub mod rates;
pub mod token_file;

#[cfg(test)]
pub mod mock_backend;
