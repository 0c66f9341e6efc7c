//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, not on concrete implementations.

mod banking_api;
mod market_data;
mod session;

pub use banking_api::{Acknowledgement, BankingApi};
pub use market_data::{FeeSource, RateSource};
pub use session::{Credentials, TokenStore, TOKEN_KEY};
