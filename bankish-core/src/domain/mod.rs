//! Core domain entities
//!
//! Pure data structures mirroring the backend's JSON, plus display helpers
//! and validation. No I/O.

mod account;
mod card;
pub mod money;
pub mod result;
mod transaction;
pub mod transfer;
mod user;

pub use account::{Account, AccountStatus, AccountType};
pub use card::{Card, CardStatus, CardType};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
pub use transfer::{
    CryptoCurrency, Section, TransferDraft, TransferRequest, TransferResult, TransferType,
};
pub use user::{AdminUser, DashboardStats, ManualTransaction, Role, UserProfile};
