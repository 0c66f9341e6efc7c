//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on one view or flow of the banking client.

mod account;
mod admin;
pub mod billpay;
mod cards;
mod dashboard;
pub mod fee;
pub mod logging;
mod session;
pub mod transactions;
pub mod transfer;

pub use account::{AccountRow, AccountService, AccountsView};
pub use admin::AdminService;
pub use billpay::{BillPayBook, BillPayment, Payee, PayeeCategory, ScheduledPayment};
pub use cards::{CardService, CardView};
pub use dashboard::{fallback_rates, Dashboard, DashboardService, ExchangeRates};
pub use fee::{FeeEstimator, FeeStatus};
pub use logging::{ClientEvent, EntryPoint, LogEntry, LogEvent, LogQuery, LogStats, LoggingService};
pub use session::SessionService;
pub use transactions::{paginate, KindFilter, Page, TransactionFilter, TransactionService};
pub use transfer::{TransferWizard, WizardState, INVALID_CODE_MESSAGE};
