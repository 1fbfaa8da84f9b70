//! Data-access layer of the finance tracker.
//!
//! [`Engine`] wraps a database connection and exposes every operation on
//! users, wallets, categories and transactions. All reads and writes are
//! scoped to the requesting user: ids owned by someone else behave as absent.

pub use categories::Category;
pub use commands::{NewCategoryCmd, NewTransactionCmd, UpdateCategoryCmd, UpdateTransactionCmd};
pub use dashboard::{CategoryTotal, Dashboard, DashboardFilter, MonthlyTotal, RECENT_LIMIT};
pub use error::EngineError;
pub use exchange::{EXPORT_COLUMNS, ExportFilter, ImportReport, SHEET_NAME, SheetFormat};
pub use icons::CategoryIcon;
pub use money::MoneyCents;
pub use ops::{DEFAULT_CATEGORIES, Engine, EngineBuilder, TransactionListFilter};
pub use password::{MIN_PASSWORD_LEN, hash_password, verify_password};
pub use suggest::{CategorySuggester, CategorySuggestion, KeywordSuggester};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;
pub use wallets::{Wallet, WalletSummary};

mod categories;
mod commands;
pub mod dashboard;
mod error;
mod exchange;
mod icons;
mod money;
mod ops;
mod password;
mod suggest;
mod transactions;
mod users;
mod util;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
