use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod categories;
mod transactions;
mod users;
mod wallets;

pub use categories::DEFAULT_CATEGORIES;
pub use transactions::TransactionListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Store handle.
///
/// Holds no mutable state: share it behind an `Arc` and pass it explicitly.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Turn a missing reference in a write payload into a validation error.
pub(crate) fn as_invalid_reference(err: EngineError, field: &str) -> EngineError {
    match err {
        EngineError::KeyNotFound(_) => {
            EngineError::InvalidInput(format!("{field} does not belong to the user"))
        }
        other => other,
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
