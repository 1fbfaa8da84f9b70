//! The module contains the error the engine can throw.
//!
//! The errors fall into four families:
//!
//! - validation: [`InvalidAmount`], [`InvalidInput`], [`Spreadsheet`]
//! - not found: [`KeyNotFound`]
//! - conflict: [`ExistingKey`], [`InUse`]
//! - authentication: [`Unauthorized`]
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`Spreadsheet`]: EngineError::Spreadsheet
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InUse`]: EngineError::InUse
//!  [`Unauthorized`]: EngineError::Unauthorized
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Still in use: {0}")]
    InUse(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors caused by bad input shape or value.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::InvalidInput(_) | Self::Spreadsheet(_)
        )
    }

    /// Returns `true` for errors caused by existing references or duplicates.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ExistingKey(_) | Self::InUse(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Spreadsheet(a), Self::Spreadsheet(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<csv::Error> for EngineError {
    fn from(value: csv::Error) -> Self {
        Self::Spreadsheet(value.to_string())
    }
}

impl From<calamine::XlsxError> for EngineError {
    fn from(value: calamine::XlsxError) -> Self {
        Self::Spreadsheet(value.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for EngineError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet(value.to_string())
    }
}
