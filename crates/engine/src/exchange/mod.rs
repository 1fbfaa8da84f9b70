//! Spreadsheet export and import of transactions.
//!
//! Both directions go through the public engine operations, so ownership
//! checks and transfer expansion apply to imported rows exactly as they do to
//! rows created over the API.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod export;
mod import;
mod sheet;

/// Name of the single sheet written on export.
pub const SHEET_NAME: &str = "Transactions";

/// Column order of exported files. Import looks columns up by name, so extra
/// or reordered columns are fine.
pub const EXPORT_COLUMNS: [&str; 11] = [
    "ID",
    "Date",
    "Type",
    "Amount",
    "Description",
    "Category",
    "Wallet",
    "DestinationWalletId",
    "DestinationWallet",
    "CreatedAt",
    "UpdatedAt",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    #[default]
    Xlsx,
    Csv,
}

impl SheetFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// Pick the format from an uploaded file name. Only `.csv` and `.xlsx`
    /// are accepted, in any letter case.
    pub fn from_file_name(name: &str) -> ResultEngine<Self> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .unwrap_or_default();
        extension.parse().map_err(|_| {
            EngineError::InvalidInput(
                "unsupported file type, please upload a .csv or .xlsx file".to_string(),
            )
        })
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    /// Download file name for exports.
    pub fn file_name(self) -> String {
        format!("transactions.{}", self.as_str())
    }
}

impl fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(EngineError::InvalidInput(format!(
                "unsupported spreadsheet format: {other}"
            ))),
        }
    }
}

/// Which transactions to export.
///
/// A month only narrows the range when a year is given too.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub wallet_id: Option<Uuid>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl ExportFilter {
    /// `[from, to)` bounds in UTC.
    pub(crate) fn range(&self) -> ResultEngine<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        if let Some(month) = self.month
            && !(1..=12).contains(&month)
        {
            return Err(EngineError::InvalidInput(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        let Some(year) = self.year else {
            return Ok((None, None));
        };
        let (start, end) = match self.month {
            Some(12) => (month_start(year, 12)?, month_start(year + 1, 1)?),
            Some(month) => (month_start(year, month)?, month_start(year, month + 1)?),
            None => (month_start(year, 1)?, month_start(year + 1, 1)?),
        };
        Ok((Some(start), Some(end)))
    }
}

fn month_start(year: i32, month: u32) -> ResultEngine<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid year: {year}")))
}

/// Outcome of an import. Failing rows are listed in `errors` as
/// `"Row N: reason"` and never abort the other rows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub success: bool,
    pub imported: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            imported: 0,
            errors: vec![reason.into()],
        }
    }
}
