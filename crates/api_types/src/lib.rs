//! JSON bodies of the HTTP API.
//!
//! Field names are camelCase on the wire. Amounts travel as decimal strings
//! (`"12.50"`) and instants as RFC 3339 strings.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
    }
}

pub mod wallet {
    use super::*;

    /// Body of both create and rename.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletName {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletView {
        pub id: Uuid,
        pub name: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletList {
        pub wallets: Vec<WalletView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletSummaryView {
        pub id: Uuid,
        pub name: String,
        pub income: String,
        pub expenses: String,
        pub balance: String,
        pub transaction_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletSummaryList {
        pub wallets: Vec<WalletSummaryView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        /// Icon key; unknown values fall back to `other`.
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub icon: String,
        pub emoji: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryList {
        pub categories: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SuggestRequest {
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Suggestion {
        pub category_id: Uuid,
        pub name: String,
        pub confidence: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SuggestResponse {
        pub suggestion: Option<Suggestion>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum TransactionType {
        Income,
        Expense,
        Transfer,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionList {
        pub wallet_id: Option<Uuid>,
        /// RFC3339 timestamp (inclusive).
        pub from: Option<DateTime<FixedOffset>>,
        /// RFC3339 timestamp (exclusive).
        pub to: Option<DateTime<FixedOffset>>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub amount: String,
        pub description: String,
        pub date: DateTime<Utc>,
        pub category_id: Uuid,
        pub wallet_id: Uuid,
        pub destination_wallet_id: Option<Uuid>,
        pub transfer_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }

    /// Rows persisted by a create: one, or both legs of a transfer.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        #[serde(rename = "type")]
        pub kind: TransactionType,
        /// Positive decimal, at most two fractional digits.
        pub amount: String,
        #[serde(default)]
        pub description: String,
        /// RFC3339 timestamp, including timezone offset.
        pub date: DateTime<FixedOffset>,
        pub category_id: Uuid,
        pub wallet_id: Uuid,
        /// Required for transfers.
        pub destination_wallet_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpdate {
        #[serde(rename = "type")]
        pub kind: Option<TransactionType>,
        pub amount: Option<String>,
        pub description: Option<String>,
        pub date: Option<DateTime<FixedOffset>>,
        pub category_id: Option<Uuid>,
        pub wallet_id: Option<Uuid>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardQuery {
        /// Wallet id or `all`.
        pub wallet_id: Option<String>,
        /// 1-12 or `all`.
        pub month: Option<String>,
        /// Defaults to the current year.
        pub year: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryTotalView {
        pub category_id: Uuid,
        pub name: String,
        pub icon: String,
        pub total: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MonthlyTotalView {
        pub month: u32,
        pub income: String,
        pub expenses: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardView {
        pub total_income: String,
        pub total_expenses: String,
        pub balance: String,
        pub category_expenses: Vec<CategoryTotalView>,
        pub monthly: Vec<MonthlyTotalView>,
        pub recent: Vec<super::transaction::TransactionView>,
        pub years: Vec<i32>,
    }
}

pub mod exchange {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExportQuery {
        /// Wallet id or `all`.
        pub wallet_id: Option<String>,
        /// 1-12 or `all`; only honoured together with `year`.
        pub month: Option<String>,
        /// Year or `all`.
        pub year: Option<String>,
        /// `xlsx` (default) or `csv`.
        pub format: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportReport {
        pub success: bool,
        pub imported: usize,
        pub errors: Vec<String>,
    }
}
