//! Transaction primitives.
//!
//! Stored rows are always `income` or `expense`. A transfer is an input kind
//! only: it is persisted as an expense in the source wallet and an income in
//! the destination wallet, linked by a shared `transfer_id`.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub category_id: Uuid,
    pub wallet_id: Uuid,
    /// Set on the expense leg of a transfer.
    pub destination_wallet_id: Option<Uuid>,
    /// Shared by both legs of a transfer.
    pub transfer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        user_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        description: String,
        occurred_at: DateTime<Utc>,
        category_id: Uuid,
        wallet_id: Uuid,
    ) -> ResultEngine<Self> {
        let amount = amount.ensure_transaction_amount()?;
        if kind == TransactionKind::Transfer {
            return Err(EngineError::InvalidInput(
                "transfers are stored as an expense/income pair".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            amount,
            description,
            occurred_at,
            category_id,
            wallet_id,
            destination_wallet_id: None,
            transfer_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns `true` when the row is one leg of a transfer.
    pub fn is_transfer_leg(&self) -> bool {
        self.transfer_id.is_some()
    }

    /// Signed effect of this row on its wallet's balance.
    pub fn signed_amount(&self) -> MoneyCents {
        match self.kind {
            TransactionKind::Income => self.amount,
            _ => -self.amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub amount_minor: i64,
    pub description: String,
    pub occurred_at: DateTimeUtc,
    pub category_id: Uuid,
    pub wallet_id: Uuid,
    pub destination_wallet_id: Option<Uuid>,
    pub transfer_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id"
    )]
    Wallet,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::Set(tx.user_id),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            description: ActiveValue::Set(tx.description.clone()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            category_id: ActiveValue::Set(tx.category_id),
            wallet_id: ActiveValue::Set(tx.wallet_id),
            destination_wallet_id: ActiveValue::Set(tx.destination_wallet_id),
            transfer_id: ActiveValue::Set(tx.transfer_id),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            description: model.description,
            occurred_at: model.occurred_at,
            category_id: model.category_id,
            wallet_id: model.wallet_id,
            destination_wallet_id: model.destination_wallet_id,
            transfer_id: model.transfer_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_is_case_insensitive() {
        assert_eq!(
            TransactionKind::try_from(" Income ").unwrap(),
            TransactionKind::Income
        );
        assert_eq!(
            "TRANSFER".parse::<TransactionKind>().unwrap(),
            TransactionKind::Transfer
        );
        assert!(TransactionKind::try_from("refund").is_err());
    }

    #[test]
    fn new_rejects_non_positive_amounts() {
        let err = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Expense,
            MoneyCents::ZERO,
            "coffee".to_string(),
            Utc::now(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn signed_amount_follows_kind() {
        let mut tx = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Income,
            MoneyCents::new(500),
            "salary".to_string(),
            Utc::now(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        )
        .unwrap();
        assert_eq!(tx.signed_amount(), MoneyCents::new(500));
        tx.kind = TransactionKind::Expense;
        assert_eq!(tx.signed_amount(), MoneyCents::new(-500));
    }
}
