//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create/update of
//! transactions and categories), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{CategoryIcon, MoneyCents, TransactionKind};

/// Create a transaction.
///
/// For [`TransactionKind::Transfer`] a `destination_wallet_id` is required and
/// two rows are persisted.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub category_id: Uuid,
    pub wallet_id: Uuid,
    pub destination_wallet_id: Option<Uuid>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        description: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            kind,
            amount,
            description: description.into(),
            occurred_at,
            category_id: Uuid::nil(),
            wallet_id: Uuid::nil(),
            destination_wallet_id: None,
        }
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = category_id;
        self
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = wallet_id;
        self
    }

    #[must_use]
    pub fn destination_wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.destination_wallet_id = Some(wallet_id);
        self
    }
}

/// Update an existing transaction.
///
/// Every field is optional; `None` leaves the stored value untouched.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: Uuid,
    pub transaction_id: Uuid,

    pub kind: Option<TransactionKind>,
    pub amount: Option<MoneyCents>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub wallet_id: Option<Uuid>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: Uuid, transaction_id: Uuid) -> Self {
        Self {
            user_id,
            transaction_id,
            kind: None,
            amount: None,
            description: None,
            occurred_at: None,
            category_id: None,
            wallet_id: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    /// Returns `true` when the patch touches only fields a transfer leg may
    /// change (description and category).
    pub(crate) fn is_label_only(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.occurred_at.is_none()
            && self.wallet_id.is_none()
    }
}

/// Create a category.
#[derive(Clone, Debug)]
pub struct NewCategoryCmd {
    pub user_id: Uuid,
    pub name: String,
    pub icon: CategoryIcon,
}

impl NewCategoryCmd {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            icon: CategoryIcon::Other,
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: CategoryIcon) -> Self {
        self.icon = icon;
        self
    }
}

/// Update a category's name and/or icon.
#[derive(Clone, Debug)]
pub struct UpdateCategoryCmd {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub name: Option<String>,
    pub icon: Option<CategoryIcon>,
}

impl UpdateCategoryCmd {
    #[must_use]
    pub fn new(user_id: Uuid, category_id: Uuid) -> Self {
        Self {
            user_id,
            category_id,
            name: None,
            icon: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: CategoryIcon) -> Self {
        self.icon = Some(icon);
        self
    }
}
