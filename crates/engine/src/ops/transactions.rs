use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewTransactionCmd, ResultEngine, Transaction, TransactionKind,
    UpdateTransactionCmd, transactions, util::normalize_optional_text,
};

use super::{Engine, as_invalid_reference, with_tx};

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    /// Matches the row's own wallet (transfer legs appear in their wallet).
    pub wallet_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u64>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidInput(
            "invalid range: from must be < to".to_string(),
        ));
    }
    if filter.limit == Some(0) {
        return Err(EngineError::InvalidInput(
            "limit must be > 0".to_string(),
        ));
    }
    Ok(())
}

fn required_description(value: &str) -> ResultEngine<String> {
    normalize_optional_text(Some(value)).ok_or_else(|| {
        EngineError::InvalidInput("description must not be empty".to_string())
    })
}

fn transfer_description(prefix: &str, wallet_name: &str, note: Option<&str>) -> String {
    match note {
        Some(note) => format!("{prefix} {wallet_name}: {note}"),
        None => format!("{prefix} {wallet_name}"),
    }
}

impl Engine {
    /// Transactions of a user, newest first.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id));
        if let Some(wallet_id) = filter.wallet_id {
            query = query.filter(transactions::Column::WalletId.eq(wallet_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::OccurredAt.lt(to));
        }
        query = query
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::CreatedAt);
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    pub async fn transaction(&self, user_id: Uuid, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }

    /// Record a transaction and return the persisted rows.
    ///
    /// Income and expense produce one row. A transfer produces two rows in a
    /// single DB transaction, sharing a fresh `transfer_id`:
    /// - an expense in the source wallet, `"Transfer to <destination>"`
    /// - an income in the destination wallet, `"Transfer from <source>"`
    ///
    /// A description given with a transfer is appended after `": "`.
    pub async fn create_transaction(
        &self,
        cmd: NewTransactionCmd,
    ) -> ResultEngine<Vec<Transaction>> {
        cmd.amount.ensure_transaction_amount()?;
        let note = normalize_optional_text(Some(&cmd.description));
        if cmd.kind != TransactionKind::Transfer {
            if note.is_none() {
                return Err(EngineError::InvalidInput(
                    "description must not be empty".to_string(),
                ));
            }
            if cmd.destination_wallet_id.is_some() {
                return Err(EngineError::InvalidInput(
                    "destination wallet is only valid for transfers".to_string(),
                ));
            }
        }

        with_tx!(self, |db_tx| {
            let source = Self::require_wallet(&db_tx, cmd.user_id, cmd.wallet_id)
                .await
                .map_err(|err| as_invalid_reference(err, "wallet"))?;
            Self::require_category(&db_tx, cmd.user_id, cmd.category_id)
                .await
                .map_err(|err| as_invalid_reference(err, "category"))?;

            let rows = match cmd.kind {
                TransactionKind::Income | TransactionKind::Expense => {
                    vec![Transaction::new(
                        cmd.user_id,
                        cmd.kind,
                        cmd.amount,
                        note.unwrap_or_default(),
                        cmd.occurred_at,
                        cmd.category_id,
                        cmd.wallet_id,
                    )?]
                }
                TransactionKind::Transfer => {
                    let destination_id = cmd.destination_wallet_id.ok_or_else(|| {
                        EngineError::InvalidInput(
                            "destination wallet is required for transfers".to_string(),
                        )
                    })?;
                    if destination_id == cmd.wallet_id {
                        return Err(EngineError::InvalidInput(
                            "source and destination wallets must differ".to_string(),
                        ));
                    }
                    let destination =
                        Self::require_wallet(&db_tx, cmd.user_id, destination_id)
                            .await
                            .map_err(|err| as_invalid_reference(err, "destination wallet"))?;

                    let transfer_id = Uuid::new_v4();
                    let mut outgoing = Transaction::new(
                        cmd.user_id,
                        TransactionKind::Expense,
                        cmd.amount,
                        transfer_description("Transfer to", &destination.name, note.as_deref()),
                        cmd.occurred_at,
                        cmd.category_id,
                        source.id,
                    )?;
                    outgoing.destination_wallet_id = Some(destination.id);
                    outgoing.transfer_id = Some(transfer_id);

                    let mut incoming = Transaction::new(
                        cmd.user_id,
                        TransactionKind::Income,
                        cmd.amount,
                        transfer_description("Transfer from", &source.name, note.as_deref()),
                        cmd.occurred_at,
                        cmd.category_id,
                        destination.id,
                    )?;
                    incoming.transfer_id = Some(transfer_id);

                    vec![outgoing, incoming]
                }
            };

            for row in &rows {
                transactions::ActiveModel::from(row).insert(&db_tx).await?;
            }
            Ok(rows)
        })
    }

    /// Patch a stored transaction.
    ///
    /// Transfer legs accept only description and category changes; the type
    /// can switch between income and expense but never become a transfer.
    pub async fn update_transaction(
        &self,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        if cmd.kind == Some(TransactionKind::Transfer) {
            return Err(EngineError::InvalidInput(
                "type can only be changed to income or expense".to_string(),
            ));
        }
        if let Some(amount) = cmd.amount {
            amount.ensure_transaction_amount()?;
        }
        let description = cmd
            .description
            .as_deref()
            .map(required_description)
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(cmd.transaction_id)
                .filter(transactions::Column::UserId.eq(cmd.user_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            let mut tx = Transaction::try_from(model)?;

            if tx.is_transfer_leg() && !cmd.is_label_only() {
                return Err(EngineError::InvalidInput(
                    "transfer legs only accept description and category changes".to_string(),
                ));
            }

            if let Some(category_id) = cmd.category_id {
                Self::require_category(&db_tx, cmd.user_id, category_id)
                    .await
                    .map_err(|err| as_invalid_reference(err, "category"))?;
                tx.category_id = category_id;
            }
            if let Some(wallet_id) = cmd.wallet_id {
                Self::require_wallet(&db_tx, cmd.user_id, wallet_id)
                    .await
                    .map_err(|err| as_invalid_reference(err, "wallet"))?;
                tx.wallet_id = wallet_id;
            }
            if let Some(kind) = cmd.kind {
                tx.kind = kind;
            }
            if let Some(amount) = cmd.amount {
                tx.amount = amount;
            }
            if let Some(description) = description {
                tx.description = description;
            }
            if let Some(occurred_at) = cmd.occurred_at {
                tx.occurred_at = occurred_at;
            }
            tx.updated_at = Utc::now();

            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Delete a transaction. Deleting either leg of a transfer removes both.
    ///
    /// Returns the ids of the removed rows.
    pub async fn delete_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id)
                .filter(transactions::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

            let removed = match model.transfer_id {
                Some(transfer_id) => {
                    let legs: Vec<Uuid> = transactions::Entity::find()
                        .filter(transactions::Column::UserId.eq(user_id))
                        .filter(transactions::Column::TransferId.eq(transfer_id))
                        .all(&db_tx)
                        .await?
                        .into_iter()
                        .map(|leg| leg.id)
                        .collect();
                    transactions::Entity::delete_many()
                        .filter(transactions::Column::Id.is_in(legs.clone()))
                        .exec(&db_tx)
                        .await?;
                    legs
                }
                None => {
                    transactions::Entity::delete_by_id(transaction_id)
                        .exec(&db_tx)
                        .await?;
                    vec![transaction_id]
                }
            };
            Ok(removed)
        })
    }
}
