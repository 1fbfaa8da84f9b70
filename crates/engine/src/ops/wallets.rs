use std::collections::HashMap;

use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, Transaction, TransactionKind, Wallet, WalletSummary,
    transactions,
    util::{normalize_required_name, wallet_key},
    wallets,
};

use super::{Engine, with_tx};

impl Engine {
    /// Load a wallet owned by `user_id`; other users' wallets behave as absent.
    pub(super) async fn require_wallet<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        wallet_id: Uuid,
    ) -> ResultEngine<wallets::Model> {
        wallets::Entity::find_by_id(wallet_id)
            .filter(wallets::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))
    }

    /// Wallets of a user, ordered by name.
    pub async fn list_wallets(&self, user_id: Uuid) -> ResultEngine<Vec<Wallet>> {
        let models = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .order_by_asc(wallets::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Wallet::from).collect())
    }

    pub async fn wallet(&self, user_id: Uuid, wallet_id: Uuid) -> ResultEngine<Wallet> {
        let model = Self::require_wallet(&self.database, user_id, wallet_id).await?;
        Ok(Wallet::from(model))
    }

    /// Per-wallet income, expenses, balance and transaction count.
    ///
    /// Both legs of a transfer count toward their own wallet.
    pub async fn wallet_summaries(&self, user_id: Uuid) -> ResultEngine<Vec<WalletSummary>> {
        let wallets = self.list_wallets(user_id).await?;
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?;

        let mut totals: HashMap<Uuid, (MoneyCents, MoneyCents, u64)> = HashMap::new();
        for row in rows {
            let tx = Transaction::try_from(row)?;
            let entry = totals
                .entry(tx.wallet_id)
                .or_insert((MoneyCents::ZERO, MoneyCents::ZERO, 0));
            match tx.kind {
                TransactionKind::Income => entry.0.accumulate(tx.amount)?,
                _ => entry.1.accumulate(tx.amount)?,
            }
            entry.2 += 1;
        }

        wallets
            .into_iter()
            .map(|wallet| {
                let (income, expenses, count) = totals
                    .get(&wallet.id)
                    .copied()
                    .unwrap_or((MoneyCents::ZERO, MoneyCents::ZERO, 0));
                Ok(WalletSummary {
                    wallet,
                    income,
                    expenses,
                    balance: income.try_sub(expenses)?,
                    transaction_count: count,
                })
            })
            .collect()
    }

    /// Add a new wallet. Names are unique per user, ignoring case.
    pub async fn create_wallet(&self, user_id: Uuid, name: &str) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet")?;
        with_tx!(self, |db_tx| {
            let exists = wallets::Entity::find()
                .filter(wallets::Column::UserId.eq(user_id))
                .filter(wallets::Column::NameNorm.eq(wallet_key(&name)))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let wallet = Wallet::new(user_id, name);
            let model: wallets::ActiveModel = (&wallet).into();
            model.insert(&db_tx).await?;
            Ok(wallet)
        })
    }

    /// Renames an existing wallet.
    pub async fn rename_wallet(
        &self,
        user_id: Uuid,
        wallet_id: Uuid,
        new_name: &str,
    ) -> ResultEngine<Wallet> {
        let new_name = normalize_required_name(new_name, "wallet")?;
        with_tx!(self, |db_tx| {
            Self::require_wallet(&db_tx, user_id, wallet_id).await?;

            let exists = wallets::Entity::find()
                .filter(wallets::Column::UserId.eq(user_id))
                .filter(wallets::Column::NameNorm.eq(wallet_key(&new_name)))
                .filter(wallets::Column::Id.ne(wallet_id))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(new_name));
            }

            let active = wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id),
                name_norm: ActiveValue::Set(wallet_key(&new_name)),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Ok(Wallet::from(model))
        })
    }

    /// Delete a wallet.
    ///
    /// Refused with [`EngineError::InUse`] while any transaction references
    /// the wallet, either as source or as transfer destination.
    pub async fn delete_wallet(&self, user_id: Uuid, wallet_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let wallet = Self::require_wallet(&db_tx, user_id, wallet_id).await?;

            let referenced = transactions::Entity::find()
                .filter(
                    Condition::any()
                        .add(transactions::Column::WalletId.eq(wallet_id))
                        .add(transactions::Column::DestinationWalletId.eq(wallet_id)),
                )
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::InUse(format!(
                    "wallet \"{}\" has {referenced} transactions",
                    wallet.name
                )));
            }

            wallets::Entity::delete_by_id(wallet_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
