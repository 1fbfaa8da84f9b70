//! Transactions API endpoints

use api_types::transaction::{
    TransactionCreated, TransactionList, TransactionListResponse, TransactionNew,
    TransactionType, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    MoneyCents, NewTransactionCmd, Transaction, TransactionKind, TransactionListFilter,
    UpdateTransactionCmd, User,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: TransactionKind) -> TransactionType {
    match kind {
        TransactionKind::Income => TransactionType::Income,
        TransactionKind::Expense => TransactionType::Expense,
        TransactionKind::Transfer => TransactionType::Transfer,
    }
}

fn map_type(kind: TransactionType) -> TransactionKind {
    match kind {
        TransactionType::Income => TransactionKind::Income,
        TransactionType::Expense => TransactionKind::Expense,
        TransactionType::Transfer => TransactionKind::Transfer,
    }
}

pub(crate) fn transaction_view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        amount: tx.amount.to_string(),
        description: tx.description,
        date: tx.occurred_at,
        category_id: tx.category_id,
        wallet_id: tx.wallet_id,
        destination_wallet_id: tx.destination_wallet_id,
        transfer_id: tx.transfer_id,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = TransactionListFilter {
        wallet_id: query.wallet_id,
        from: query.from.map(|dt| dt.with_timezone(&Utc)),
        to: query.to.map(|dt| dt.with_timezone(&Utc)),
        limit: query.limit,
    };
    let transactions = state.engine.list_transactions(user.id, &filter).await?;

    Ok(Json(TransactionListResponse {
        transactions: transactions.into_iter().map(transaction_view).collect(),
    }))
}

pub async fn transaction_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let amount: MoneyCents = payload.amount.parse()?;
    let mut cmd = NewTransactionCmd::new(
        user.id,
        map_type(payload.kind),
        amount,
        payload.description,
        payload.date.with_timezone(&Utc),
    )
    .category_id(payload.category_id)
    .wallet_id(payload.wallet_id);
    if let Some(destination) = payload.destination_wallet_id {
        cmd = cmd.destination_wallet_id(destination);
    }

    let created = state.engine.create_transaction(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            transactions: created.into_iter().map(transaction_view).collect(),
        }),
    ))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let mut cmd = UpdateTransactionCmd::new(user.id, id);
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(map_type(kind));
    }
    if let Some(amount) = payload.amount.as_deref() {
        cmd = cmd.amount(amount.parse()?);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(date) = payload.date {
        cmd = cmd.occurred_at(date.with_timezone(&Utc));
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(wallet_id) = payload.wallet_id {
        cmd = cmd.wallet_id(wallet_id);
    }

    let tx = state.engine.update_transaction(cmd).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let removed = state.engine.delete_transaction(user.id, id).await?;
    tracing::debug!("deleted {} transaction rows", removed.len());
    Ok(StatusCode::NO_CONTENT)
}
