//! Wallets API endpoints.

use api_types::wallet::{
    WalletList, WalletName, WalletSummaryList, WalletSummaryView, WalletView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{User, Wallet};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn wallet_view(wallet: Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        name: wallet.name,
        created_at: wallet.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<WalletList>, ServerError> {
    let wallets = state.engine.list_wallets(user.id).await?;
    Ok(Json(WalletList {
        wallets: wallets.into_iter().map(wallet_view).collect(),
    }))
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<WalletSummaryList>, ServerError> {
    let summaries = state.engine.wallet_summaries(user.id).await?;
    let wallets = summaries
        .into_iter()
        .map(|s| WalletSummaryView {
            id: s.wallet.id,
            name: s.wallet.name,
            income: s.income.to_string(),
            expenses: s.expenses.to_string(),
            balance: s.balance.to_string(),
            transaction_count: s.transaction_count,
        })
        .collect();
    Ok(Json(WalletSummaryList { wallets }))
}

pub async fn wallet_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletName>,
) -> Result<(StatusCode, Json<WalletView>), ServerError> {
    let wallet = state.engine.create_wallet(user.id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(wallet_view(wallet))))
}

pub async fn wallet_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WalletName>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state
        .engine
        .rename_wallet(user.id, id, &payload.name)
        .await?;
    Ok(Json(wallet_view(wallet)))
}

pub async fn wallet_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_wallet(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
