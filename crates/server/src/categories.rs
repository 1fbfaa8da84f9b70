//! Categories API endpoints

use api_types::category::{
    CategoryList, CategoryNew, CategoryUpdate, CategoryView, SuggestRequest, SuggestResponse,
    Suggestion,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Category, CategoryIcon, KeywordSuggester, NewCategoryCmd, UpdateCategoryCmd, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn category_view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        icon: category.icon.as_str().to_string(),
        emoji: category.icon.emoji().to_string(),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryList>, ServerError> {
    let categories = state.engine.list_categories(user.id).await?;
    Ok(Json(CategoryList {
        categories: categories.into_iter().map(category_view).collect(),
    }))
}

pub async fn category_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let mut cmd = NewCategoryCmd::new(user.id, payload.name);
    if let Some(icon) = payload.icon.as_deref() {
        cmd = cmd.icon(CategoryIcon::resolve(icon));
    }
    let category = state.engine.create_category(cmd).await?;
    Ok((StatusCode::CREATED, Json(category_view(category))))
}

pub async fn category_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let mut cmd = UpdateCategoryCmd::new(user.id, id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(icon) = payload.icon.as_deref() {
        cmd = cmd.icon(CategoryIcon::resolve(icon));
    }
    let category = state.engine.update_category(cmd).await?;
    Ok(Json(category_view(category)))
}

pub async fn category_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn suggest(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, ServerError> {
    let suggestion = state
        .engine
        .suggest_category(user.id, &payload.description, &KeywordSuggester)
        .await?
        .map(|s| Suggestion {
            category_id: s.category_id,
            name: s.name,
            confidence: s.confidence,
        });
    Ok(Json(SuggestResponse { suggestion }))
}
