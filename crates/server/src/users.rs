//! Registration and the authenticated user's profile.

use api_types::user::{Register, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::User;

use crate::{ServerError, server::ServerState};

fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
    }
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Register>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = if state.seed_default_categories {
        let (user, _) = state
            .engine
            .register_user_with_defaults(&payload.email, &payload.password)
            .await?;
        user
    } else {
        state
            .engine
            .register_user(&payload.email, &payload.password)
            .await?
    };
    tracing::info!("registered user {}", user.email);

    Ok((StatusCode::CREATED, Json(user_view(user))))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(user_view(user))
}
