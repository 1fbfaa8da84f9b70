use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use engine::{Engine, EngineError};

use std::sync::Arc;

use crate::{ServerError, categories, dashboard, exchange, transactions, users, wallets};

/// Runtime knobs of the HTTP layer.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Request body cap, which bounds spreadsheet uploads.
    pub max_upload_bytes: usize,
    /// Give every newly registered user the default category set.
    pub seed_default_categories: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_bytes: 5 * 1024 * 1024,
            seed_default_categories: true,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub seed_default_categories: bool,
}

/// Resolve HTTP Basic credentials (email:password) to a user.
///
/// Argon2 verification is CPU bound, so it runs on the blocking pool.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(ServerError::unauthorized());
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(ServerError::unauthorized());
    }

    let (user, password_hash) = match state.engine.user_credentials(auth_header.username()).await
    {
        Ok(found) => found,
        Err(EngineError::KeyNotFound(_)) => return Err(ServerError::unauthorized()),
        Err(err) => return Err(err.into()),
    };

    let password = auth_header.password().to_string();
    let verified =
        tokio::task::spawn_blocking(move || engine::verify_password(&password, &password_hash))
            .await
            .map_err(|err| ServerError::Internal(format!("password check panicked: {err}")))?;
    if !verified {
        tracing::debug!("rejected credentials for {}", user.email);
        return Err(ServerError::unauthorized());
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState, max_upload_bytes: usize) -> Router {
    let protected = Router::new()
        .route("/api/me", get(users::me))
        .route(
            "/api/wallets",
            get(wallets::list).post(wallets::wallet_new),
        )
        .route("/api/wallets/summary", get(wallets::summary))
        .route(
            "/api/wallets/{id}",
            patch(wallets::wallet_update).delete(wallets::wallet_delete),
        )
        .route(
            "/api/categories",
            get(categories::list).post(categories::category_new),
        )
        .route("/api/categories/suggest", post(categories::suggest))
        .route(
            "/api/categories/{id}",
            patch(categories::category_update).delete(categories::category_delete),
        )
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::transaction_new),
        )
        .route(
            "/api/transactions/{id}",
            patch(transactions::update).delete(transactions::delete),
        )
        .route("/api/dashboard", get(dashboard::get))
        .route("/api/export", get(exchange::export))
        .route("/api/import", post(exchange::import))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/api/register", post(users::register))
        .merge(protected)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Build the full application router around `engine`.
pub fn app(engine: Engine, config: &ServerConfig) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        seed_default_categories: config.seed_default_categories,
    };
    router(state, config.max_upload_bytes)
}

pub async fn run(engine: Engine, config: ServerConfig) {
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, &config, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    config: &ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, config)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, &config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
