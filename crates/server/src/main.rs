use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use server_api::{add_taxpayer, find_taxpayer_by_tid, list_taxpayers, ApiContext};
use shared::{
    domain::Taxpayer,
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tracing::{error, info};

mod config;

use config::{load_settings, normalize_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|err| {
        error!(%database_url, %err, "failed to open SQLite database");
        err
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "taxpayer registry listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/taxpayers", get(http_list_taxpayers))
        .route("/taxpayers", post(http_add_taxpayer))
        .route("/taxpayers/:tid", get(http_find_taxpayer))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.api.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage unavailable"),
    }
}

async fn http_list_taxpayers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Taxpayer>>, (StatusCode, Json<ApiError>)> {
    let taxpayers = list_taxpayers(&state.api).await.map_err(into_response)?;
    Ok(Json(taxpayers))
}

async fn http_add_taxpayer(
    State(state): State<Arc<AppState>>,
    Json(record): Json<Taxpayer>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    add_taxpayer(&state.api, record)
        .await
        .map_err(into_response)?;
    Ok(StatusCode::CREATED)
}

async fn http_find_taxpayer(
    State(state): State<Arc<AppState>>,
    Path(tid): Path<String>,
) -> Result<Json<Taxpayer>, (StatusCode, Json<ApiError>)> {
    let found = find_taxpayer_by_tid(&state.api, &tid)
        .await
        .map_err(into_response)?;
    match found {
        Some(record) => Ok(Json(record)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                ErrorCode::NotFound,
                format!("no taxpayer with tid '{}'", tid.trim()),
            )),
        )),
    }
}

fn into_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Duplicate => StatusCode::CONFLICT,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}
