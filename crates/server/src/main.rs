use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dashboard_api::{export_selection, handle_event, refresh_table, DashboardContext};
use shared::{
    domain::ClickSignal,
    error::{ApiError, ErrorCode},
    protocol::{DashboardControls, DashboardEvent, DashboardOutput, DatasetInfo, TablePage},
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod layout;
mod query;

use app_state::AppState;
use config::{dataset_source, load_about_text, load_settings};
use query::{click_count, parse_dashboard_query, DashboardQuery};

const MAX_EVENT_BYTES: usize = 64 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let about = load_about_text(&settings.about_config_path)?;
    let source = dataset_source(&settings)?;
    info!(%source, "loading dataset");
    let dataset = source.load().await.map_err(|error| {
        error!(
            %source,
            %error,
            "failed to load dataset; the dashboard cannot start without it"
        );
        error
    })?;
    info!(
        rows = dataset.len(),
        countries = dataset.summary().countries.len(),
        continents = dataset.summary().continents.len(),
        "dataset ready"
    );

    let state = AppState::new(DashboardContext::new(dataset), about);
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "dashboard listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/controls", get(http_controls))
        .route("/dataset", get(http_dataset_info))
        .route("/table", get(http_table))
        .route("/download", get(http_download))
        .route("/events", post(http_event))
        .layer(RequestBodyLimitLayer::new(MAX_EVENT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn parse_query(state: &AppState, raw: Option<String>) -> ApiResult<DashboardQuery> {
    parse_dashboard_query(raw.as_deref(), state.api.default_selection()).map_err(api_error)
}

async fn index(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Html<String>> {
    let query = parse_query(&state, raw)?;
    let selection = dashboard_api::normalize_selection(&state.api.dataset, query.selection);
    let table = refresh_table(&state.api, &selection, query.page);
    Ok(Html(layout::render_dashboard(
        &state.about,
        &state.controls,
        &selection,
        &table,
    )))
}

async fn http_controls(State(state): State<Arc<AppState>>) -> Json<DashboardControls> {
    Json(state.controls.clone())
}

async fn http_dataset_info(State(state): State<Arc<AppState>>) -> Json<DatasetInfo> {
    Json(state.api.dataset.info())
}

async fn http_table(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<TablePage>> {
    let query = parse_query(&state, raw)?;
    Ok(Json(refresh_table(&state.api, &query.selection, query.page)))
}

async fn http_download(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Response> {
    let n_clicks = click_count(raw.as_deref()).map_err(api_error)?;
    if !ClickSignal::from_click_count(n_clicks).is_clicked() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let query = parse_query(&state, raw)?;
    let Some(payload) =
        export_selection(&state.api, query.n_clicks, &query.selection).map_err(api_error)?
    else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", payload.filename))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((StatusCode::OK, headers, payload.content).into_response())
}

async fn http_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<DashboardEvent>,
) -> ApiResult<Json<DashboardOutput>> {
    let output = handle_event(&state.api, &event).map_err(api_error)?;
    Ok(Json(output))
}

fn api_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
