//! HTTP server for the AQI forecast dashboard.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use aqi_forecast::{
    models, render,
    types::{City, ForecastResponse, Page, RenderRequest},
    AppError, CityArtifacts,
};

#[derive(Clone)]
struct AppState {
    /// Directory holding the per-city artifact files.
    data_dir: Arc<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let data_dir = std::env::var("AQI_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let state = AppState {
        data_dir: Arc::new(PathBuf::from(data_dir)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/api/forecast/:city", get(forecast_json))
        .route("/download/:city", get(forecast_csv))
        .route("/static/aqi_powerbi.png", get(comparison_image))
        .layer(cors)
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], 8000));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://0.0.0.0:8000");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    page: Option<Page>,
    city: Option<String>,
}

/// One dashboard request: build the explicit render context, then run a
/// full top-to-bottom recomputation. Artifacts are reloaded from disk on
/// every render; nothing is cached between requests.
async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Html<String> {
    let city = match params.city.as_deref().map(City::parse).transpose() {
        Ok(city) => city.unwrap_or(City::Delhi),
        Err(err) => return Html(render::error_page(&err)),
    };
    let req = RenderRequest {
        page: params.page.unwrap_or(Page::Forecast),
        city,
    };
    tracing::info!("render request: {:?} / {}", req.page, req.city);

    match req.page {
        Page::Comparison => Html(render::comparison_page(&req)),
        Page::Forecast => match render_forecast(&state, &req) {
            Ok(html) => Html(html),
            // report and halt: the error page replaces the render
            Err(err) => {
                tracing::warn!("render failed for {}: {}", req.city, err);
                Html(render::error_page(&err))
            }
        },
    }
}

fn render_forecast(state: &AppState, req: &RenderRequest) -> Result<String, AppError> {
    let artifacts = CityArtifacts::load(req.city, &state.data_dir)?;
    let rows = models::forecast(&artifacts.model, &artifacts.scaler, &artifacts.history)?;
    render::dashboard_page(req, &artifacts.history, &rows)
}

async fn forecast_json(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<ForecastResponse>, AppError> {
    let city = City::parse(&city)?;
    tracing::info!("forecast JSON request for {}", city);

    let artifacts = CityArtifacts::load(city, &state.data_dir)?;
    let forecast = models::forecast(&artifacts.model, &artifacts.scaler, &artifacts.history)?;
    let history = render::history_tail(&artifacts.history).to_vec();

    Ok(Json(ForecastResponse {
        city,
        history,
        forecast,
    }))
}

async fn forecast_csv(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Response, AppError> {
    let city = City::parse(&city)?;
    tracing::info!("CSV download request for {}", city);

    let artifacts = CityArtifacts::load(city, &state.data_dir)?;
    let rows = models::forecast(&artifacts.model, &artifacts.scaler, &artifacts.history)?;
    let body = render::forecast_csv(&rows)?;

    let disposition = format!("attachment; filename=\"{}\"", render::csv_filename(city));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn comparison_image(State(state): State<AppState>) -> Result<Response, AppError> {
    let path = state.data_dir.join("aqi_powerbi.png");
    if !path.exists() {
        return Err(AppError::ArtifactMissing {
            path: path.display().to_string(),
        });
    }
    let bytes = tokio::fs::read(&path).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/png")],
        bytes,
    )
        .into_response())
}
