use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricetarget_core::domain::stock::StockRecord;
use pricetarget_core::error::ScoringError;
use pricetarget_core::scoring::{Recommendation, Recommender};
use pricetarget_core::storage::stocks::{self, StockQuery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = pricetarget_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    // The model is loaded once and shared read-only by every request.
    let recommender = match load_recommender(&settings).await {
        Ok(r) => Some(r),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "cluster model unavailable; recommendations disabled");
            None
        }
    };

    let state = AppState { pool, recommender };

    let app = router(state).layer(cors_layer(&settings));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn load_recommender(
    settings: &pricetarget_core::config::Settings,
) -> anyhow::Result<Recommender> {
    let source = pricetarget_core::model::source_from_settings(settings)?;
    let model = pricetarget_core::model::load_model(source.as_ref()).await?;
    Ok(Recommender::new(Arc::new(model)))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/stocks", get(list_stocks))
        .route("/recommendation", get(recommend_first))
        .route("/recommendation/:id", get(recommend_by_id))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(settings: &pricetarget_core::config::Settings) -> CorsLayer {
    let origin = match settings.cors_origins() {
        Some(origins) => {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    pool: Option<PgPool>,
    recommender: Option<Recommender>,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    offset: Option<String>,
    sortby: Option<String>,
    asc: Option<String>,
    query: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiRecommendation {
    stock: StockRecord,
    #[serde(flatten)]
    recommendation: Recommendation,
}

async fn list_stocks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<StockRecord>>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let query = StockQuery::from_params(
        params.offset.as_deref(),
        params.sortby.as_deref(),
        params.asc.as_deref(),
        params.query.as_deref(),
    );

    let items = stocks::list_stocks(pool, &query).await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(items))
}

async fn recommend_first(
    State(state): State<AppState>,
) -> Result<Json<ApiRecommendation>, StatusCode> {
    let (pool, recommender) = ready(&state)?;

    let stock = stocks::fetch_first_stock(pool)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    score(recommender, stock).map(Json)
}

async fn recommend_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiRecommendation>, StatusCode> {
    let (pool, recommender) = ready(&state)?;

    let stock = stocks::fetch_stock_by_id(pool, &id)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    score(recommender, stock).map(Json)
}

fn ready(state: &AppState) -> Result<(&PgPool, &Recommender), StatusCode> {
    match (&state.pool, &state.recommender) {
        (Some(pool), Some(recommender)) => Ok((pool, recommender)),
        _ => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

fn score(recommender: &Recommender, stock: StockRecord) -> Result<ApiRecommendation, StatusCode> {
    match recommender.recommend(&stock) {
        Ok(recommendation) => {
            tracing::info!(
                ticker = %stock.ticker,
                cluster = recommendation.cluster,
                predicted_target_delta = ?recommendation.predicted_target_delta,
                "scored stock"
            );
            Ok(ApiRecommendation {
                stock,
                recommendation,
            })
        }
        Err(e) => {
            tracing::warn!(ticker = %stock.ticker, id = %stock.id, error = %e, "scoring failed");
            Err(scoring_status(&e))
        }
    }
}

fn scoring_status(err: &ScoringError) -> StatusCode {
    if err.is_record_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &pricetarget_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
