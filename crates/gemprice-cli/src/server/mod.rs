//! Prediction web server built on axum.
//!
//! `GET /` and `GET /predict` render the form, `POST /predict` prices a
//! form submission and re-renders the page with the result, and
//! `POST /predictAPI` prices a JSON body. The transformer and model are
//! loaded on the first prediction and shared read-only afterwards.
pub mod templates;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use maud::Markup;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tower_http::cors::CorsLayer;

use gemprice_ml::config::PipelineConfig;
use gemprice_ml::pipeline::{round2, GemstoneRecord, PredictPipeline};

/// Shared server state for axum handlers.
pub type SharedState = Arc<AppState>;

pub struct AppState {
    config: PipelineConfig,
    pipeline: OnceCell<Arc<PredictPipeline>>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> SharedState {
        Arc::new(AppState {
            config,
            pipeline: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The loaded pipeline. A failed load is not cached, so the next request
    /// retries.
    async fn pipeline(&self) -> Result<Arc<PredictPipeline>, ServerError> {
        let loaded = self
            .pipeline
            .get_or_try_init(|| async {
                let config = self.config.clone();
                let pipeline =
                    tokio::task::spawn_blocking(move || PredictPipeline::load(&config)).await??;
                Ok::<_, ServerError>(Arc::new(pipeline))
            })
            .await?;
        Ok(Arc::clone(loaded))
    }
}

/// Any handler failure. Rendered as a bare 500 after being logged.
#[derive(Debug)]
pub struct ServerError(anyhow::Error);

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        ServerError(err.into())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Build the router with every route and permissive CORS.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/predict", get(home_page).post(predict_datapoint))
        .route("/predictAPI", post(predict_api))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn home_page() -> Markup {
    info!("Rendering the prediction form");
    templates::index(None)
}

async fn predict_datapoint(
    State(state): State<SharedState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Markup, ServerError> {
    info!("Received form submission for prediction");
    let record = GemstoneRecord::from_form(&fields)?;
    let pipeline = state.pipeline().await?;
    let price = round2(pipeline.predict_record(&record)?);
    info!("Returning predicted price: {}", price);
    Ok(templates::index(Some((&record, price))))
}

async fn predict_api(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ServerError> {
    info!("Received JSON request for prediction");
    let record = GemstoneRecord::from_json(&body)?;
    let pipeline = state.pipeline().await?;
    let price = round2(pipeline.predict_record(&record)?);
    info!("Returning predicted price: {}", price);
    Ok(Json(json!({ "price": price })))
}

/// Serve on the configured address until the process is stopped.
pub async fn run(state: SharedState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config().server.host, state.config().server.port);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
