//! HTTP routes over the network service

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use pubmed_network::network::{
    CitationLookup, CitationNetwork, HybridNetwork, LaterWorkLookup, RelationSelector,
};
use pubmed_network::{CollectionStore, NetworkOptions, NetworkService, PubMedError};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NetworkService>,
    pub collections: Arc<dyn CollectionStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/articles/{pmid}/citations", get(citations))
        .route("/api/articles/{pmid}/later-work", get(later_work))
        .route("/api/articles/{pmid}/network", get(article_network))
        .route("/api/collections/{id}/network", get(collection_network))
        .with_state(state)
}

/// Error answered for malformed requests and unknown collections
pub struct ApiError(PubMedError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<PubMedError> for ApiError {
    fn from(error: PubMedError) -> Self {
        Self(error)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(PubMedError::InvalidQuery(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PubMedError::InvalidPmid { .. } | PubMedError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            PubMedError::CollectionNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        };
        warn!(status = status.as_u16(), error = %self.0, "Request rejected");

        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Deserialize)]
struct CitationParams {
    #[serde(rename = "type")]
    relation: Option<String>,
    limit: Option<usize>,
}

async fn citations(
    State(state): State<AppState>,
    Path(pmid): Path<String>,
    params: Result<Query<CitationParams>, QueryRejection>,
) -> Result<Json<CitationLookup>, ApiError> {
    let Query(params) = params?;
    let selector = match params.relation.as_deref() {
        Some(relation) => relation.parse::<RelationSelector>()?,
        None => RelationSelector::default(),
    };
    info!(pmid = %pmid, relation = %selector, "Citation lookup requested");

    let lookup = state
        .service
        .citation_lookup(&pmid, selector, params.limit)
        .await?;
    Ok(Json(lookup))
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

async fn later_work(
    State(state): State<AppState>,
    Path(pmid): Path<String>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<LaterWorkLookup>, ApiError> {
    let Query(params) = params?;
    info!(pmid = %pmid, "Later-work lookup requested");
    let lookup = state.service.later_work(&pmid, params.limit).await?;
    Ok(Json(lookup))
}

async fn article_network(
    State(state): State<AppState>,
    Path(pmid): Path<String>,
    options: Result<Query<NetworkOptions>, QueryRejection>,
) -> Result<Json<CitationNetwork>, ApiError> {
    let Query(options) = options?;
    info!(pmid = %pmid, ?options, "Citation network requested");
    let network = state.service.citation_network(&pmid, options).await?;
    Ok(Json(network))
}

async fn collection_network(
    State(state): State<AppState>,
    Path(id): Path<String>,
    options: Result<Query<NetworkOptions>, QueryRejection>,
) -> Result<Json<HybridNetwork>, ApiError> {
    let Query(options) = options?;
    let members = state.collections.members(&id).await?;
    info!(collection_id = %id, members = members.len(), ?options, "Collection network requested");

    let network = state
        .service
        .hybrid_network(&id, &members, options)
        .await?;
    Ok(Json(network))
}
