//! JSON API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::server::AppState;
use crate::lapis::{AggregatedRow, GroupFilter};
use crate::routing::{resolve_url, Registry};
use crate::views::{Route, View, ViewKind};

/// Handler errors, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no dashboard view at {0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    /// Dashboard URL, absolute or root-relative.
    pub url: String,
    /// Anchor for relative date ranges; defaults to the current UTC date.
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AggregatedQuery {
    pub url: String,
    pub today: Option<NaiveDate>,
    /// Comma-separated LAPIS fields to group counts by.
    pub fields: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub route: Route,
    pub canonical_url: Option<String>,
    pub lapis_filters: Vec<GroupFilter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSummary {
    pub kind: ViewKind,
    pub title: &'static str,
    pub pathname: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganismSummary {
    pub key: String,
    pub display_name: String,
    pub views: Vec<ViewSummary>,
}

#[derive(Debug, Serialize)]
pub struct GroupCounts {
    pub group: Option<u32>,
    pub data: Vec<AggregatedRow>,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_organisms(State(state): State<AppState>) -> Json<Vec<OrganismSummary>> {
    Json(organism_summaries(&state.registry.load()))
}

/// Organisms in config order, each with its enabled views.
pub fn organism_summaries(registry: &Registry) -> Vec<OrganismSummary> {
    registry
        .organisms()
        .map(|organism| OrganismSummary {
            key: organism.key.clone(),
            display_name: organism.display_name.clone(),
            views: registry
                .views_of(&organism.key)
                .map(|view| ViewSummary {
                    kind: view.kind(),
                    title: view.kind().title(),
                    pathname: view.pathname().to_string(),
                })
                .collect(),
        })
        .collect()
}

pub async fn resolve_route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let (view, route) = parse_dashboard_url(&state.registry.load(), &query.url)?;
    let today = query.today.unwrap_or_else(today);

    Ok(Json(RouteResponse {
        canonical_url: view.to_url(&route),
        lapis_filters: view.to_lapis_filters(&route, today),
        route,
    }))
}

pub async fn aggregated(
    State(state): State<AppState>,
    Query(query): Query<AggregatedQuery>,
) -> Result<Json<Vec<GroupCounts>>, ApiError> {
    let (view, route) = parse_dashboard_url(&state.registry.load(), &query.url)?;
    let today = query.today.unwrap_or_else(today);
    let fields: Vec<String> = query
        .fields
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    let organism = view.organism();
    let mut results = Vec::new();
    for entry in view.to_lapis_filters(&route, today) {
        let data = state
            .lapis
            .aggregated(&organism.key, &organism.lapis_url, &entry.filter, &fields)
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;
        results.push(GroupCounts {
            group: entry.group,
            data,
        });
    }

    Ok(Json(results))
}

/// Find the view for `url` and parse it, keeping the rejection reason.
pub fn parse_dashboard_url(registry: &Registry, url: &str) -> Result<(View, Route), ApiError> {
    let url = resolve_url(url).map_err(|e| ApiError::BadRequest(format!("invalid url: {}", e)))?;

    let view = registry
        .match_url(&url)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(url.path().to_string()))?;

    let route = view
        .try_parse_query(url.query().unwrap_or_default())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok((view, route))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
