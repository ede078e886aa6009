use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::{AdminError, AppState};
use crate::bundle::{decode, encode, export_bundle, import_bundle, BundleFormat, ImportSummary};
use crate::entity::{EntityKind, Route};
use crate::error::EngineError;
use crate::observability::metrics::{self, ExportKind};
use crate::openapi::{OpenApiDocument, Projector};
use crate::store::StoreExt;

#[derive(Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
    })
}

/// `GET /admin/export/routes/{ids}`, ids comma-separated.
pub async fn export_routes(
    State(state): State<AppState>,
    Path(ids): Path<String>,
) -> Result<Json<OpenApiDocument>, AdminError> {
    let started = Instant::now();
    let result = project_ids(&state, &ids);
    metrics::record_export(ExportKind::OpenApi, result.is_ok(), started);
    result.map(Json)
}

/// `GET /admin/export/routes`.
pub async fn export_all_routes(
    State(state): State<AppState>,
) -> Result<Json<OpenApiDocument>, AdminError> {
    let started = Instant::now();
    let result = project_all(&state);
    metrics::record_export(ExportKind::OpenApi, result.is_ok(), started);
    result.map(Json)
}

fn project_ids(state: &AppState, ids: &str) -> Result<OpenApiDocument, AdminError> {
    let routes = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| state.store.fetch::<Route>(id).map_err(EngineError::from))
        .collect::<Result<Vec<_>, _>>()?;

    if routes.is_empty() {
        return Err(AdminError::BadRequest("no route ids given".into()));
    }
    project(state, &routes)
}

fn project_all(state: &AppState) -> Result<OpenApiDocument, AdminError> {
    let routes: Vec<Route> = state.store.fetch_all().map_err(EngineError::from)?;
    if routes.is_empty() {
        return Err(AdminError::NoRoutes);
    }
    project(state, &routes)
}

fn project(state: &AppState, routes: &[Route]) -> Result<OpenApiDocument, AdminError> {
    let settings = state.config.load().export.projector_settings();
    Ok(Projector::new(state.store.as_ref(), settings).project(routes)?)
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// `GET /admin/export/configuration?format=json|yaml`.
pub async fn export_configuration(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AdminError> {
    let started = Instant::now();
    let result = encode_configuration(&state, query.format.as_deref());
    metrics::record_export(ExportKind::Bundle, result.is_ok(), started);

    let (format, body) = result?;
    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

fn encode_configuration(
    state: &AppState,
    format: Option<&str>,
) -> Result<(BundleFormat, String), AdminError> {
    let format = match format {
        Some(name) => name.parse::<BundleFormat>()?,
        None => state.config.load().export.bundle_format,
    };
    let bundle = export_bundle(state.store.as_ref())?;
    metrics::record_exported_variables(bundle.variables.len());
    Ok((format, encode(&bundle, format)?))
}

/// `POST /admin/import/configuration`, body in YAML or JSON.
pub async fn import_configuration(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ImportSummary>, AdminError> {
    let format = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(format_from_content_type);

    let result =
        decode(&body, format).and_then(|bundle| import_bundle(state.store.as_ref(), bundle));

    metrics::record_import(result.is_ok());
    Ok(Json(result?))
}

fn format_from_content_type(content_type: &str) -> Option<BundleFormat> {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if mime.ends_with("json") {
        Some(BundleFormat::Json)
    } else if mime.ends_with("yaml") || mime.ends_with("yml") {
        Some(BundleFormat::Yaml)
    } else {
        None
    }
}

/// Entity counts, for the status line of the CLI.
#[derive(Serialize, Deserialize)]
pub struct StoreCounts {
    pub routes: usize,
    pub services: usize,
    pub upstreams: usize,
    pub consumers: usize,
}

/// `GET /admin/store`.
pub async fn get_store_counts(
    State(state): State<AppState>,
) -> Result<Json<StoreCounts>, AdminError> {
    let count = |kind: EntityKind| {
        state
            .store
            .list(kind, None)
            .map(|rows| rows.len())
            .map_err(|e| AdminError::Engine(e.into()))
    };
    Ok(Json(StoreCounts {
        routes: count(EntityKind::Route)?,
        services: count(EntityKind::Service)?,
        upstreams: count(EntityKind::Upstream)?,
        consumers: count(EntityKind::Consumer)?,
    }))
}
