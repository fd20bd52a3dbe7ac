use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::{validate_name, CatalogWriteEntry, ServiceTypeEntry};
use serde::{Deserialize, Serialize};
use service::csv;
use service::errors::ServiceError;
use service::session::BulkEditSession;
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: usize,
    pub page_size: Option<usize>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub entries: Vec<ServiceTypeEntry>,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub page_size_choices: Vec<usize>,
    pub total: usize,
    pub filtered: usize,
}

#[derive(Debug, Serialize)]
pub struct ReplaceResponse {
    pub added: usize,
    pub changed: usize,
    pub removed: usize,
    pub total: usize,
}

/// Paginated, searchable view of the catalog.
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ListResponse>, JsonApiError> {
    if q.page_size == Some(0) {
        return Err(JsonApiError::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            Some("page_size must be positive".into()),
        ));
    }

    let catalog = state.client.fetch().await.map_err(JsonApiError::upstream)?;
    let total = catalog.len();

    let mut session = BulkEditSession::new(catalog);
    if let Some(size) = q.page_size {
        session.set_page_size(size);
    }
    session.set_search(q.search.as_deref());
    session.set_page(q.page);

    let entries = session.visible_page().map_err(JsonApiError::from)?;
    let filtered = session.filtered().len();
    Ok(Json(ListResponse {
        entries,
        page: session.page_index(),
        page_count: session.page_count(),
        page_size: q.page_size.unwrap_or(30),
        page_size_choices: session.page_size_choices(),
        total,
        filtered,
    }))
}

fn to_entries(payload: Vec<CatalogWriteEntry>) -> Result<Vec<ServiceTypeEntry>, ServiceError> {
    let mut entries: Vec<ServiceTypeEntry> = Vec::with_capacity(payload.len());
    for w in payload {
        validate_name(&w.name)?;
        if entries.iter().any(|e| e.name == w.name) {
            return Err(ServiceError::Validation(format!(
                "duplicate name '{}' in payload",
                w.name
            )));
        }
        let title = if w.title.is_empty() { None } else { Some(w.title.as_str()) };
        entries.push(ServiceTypeEntry::local(&w.name, title, &w.description));
    }
    Ok(entries)
}

async fn reconcile_and_replace(
    state: &ServerState,
    desired: Vec<ServiceTypeEntry>,
) -> Result<ReplaceResponse, JsonApiError> {
    let original = state.client.fetch().await.map_err(JsonApiError::upstream)?;
    let changes = service::reconcile::reconcile(&original, &desired);

    let mut payload: Vec<CatalogWriteEntry> = desired.iter().map(CatalogWriteEntry::from).collect();
    payload.sort_by(|a, b| a.name.cmp(&b.name));
    state.client.replace(&payload).await.map_err(JsonApiError::upstream)?;

    info!(
        tenant = %state.tenant,
        environment = %state.environment,
        summary = %changes.summary(),
        "service-type catalog replaced"
    );
    Ok(ReplaceResponse {
        added: changes.to_add.len(),
        changed: changes.to_change.len(),
        removed: changes.to_remove.len(),
        total: payload.len(),
    })
}

/// Replace the whole collection with the submitted list.
pub async fn replace(
    State(state): State<ServerState>,
    Json(payload): Json<Vec<CatalogWriteEntry>>,
) -> Result<Json<ReplaceResponse>, JsonApiError> {
    let desired = to_entries(payload).map_err(JsonApiError::from)?;
    let resp = reconcile_and_replace(&state, desired).await?;
    Ok(Json(resp))
}

/// Download the catalog as a CSV attachment named
/// `<tenant>-service-types-<environment>.csv`.
pub async fn export_csv(State(state): State<ServerState>) -> Result<Response, JsonApiError> {
    let catalog = state.client.fetch().await.map_err(JsonApiError::upstream)?;
    let body = csv::export(&catalog);
    let filename = csv::export_file_name(&state.tenant, &state.environment);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Import a CSV as the new desired collection.
pub async fn import_csv(
    State(state): State<ServerState>,
    body: String,
) -> Result<Json<ReplaceResponse>, JsonApiError> {
    let desired = csv::import(&body).map_err(JsonApiError::from)?;
    let resp = reconcile_and_replace(&state, desired).await?;
    Ok(Json(resp))
}
