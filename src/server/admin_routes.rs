//! Administrator dashboard: moderation queue, users and contact inbox.

use super::document_routes::ListingParams;
use super::error::ApiError;
use super::session::Session;
use super::state::*;
use crate::catalog_query::{PageRequest, Scope};
use crate::document::{Document, DocumentStatus};
use crate::user::{Permission, User};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct AdminStats {
    pending_documents: usize,
    accepted_documents: usize,
    rejected_documents: usize,
    total_documents: usize,
    users: usize,
    unread_queries: usize,
}

async fn get_stats(
    session: Session,
    State(state): State<ServerState>,
) -> Result<Json<AdminStats>, ApiError> {
    session.require(Permission::ModerateDocuments)?;
    let counts = state.document_store.count_by_status()?;
    Ok(Json(AdminStats {
        pending_documents: counts.pending,
        accepted_documents: counts.accepted,
        rejected_documents: counts.rejected,
        total_documents: counts.total(),
        users: state.user_manager.count_users()?,
        unread_queries: state.contact.unread_count()?,
    }))
}

#[derive(Debug, Default, Deserialize)]
struct ModerationParams {
    status: Option<String>,
    #[serde(flatten)]
    listing: ListingParams,
}

/// `pending` when absent, `all` for every document.
fn moderation_scope(status: Option<&str>) -> Result<Scope, ApiError> {
    match status.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Scope::ByStatus(DocumentStatus::Pending)),
        Some("all") => Ok(Scope::All),
        Some(value) => DocumentStatus::parse(value)
            .map(Scope::ByStatus)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown status '{}'", value))),
    }
}

async fn get_documents(
    session: Session,
    State(state): State<ServerState>,
    Query(params): Query<ModerationParams>,
) -> Result<Response, ApiError> {
    session.require(Permission::ModerateDocuments)?;
    let page = state.catalog.query(
        moderation_scope(params.status.as_deref())?,
        params.listing.filters()?,
        params.listing.page(),
        state.config.pagination.moderation_page_size,
    )?;
    Ok(Json(page).into_response())
}

#[derive(Deserialize)]
struct StatusBody {
    status: String,
}

#[derive(Serialize)]
struct StatusChangeResponse {
    previous: DocumentStatus,
    status: DocumentStatus,
    changed: bool,
    document: Document,
}

/// Authorization is left to the moderation engine.
async fn put_document_status(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<usize>,
    Json(body): Json<StatusBody>,
) -> Result<Json<StatusChangeResponse>, ApiError> {
    let transition = state
        .moderation
        .set_status(id, &body.status, &session.auth_context())
        .await?;
    Ok(Json(StatusChangeResponse {
        previous: transition.previous,
        status: transition.current(),
        changed: transition.changed(),
        document: transition.document,
    }))
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<String>,
}

async fn get_users(
    session: Session,
    State(state): State<ServerState>,
    Query(params): Query<PageParams>,
) -> Result<Response, ApiError> {
    session.require(Permission::ManageUsers)?;
    let page = state.user_manager.list_users(
        PageRequest::parse(params.page.as_deref()),
        state.config.pagination.user_page_size,
    )?;
    Ok(Json(page).into_response())
}

async fn delete_user(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<usize>,
) -> Result<Json<User>, ApiError> {
    session.require(Permission::ManageUsers)?;
    Ok(Json(state.user_manager.delete_user(id).await?))
}

#[derive(Debug, Deserialize)]
struct QueriesParams {
    read: Option<String>,
    page: Option<String>,
}

fn parse_read_flag(raw: Option<&str>) -> Result<bool, ApiError> {
    match raw.map(str::trim) {
        None | Some("") | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(ApiError::bad_request(format!(
            "Invalid read flag '{}', expected true or false",
            other
        ))),
    }
}

async fn get_queries(
    session: Session,
    State(state): State<ServerState>,
    Query(params): Query<QueriesParams>,
) -> Result<Response, ApiError> {
    session.require(Permission::ReadContactQueries)?;
    let page = state.contact.list(
        parse_read_flag(params.read.as_deref())?,
        PageRequest::parse(params.page.as_deref()),
        state.config.pagination.moderation_page_size,
    )?;
    Ok(Json(page).into_response())
}

async fn get_query(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<usize>,
) -> Result<Response, ApiError> {
    session.require(Permission::ReadContactQueries)?;
    Ok(Json(state.contact.open(id)?).into_response())
}

pub fn make_admin_routes(state: ServerState) -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/documents", get(get_documents))
        .route("/documents/{id}/status", put(put_document_status))
        .route("/users", get(get_users))
        .route("/users/{id}", delete(delete_user))
        .route("/queries", get(get_queries))
        .route("/queries/{id}", get(get_query))
        .with_state(state)
}
