//! Catalog browsing, uploads, downloads and owner document management.

use super::error::ApiError;
use super::session::Session;
use super::state::*;
use crate::catalog_query::{CatalogFilters, PageRequest, Scope};
use crate::document::{Branch, Category, Document, DocumentUpload, FileType};
use crate::user::Permission;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

/// Query string shared by every filtered document listing.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ListingParams {
    pub search: Option<String>,
    pub branch: Option<String>,
    pub category: Option<String>,
    pub filetype: Option<String>,
    pub page: Option<String>,
}

fn non_blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parses an optional choice; blank means "no filter", unknown values are rejected.
fn parse_choice<T>(
    field: &str,
    raw: &Option<String>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, ApiError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(value) => parse(value)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown {} '{}'", field, value))),
    }
}

impl ListingParams {
    /// The search text is used as given; only an empty string means no search.
    pub fn filters(&self) -> Result<CatalogFilters, ApiError> {
        Ok(CatalogFilters {
            search: self.search.clone().filter(|s| !s.is_empty()),
            branch: parse_choice("branch", &self.branch, Branch::parse)?,
            category: parse_choice("category", &self.category, Category::parse)?,
            file_type: parse_choice("filetype", &self.filetype, FileType::parse)?,
        })
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

async fn get_catalog(
    session: Session,
    State(state): State<ServerState>,
    Query(params): Query<ListingParams>,
) -> Result<Response, ApiError> {
    session.require(Permission::BrowseCatalog)?;
    let page = state.catalog.query(
        Scope::PublicAccepted,
        params.filters()?,
        params.page(),
        state.config.pagination.catalog_page_size,
    )?;
    Ok(Json(page).into_response())
}

async fn redirect_to_catalog() -> Redirect {
    Redirect::temporary("/v1/catalog")
}

#[derive(Debug, Deserialize)]
struct PageParams {
    pub page: Option<String>,
}

async fn get_my_documents(
    session: Session,
    State(state): State<ServerState>,
    Query(params): Query<PageParams>,
) -> Result<Response, ApiError> {
    let page = state.catalog.query(
        Scope::OwnedBy(session.user_id),
        CatalogFilters::default(),
        PageRequest::parse(params.page.as_deref()),
        state.config.pagination.moderation_page_size,
    )?;
    Ok(Json(page).into_response())
}

/// Multipart fields of an upload, collected before validation.
#[derive(Default)]
struct UploadForm {
    branch: Option<String>,
    category: Option<String>,
    file_type: Option<String>,
    subject: Option<String>,
    description: Option<String>,
    file_name: Option<String>,
    data: Option<Vec<u8>>,
}

fn required_choice<T>(
    field: &str,
    raw: &Option<String>,
    parse: fn(&str) -> Option<T>,
) -> Result<T, ApiError> {
    parse_choice(field, raw, parse)?
        .ok_or_else(|| ApiError::bad_request(format!("Missing field '{}'", field)))
}

impl UploadForm {
    fn into_upload(self) -> Result<DocumentUpload, ApiError> {
        let data = self
            .data
            .ok_or_else(|| ApiError::bad_request("Missing field 'file'"))?;
        Ok(DocumentUpload {
            branch: required_choice("branch", &self.branch, Branch::parse)?,
            category: required_choice("category", &self.category, Category::parse)?,
            file_type: required_choice("filetype", &self.file_type, FileType::parse)?,
            subject: self.subject.unwrap_or_default(),
            description: self.description,
            file_name: self.file_name.unwrap_or_default(),
            data,
        })
    }
}

async fn upload_document(
    session: Session,
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    session.require(Permission::UploadDocuments)?;

    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            form.file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::bad_request(err.to_string()))?;
            form.data = Some(bytes.to_vec());
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|err| ApiError::bad_request(err.to_string()))?;
        match name.as_str() {
            "branch" => form.branch = Some(value),
            "category" => form.category = Some(value),
            "filetype" => form.file_type = Some(value),
            "subject" => form.subject = Some(value),
            "description" => form.description = Some(value),
            _ => debug!("Ignoring unknown upload field '{}'", name),
        }
    }

    let document = state
        .document_service
        .upload(form.into_upload()?, &session.auth_context())
        .await?;
    Ok((StatusCode::CREATED, Json(document)).into_response())
}

fn content_disposition(document: &Document) -> HeaderValue {
    let file_name: String = document
        .file_name
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .filter(|c| *c != '"' && *c != '\\')
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

async fn download_document(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<usize>,
) -> Result<Response, ApiError> {
    let (document, data) = state
        .document_service
        .download(id, &session.auth_context())
        .await?;

    let mime_type = infer::get(&data)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");
    debug!(
        "Serving document {} ({}, {} bytes, {} downloads)",
        id,
        mime_type,
        data.len(),
        document.download_count
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_DISPOSITION, content_disposition(&document))
        .body(Body::from(data))
        .map_err(ApiError::internal)
}

async fn delete_document(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<usize>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .moderation
        .delete_document(id, &session.auth_context())
        .await?;
    Ok(Json(document))
}

pub fn make_catalog_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(get_catalog))
        .with_state(state)
}

pub fn make_document_routes(state: ServerState) -> Router {
    // Leaves room for the multipart framing around a file of the maximum size.
    let body_limit = state.document_service.policy().max_file_size_bytes() as usize + 1024 * 1024;

    Router::new()
        .route("/", post(upload_document))
        .route("/all", get(redirect_to_catalog))
        .route("/mine", get(get_my_documents))
        .route("/{id}", delete(delete_document))
        .route("/{id}/file", get(download_document))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
