//! HTTP request handlers.

use crate::catalog::ShelfItem;
use crate::error::{AppError, Result};
use crate::library::{PathKind, SHELF_PREFIX};
use crate::media::{self, ACQUISITION_TYPE, NAVIGATION_TYPE};
use crate::opds::{self, Feed};
use crate::server::AppState;
use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header, response::Builder},
    response::Response,
};
use serde::Deserialize;
use std::path::Path;
use tower::ServiceExt;
use tower_http::services::ServeFile;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Start a response, adding no-cache headers when configured.
fn response_builder(no_cache: bool) -> Builder {
    let builder = Response::builder().status(StatusCode::OK);
    if no_cache {
        builder
            .header(header::CACHE_CONTROL, NO_CACHE)
            .header(header::EXPIRES, "0")
    } else {
        builder
    }
}

/// Serialize a feed with the given catalog media type.
fn feed_response(state: &AppState, content_type: &str, feed: Feed) -> Result<Response> {
    response_builder(state.no_cache())
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(feed.to_xml()))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// OpenSearch description.
pub async fn opensearch() -> Result<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/xml")
        .body(Body::from(opds::OPENSEARCH_DESCRIPTION))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Root menu feed.
pub async fn catalog_root(State(state): State<AppState>) -> Result<Response> {
    let feed = state.catalog.root_menu();
    feed_response(&state, NAVIGATION_TYPE, feed)
}

/// Newest books feed.
pub async fn catalog_newest(State(state): State<AppState>) -> Result<Response> {
    let feed = state.catalog.newest();
    feed_response(&state, NAVIGATION_TYPE, feed)
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// Search results feed.
pub async fn catalog_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let query = params.q.unwrap_or_default();
    let feed = state.catalog.search(&query)?;
    feed_response(&state, ACQUISITION_TYPE, feed)
}

/// Browse a directory or download a file below the library root.
pub async fn shelf(State(state): State<AppState>, request: Request) -> Result<Response> {
    let uri = request.uri().clone();
    let request_path = urlencoding::decode(uri.path())
        .map_err(|e| AppError::BadRequest(format!("Undecodable path {}: {}", uri.path(), e)))?
        .into_owned();
    let relative = request_path
        .strip_prefix(SHELF_PREFIX)
        .ok_or_else(|| AppError::NotFound(request_path.clone()))?;

    tracing::debug!(path = %request_path, "Shelf request");

    match state.catalog.shelf_item(relative)? {
        ShelfItem::File(path) => serve_file(&state, &path, request).await,
        ShelfItem::Directory(path, kind) => {
            let feed = state.catalog.browse(&request_path, &path);
            let content_type = match kind {
                PathKind::DirOfFiles => ACQUISITION_TYPE,
                _ => NAVIGATION_TYPE,
            };
            feed_response(&state, content_type, feed)
        }
    }
}

/// Serve a file as an attachment.
///
/// `ServeFile` answers `Range` and conditional requests and sets
/// `Last-Modified`; the catalog media type and disposition go on top.
async fn serve_file(state: &AppState, path: &Path, request: Request) -> Result<Response> {
    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let mut response = response.map(Body::new);
    let status = response.status();

    let headers = response.headers_mut();
    if status == StatusCode::OK || status == StatusCode::PARTIAL_CONTENT {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().replace('"', ""))
            .unwrap_or_default();
        insert_header(headers, header::CONTENT_TYPE, media::type_for_path(path))?;
        insert_header(
            headers,
            header::CONTENT_DISPOSITION,
            &format!("attachment; filename=\"{}\"", filename),
        )?;
    }
    if state.no_cache() {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }

    Ok(response)
}

fn insert_header(headers: &mut HeaderMap, name: header::HeaderName, value: &str) -> Result<()> {
    let value =
        HeaderValue::from_bytes(value.as_bytes()).map_err(|e| AppError::Internal(e.to_string()))?;
    headers.insert(name, value);
    Ok(())
}

/// Anything that is not a catalog route.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
