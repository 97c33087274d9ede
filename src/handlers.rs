//! Request handlers for the item endpoints.
//!
//! Every handler follows the same shape: rate limiter check, input
//! validation, service call, response mapping. Domain errors become HTTP
//! responses through `AppError`'s `IntoResponse`; nothing below this layer
//! knows about status codes.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::key_generator::KeyGenerator;
use crate::models::Item;
use crate::pagination::{PageInfo, Pagination};
use crate::rate_limiter::RateLimiter;
use crate::response;
use crate::service::ItemService;
use crate::validation;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: ItemService,
    /// Limiter for read endpoints (higher quota).
    pub read_limiter: Arc<RateLimiter>,
    /// Limiter for mutating endpoints.
    pub write_limiter: Arc<RateLimiter>,
    pub keys: Arc<KeyGenerator>,
    /// Backend label surfaced by the health endpoint.
    pub rate_limit_backend: &'static str,
}

#[derive(Debug, Serialize)]
struct CreateItemResponse {
    id: i32,
    nombre: String,
    descripcion: Option<String>,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ItemResponse {
    item: Item,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ItemListResponse {
    items: Vec<Item>,
    count: usize,
    pagination: PageInfo,
    message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateItemResponse {
    id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    descripcion: Option<String>,
    affected_rows: u64,
    message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteItemResponse {
    id: i32,
    affected_rows: u64,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    rate_limit_backend: &'static str,
}

fn fingerprint(
    state: &AppState,
    headers: &HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    method: &Method,
    path: &str,
) -> String {
    state.keys.generate(headers, peer.map(|p| p.0), method, path)
}

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .map_err(|_| AppError::Validation("ID no válido o no proporcionado".into()))
}

/// Body must be a non-empty JSON object. `empty_message` distinguishes the
/// create and update wording.
fn parse_json_object(body: &Bytes, empty_message: &str) -> Result<Value, AppError> {
    if body.is_empty() {
        return Err(AppError::Validation(empty_message.into()));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::Validation("Datos de item inválidos".into()))?;

    match value.as_object() {
        Some(fields) if !fields.is_empty() => Ok(value),
        _ => Err(AppError::Validation("Datos de item inválidos".into())),
    }
}

fn validation_error(errors: Vec<validation::FieldError>) -> AppError {
    AppError::Validation(validation::error_message(&errors))
}

/// POST /items
pub async fn create_item(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let key = fingerprint(&state, &headers, peer, &method, uri.path());
    state.write_limiter.check(&key).await?;

    let payload = parse_json_object(&body, "El cuerpo de la solicitud no puede estar vacío")?;
    let item = validation::validate_create(&payload).map_err(validation_error)?;

    let created = state.service.create_item(item).await?;

    Ok(response::created(&CreateItemResponse {
        id: created.id,
        nombre: created.item.nombre,
        descripcion: created.item.descripcion,
        message: "Item creado exitosamente",
    }))
}

/// GET /items?page&limit
pub async fn get_items(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let key = fingerprint(&state, &headers, peer, &method, uri.path());
    state.read_limiter.check(&key).await?;

    let pagination = Pagination::from_query(
        params.get("page").map(String::as_str),
        params.get("limit").map(String::as_str),
    );

    let (items, total) = state.service.get_all_items_paginated(pagination).await?;

    tracing::info!(
        count = items.len(),
        page = pagination.page,
        limit = pagination.limit,
        total,
        "items listed"
    );

    Ok(response::success(&ItemListResponse {
        count: items.len(),
        pagination: PageInfo::new(pagination, total),
        items,
        message: "Items obtenidos exitosamente",
    }))
}

/// GET /items/:id
pub async fn get_item(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let key = fingerprint(&state, &headers, peer, &method, uri.path());
    state.read_limiter.check(&key).await?;

    let id = parse_id(&raw_id)?;
    let item = state.service.get_item_by_id(id).await?;

    Ok(response::success(&ItemResponse {
        item,
        message: "Item obtenido exitosamente",
    }))
}

/// PUT/PATCH /items/:id
pub async fn update_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let id = parse_id(&raw_id)?;

    let payload = parse_json_object(&body, "No se proporcionó un cuerpo en la solicitud")?;
    let patch = validation::validate_update(&payload).map_err(validation_error)?;

    let updated = state.service.update_item(id, &patch).await?;

    Ok(response::success(&UpdateItemResponse {
        id: updated.id,
        nombre: patch.nombre,
        descripcion: patch.descripcion,
        affected_rows: updated.affected_rows,
        message: "Item actualizado exitosamente",
    }))
}

/// DELETE /items/:id
pub async fn delete_item(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let key = fingerprint(&state, &headers, peer, &method, uri.path());
    state.write_limiter.check(&key).await?;

    let id = parse_id(&raw_id)?;
    let deleted = state.service.delete_item(id).await?;

    Ok(response::success(&DeleteItemResponse {
        id: deleted.id,
        affected_rows: deleted.affected_rows,
        message: "Item eliminado exitosamente",
    }))
}

/// GET /health — never rate limited.
pub async fn health_check(State(state): State<AppState>) -> Response {
    response::success(&HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        rate_limit_backend: state.rate_limit_backend,
    })
}
