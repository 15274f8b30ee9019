//! HTTP surface: axum router and handlers. Pure glue over the service and
//! store; response envelopes follow the `status`/`data`/`message` shape.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::service::PhoneService;
use crate::store::PhoneStore;

#[derive(Clone)]
pub struct AppState {
    pub service: PhoneService,
    pub store: PhoneStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/phones",
            post(create_phone).get(list_phones).delete(delete_all_phones),
        )
        .route(
            "/api/phones/:id",
            get(get_phone).put(update_phone).delete(delete_phone),
        )
        .route("/api/stats", get(stats))
        // Legacy aliases kept for existing clients.
        .route("/api/sphone.php", post(create_phone_legacy))
        .route("/api/get-phones", get(list_phones))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreatePhoneRequest {
    id: Option<i64>,
    phone_number: Option<String>,
    country: Option<String>,
}

/// Create payload as legacy clients send it.
#[derive(Debug, Deserialize)]
struct LegacyCreateRequest {
    #[serde(rename = "userId")]
    user_id: Option<i64>,
    nomor: Option<String>,
    negara: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdatePhoneRequest {
    phone_number: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    search: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn create_phone(
    State(state): State<AppState>,
    Json(req): Json<CreatePhoneRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let raw = req.phone_number.as_deref().map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err(ApiError::Validation("phone_number is required".to_string()));
    }
    let record = state
        .service
        .save_formatted_phone(req.id, raw, req.country.as_deref().unwrap_or(""))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": record })),
    ))
}

async fn create_phone_legacy(
    State(state): State<AppState>,
    Json(req): Json<LegacyCreateRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let raw = req.nomor.as_deref().map(str::trim).unwrap_or("");
    let id = match req.user_id {
        Some(id) => id,
        None => {
            return Err(ApiError::Validation(
                "userId and nomor are required".to_string(),
            ))
        }
    };
    if raw.is_empty() {
        return Err(ApiError::Validation(
            "userId and nomor are required".to_string(),
        ));
    }
    let record = state
        .service
        .save_formatted_phone(Some(id), raw, req.negara.as_deref().unwrap_or(""))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": record })),
    ))
}

async fn list_phones(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let search = params.search.as_deref();
    let rows = state.store.list(search, params.limit, params.offset).await?;
    let total = state.store.count(search).await?;
    Ok(Json(
        json!({ "status": "success", "data": rows, "total": total }),
    ))
}

async fn get_phone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let record = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("phone {id} not found")))?;
    Ok(Json(json!({ "status": "success", "data": record })))
}

async fn update_phone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePhoneRequest>,
) -> Result<Json<Value>, ApiError> {
    let raw = req.phone_number.as_deref().map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err(ApiError::Validation("phone_number is required".to_string()));
    }
    let record = state
        .service
        .update_phone(id, raw, req.country.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(json!({ "status": "success", "data": record })))
}

async fn delete_phone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if state.store.delete(id).await? {
        Ok(Json(json!({ "status": "success" })))
    } else {
        Err(ApiError::NotFound(format!("phone {id} not found")))
    }
}

async fn delete_all_phones(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let deleted = state.store.delete_all().await?;
    Ok(Json(
        json!({ "status": "success", "data": { "deleted": deleted } }),
    ))
}

async fn stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.store.stats().await?;
    Ok(Json(json!({ "status": "success", "data": stats })))
}
