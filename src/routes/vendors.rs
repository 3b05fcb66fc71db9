use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::vendors::{
        CreateVendorRequest, UpdateVendorRequest, VendorRatingRequest, VendorStatusRequest,
    },
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    models::Vendor,
    response::ApiResponse,
    services::vendor_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vendors).post(create_vendor))
        .route(
            "/{id}",
            get(get_vendor).put(update_vendor).delete(delete_vendor),
        )
        .route("/{id}/status", patch(update_vendor_status))
        .route("/{id}/rating", patch(update_vendor_rating))
}

#[utoipa::path(
    get,
    path = "/api/vendors",
    responses(
        (status = 200, description = "All vendors by name", body = ApiResponse<Vec<Vendor>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only store managers manage vendors"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Vendor>>>> {
    let resp = vendor_service::list_vendors(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created", body = ApiResponse<Vendor>),
        (status = 400, description = "Validation failed or email already registered"),
        (status = 403, description = "Only store managers manage vendors"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateVendorRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vendor>>)> {
    let resp = vendor_service::create_vendor(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor", body = ApiResponse<Vendor>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vendor>>> {
    let resp = vendor_service::get_vendor(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Vendor updated", body = ApiResponse<Vendor>),
        (status = 400, description = "Validation failed or email already registered"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateVendorRequest>,
) -> AppResult<Json<ApiResponse<Vendor>>> {
    let resp = vendor_service::update_vendor(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn delete_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = vendor_service::delete_vendor(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/vendors/{id}/status",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    request_body = VendorStatusRequest,
    responses(
        (status = 200, description = "Vendor with the new status", body = ApiResponse<Vendor>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn update_vendor_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<VendorStatusRequest>,
) -> AppResult<Json<ApiResponse<Vendor>>> {
    let resp = vendor_service::update_vendor_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/vendors/{id}/rating",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    request_body = VendorRatingRequest,
    responses(
        (status = 200, description = "Vendor with the new rating", body = ApiResponse<Vendor>),
        (status = 400, description = "Rating outside 0..=5"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn update_vendor_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<VendorRatingRequest>,
) -> AppResult<Json<ApiResponse<Vendor>>> {
    let resp = vendor_service::update_vendor_rating(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
