//! Vendor directory. Every operation is limited to store managers.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::vendors::{
        CreateVendorRequest, UpdateVendorRequest, VendorRatingRequest, VendorStatusRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_store_manager},
    models::Vendor,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_vendors(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<Vendor>>> {
    ensure_store_manager(user)?;
    let vendors = state.vendors.list_vendors().await?;
    let count = vendors.len() as i64;
    Ok(ApiResponse::success(
        "Vendors",
        vendors,
        Some(Meta::new(1, count, count)),
    ))
}

pub async fn get_vendor(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Vendor>> {
    ensure_store_manager(user)?;
    let vendor = load_vendor(state, id).await?;
    Ok(ApiResponse::success("OK", vendor, Some(Meta::empty())))
}

pub async fn create_vendor(
    state: &AppState,
    user: &AuthUser,
    payload: CreateVendorRequest,
) -> AppResult<ApiResponse<Vendor>> {
    ensure_store_manager(user)?;
    let draft = payload.validate()?;

    let vendor = Vendor::create(draft, Utc::now());
    state.vendors.insert_vendor(&vendor).await?;

    tracing::info!(vendor_id = %vendor.id, actor = %user.user_id, "vendor created");
    Ok(ApiResponse::success(
        "Vendor created successfully",
        vendor,
        Some(Meta::empty()),
    ))
}

pub async fn update_vendor(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateVendorRequest,
) -> AppResult<ApiResponse<Vendor>> {
    ensure_store_manager(user)?;
    let patch = payload.validate()?;
    let mut vendor = load_vendor(state, id).await?;
    vendor.apply_patch(patch, Utc::now());
    save(state, &vendor).await?;

    tracing::info!(vendor_id = %id, actor = %user.user_id, "vendor updated");
    Ok(ApiResponse::success(
        "Vendor updated",
        vendor,
        Some(Meta::empty()),
    ))
}

pub async fn delete_vendor(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_store_manager(user)?;
    if !state.vendors.delete_vendor(id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!(vendor_id = %id, actor = %user.user_id, "vendor deleted");
    Ok(ApiResponse::success(
        "Vendor deleted",
        json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn update_vendor_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: VendorStatusRequest,
) -> AppResult<ApiResponse<Vendor>> {
    ensure_store_manager(user)?;
    let status = payload.validate()?;
    let mut vendor = load_vendor(state, id).await?;
    vendor.set_status(status, Utc::now());
    save(state, &vendor).await?;

    tracing::info!(vendor_id = %id, %status, "vendor status changed");
    Ok(ApiResponse::success(
        "Vendor status updated",
        vendor,
        Some(Meta::empty()),
    ))
}

pub async fn update_vendor_rating(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: VendorRatingRequest,
) -> AppResult<ApiResponse<Vendor>> {
    ensure_store_manager(user)?;
    let rating = payload.validate()?;
    let mut vendor = load_vendor(state, id).await?;
    vendor.set_rating(rating, Utc::now());
    save(state, &vendor).await?;

    tracing::info!(vendor_id = %id, rating, "vendor rated");
    Ok(ApiResponse::success(
        "Vendor rating updated",
        vendor,
        Some(Meta::empty()),
    ))
}

async fn load_vendor(state: &AppState, id: Uuid) -> AppResult<Vendor> {
    state
        .vendors
        .find_vendor(id)
        .await?
        .ok_or(AppError::NotFound)
}

// a vendor deleted between load and write is reported as missing
async fn save(state: &AppState, vendor: &Vendor) -> AppResult<()> {
    if !state.vendors.update_vendor(vendor).await? {
        return Err(AppError::NotFound);
    }
    Ok(())
}
