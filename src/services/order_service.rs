use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrdersPage, UpdateOrderRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_store_manager},
    models::{Department, Order, OrderStatus, Role},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::lifecycle::swap_failure,
    state::AppState,
    store::{OrderFilter, PageRequest},
};

pub const RECENT_ORDERS: u64 = 3;

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_store_manager(user)?;
    let draft = payload.validate()?;

    let order = Order::create(draft, user.user_id, Utc::now());
    state.orders.insert(&order).await?;

    tracing::info!(
        order_id = %order.id,
        created_by = %user.user_id,
        total_price = %order.total_price,
        "order created"
    );

    Ok(ApiResponse::success(
        "Order created successfully",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = load_order(state, id).await?;
    if user.role == Role::Hod && user.department != Some(order.department()) {
        return Err(AppError::Forbidden);
    }
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_store_manager(user)?;
    let mut order = load_order(state, id).await?;
    ensure_editable(user, &order)?;

    let patch = payload.validate()?;
    order.apply_patch(patch, Utc::now());

    if !state
        .orders
        .replace_if_status(&order, OrderStatus::Pending)
        .await?
    {
        return Err(swap_failure(state, id).await);
    }

    tracing::info!(order_id = %order.id, actor = %user.user_id, "order updated");
    Ok(ApiResponse::success(
        "Order updated",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_store_manager(user)?;
    let order = load_order(state, id).await?;
    ensure_editable(user, &order)?;

    if !state
        .orders
        .delete_if_status(id, OrderStatus::Pending)
        .await?
    {
        return Err(swap_failure(state, id).await);
    }

    tracing::info!(order_id = %id, actor = %user.user_id, "order deleted");
    Ok(ApiResponse::success(
        "Order deleted",
        json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrdersPage>> {
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<OrderStatus>()
                .map_err(|_| AppError::Validation(format!("Invalid status `{s}`")))
        })
        .transpose()?;

    let filter = OrderFilter {
        status,
        vendor: query
            .vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        department: visible_department(user, query.department.as_deref())?,
    };

    let pagination = query.pagination();
    let (page, limit, _) = pagination.normalize()?;
    let (orders, total) = state.orders.list(&filter, pagination.page_request()?).await?;

    Ok(ApiResponse::success(
        "Orders",
        OrdersPage {
            orders,
            total_orders: total,
        },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn recent_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let filter = OrderFilter {
        department: visible_department(user, None)?,
        ..Default::default()
    };
    let page = PageRequest {
        limit: RECENT_ORDERS,
        offset: 0,
    };
    let (orders, _) = state.orders.list(&filter, page).await?;
    Ok(ApiResponse::success(
        "Recent orders",
        orders,
        Some(Meta::empty()),
    ))
}

/// Department restriction for a listing. HODs are pinned to their own
/// department whatever they ask for; only management may pick one.
fn visible_department(
    user: &AuthUser,
    requested: Option<&str>,
) -> AppResult<Option<Department>> {
    match user.role {
        Role::Hod => user.department.map(Some).ok_or(AppError::Forbidden),
        Role::Management => requested
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| {
                d.parse::<Department>()
                    .map_err(|_| AppError::Validation(format!("Invalid department `{d}`")))
            })
            .transpose(),
        Role::StoreManager => Ok(None),
    }
}

fn ensure_editable(user: &AuthUser, order: &Order) -> AppResult<()> {
    if order.created_by != user.user_id {
        return Err(AppError::Forbidden);
    }
    if !order.is_pending() {
        return Err(AppError::InvalidState(format!(
            "Cannot modify an order that is {}",
            order.status
        )));
    }
    Ok(())
}

async fn load_order(state: &AppState, id: Uuid) -> AppResult<Order> {
    state
        .orders
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)
}
