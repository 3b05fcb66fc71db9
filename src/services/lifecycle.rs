//! HOD decisions on pending orders.
//!
//! At most one decision ever applies to an order: the write is a
//! compare-and-swap on `status = pending`, so of two racing requests the
//! second one observes `InvalidState` instead of overwriting the first.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::orders::OrderActionRequest,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Order, OrderAction, OrderStatus, Role},
    notify::{Notification, send_best_effort},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn handle_order_action(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: OrderActionRequest,
) -> AppResult<ApiResponse<Order>> {
    let action = OrderAction::from(payload.action.as_str());
    let order = transition_order(state, user, id, action, payload.message.as_deref()).await?;
    Ok(ApiResponse::success(
        "Order status updated",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn transition_order(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
    action: OrderAction,
    message: Option<&str>,
) -> AppResult<Order> {
    let mut order = state
        .orders
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    ensure_role(actor, Role::Hod)?;
    if actor.department != Some(order.department()) {
        return Err(AppError::Forbidden);
    }

    if !order.is_pending() {
        return Err(AppError::InvalidState(format!(
            "Order is already {}",
            order.status
        )));
    }

    order.apply_action(action, message, actor.user_id);
    order.updated_at = Utc::now();

    if !state
        .orders
        .replace_if_status(&order, OrderStatus::Pending)
        .await?
    {
        return Err(swap_failure(state, id).await);
    }

    tracing::info!(
        order_id = %order.id,
        actor = %actor.user_id,
        action = %action,
        status = %order.status,
        "order transitioned"
    );

    spawn_notifications(state, order.clone(), actor.user_id);
    Ok(order)
}

/// Explains why a conditional write on a pending order did not apply.
pub(crate) async fn swap_failure(state: &AppState, id: Uuid) -> AppError {
    match state.orders.find_by_id(id).await {
        Ok(Some(current)) => AppError::InvalidState(format!(
            "Order is already {}",
            current.status
        )),
        Ok(None) => AppError::NotFound,
        Err(err) => err,
    }
}

fn spawn_notifications(state: &AppState, order: Order, actor_id: Uuid) {
    let users = state.users.clone();
    let notifier = state.notifier.clone();
    let from = state.config.mail_from.clone();

    tokio::spawn(async move {
        match users.find_user_by_id(order.created_by).await {
            Ok(Some(recipient)) => {
                let notification = Notification::StatusChanged {
                    order: order.clone(),
                    recipient,
                };
                send_best_effort(notifier.as_ref(), &from, notification).await;
            }
            Ok(None) => tracing::warn!(order_id = %order.id, "order creator not found"),
            Err(err) => tracing::warn!(error = %err, order_id = %order.id, "creator lookup failed"),
        }

        if order.status != OrderStatus::QuotationRequested {
            return;
        }
        match users.find_user_by_id(actor_id).await {
            Ok(Some(requested_by)) => {
                let notification = Notification::QuotationRequest {
                    order,
                    requested_by,
                };
                send_best_effort(notifier.as_ref(), &from, notification).await;
            }
            Ok(None) => tracing::warn!(actor = %actor_id, "approver not found"),
            Err(err) => tracing::warn!(error = %err, actor = %actor_id, "approver lookup failed"),
        }
    });
}
