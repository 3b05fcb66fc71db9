//! Client side of the order console: an HTTP API wrapper and the optimistic
//! order-list cache driven by HOD decisions.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    dto::orders::OrdersPage,
    models::{Order, OrderAction},
};

mod cache;
mod http;

pub use cache::{CacheSnapshot, OrderActionMutation, OrderListCache, apply_optimistic_transition};
pub use http::HttpOrderApi;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("request failed with {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

/// The two server calls the order cache depends on.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn handle_order_action(
        &self,
        id: Uuid,
        action: OrderAction,
        message: Option<&str>,
    ) -> Result<Order, ClientError>;

    async fn list_orders(&self) -> Result<OrdersPage, ClientError>;
}
