use async_trait::async_trait;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{ClientError, OrderApi};
use crate::{
    dto::orders::{OrderActionRequest, OrdersPage},
    models::{Order, OrderAction},
    response::ApiResponse,
};

/// [`OrderApi`] over the `/api/orders` routes, authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpOrderApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpOrderApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

/// Unwraps the `{message, data, meta}` envelope, turning error statuses into
/// [`ClientError::Api`] with the server's message.
async fn read_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let message = match resp.json::<ApiResponse<serde_json::Value>>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body: ApiResponse<T> = resp.json().await?;
    match body.data {
        Some(data) => Ok(data),
        None => Err(ClientError::Api {
            status: status.as_u16(),
            message: format!("response without data: {}", body.message),
        }),
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn handle_order_action(
        &self,
        id: Uuid,
        action: OrderAction,
        message: Option<&str>,
    ) -> Result<Order, ClientError> {
        let payload = OrderActionRequest {
            action: action.as_str().to_string(),
            message: message.map(str::to_string),
        };
        let resp = self
            .client
            .patch(self.url(&format!("/orders/{id}/action")))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;
        read_envelope(resp).await
    }

    async fn list_orders(&self) -> Result<OrdersPage, ClientError> {
        let resp = self
            .client
            .get(self.url("/orders"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        read_envelope(resp).await
    }
}
