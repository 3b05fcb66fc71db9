#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use store_procurement_api::{
    config::AppConfig,
    dto::orders::CreateOrderRequest,
    middleware::auth::{AuthUser, issue_token},
    models::{Department, Order, Role, User},
    notify::{EmailMessage, Notifier},
    services::order_service,
    state::AppState,
    store::MemoryStore,
};

pub const SECRET: &str = "integration-test-secret";

/// Captures every delivered message.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Notifications are delivered on a detached task, so poll for them.
    pub async fn wait_for(&self, count: usize) -> Vec<EmailMessage> {
        for _ in 0..100 {
            let sent = self.messages();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.messages()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, message: &EmailMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _message: &EmailMessage) -> anyhow::Result<()> {
        anyhow::bail!("mail relay down")
    }
}

pub struct Harness {
    pub state: AppState,
    pub notifier: RecordingNotifier,
    pub manager: User,
    pub other_manager: User,
    pub hod: User,
    pub civil_hod: User,
    pub management: User,
}

impl Harness {
    pub async fn new() -> Self {
        let notifier = RecordingNotifier::default();
        Self::with_notifier(notifier.clone(), notifier).await
    }

    pub async fn with_notifier(notifier: RecordingNotifier, delivering: impl Notifier + 'static) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            AppConfig::for_tests(SECRET),
            store.clone(),
            store.clone(),
            store,
            Arc::new(delivering),
        );

        let manager = user("Store Manager", "manager@college.edu", Role::StoreManager, None);
        let other_manager = user("Second Manager", "manager2@college.edu", Role::StoreManager, None);
        let hod = user(
            "Mechanical HOD",
            "hod.mech@college.edu",
            Role::Hod,
            Some(Department::Mechanical),
        );
        let civil_hod = user("Civil HOD", "hod.civil@college.edu", Role::Hod, Some(Department::Civil));
        let management = user("Principal", "principal@college.edu", Role::Management, None);
        for u in [&manager, &other_manager, &hod, &civil_hod, &management] {
            state.users.insert_user(u).await.unwrap();
        }

        Self {
            state,
            notifier,
            manager,
            other_manager,
            hod,
            civil_hod,
            management,
        }
    }

    /// A pending Mechanical order created by `manager`.
    pub async fn pending_order(&self) -> Order {
        order_service::create_order(
            &self.state,
            &auth(&self.manager),
            create_request("Mechanical", json!([{ "name": "Pen", "quantity": 10, "unitPrice": 2 }])),
        )
        .await
        .unwrap()
        .into_data()
        .unwrap()
    }
}

pub fn user(full_name: &str, email: &str, role: Role, department: Option<Department>) -> User {
    User {
        id: Uuid::new_v4(),
        full_name: full_name.into(),
        email: email.into(),
        password_hash: String::new(),
        role,
        department,
        created_at: Utc::now(),
    }
}

pub fn auth(user: &User) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: user.role,
        department: user.department,
    }
}

pub fn create_body(department: &str, items: Value) -> Value {
    json!({
        "ginDetails": {
            "ginNumber": "GIN-2024-001",
            "date": "2024-03-28",
            "department": department,
            "billNumber": "BILL-17"
        },
        "vendorDetails": {
            "name": "Shree Stationers",
            "contactNumber": "9876543210",
            "gstin": "27AAPFU0939F1ZV",
            "address": "Shivaji Nagar, Pune",
            "email": "sales@shree.test"
        },
        "items": items
    })
}

pub fn create_request(department: &str, items: Value) -> CreateOrderRequest {
    serde_json::from_value(create_body(department, items)).unwrap()
}

pub fn token(user: &User) -> String {
    issue_token(user, SECRET, 1).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}
