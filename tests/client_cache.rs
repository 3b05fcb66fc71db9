mod common;

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use common::{Harness, SECRET};
use store_procurement_api::{
    client::{
        ClientError, HttpOrderApi, OrderActionMutation, OrderApi, OrderListCache,
        apply_optimistic_transition,
    },
    dto::orders::OrdersPage,
    middleware::auth::issue_token,
    models::{Order, OrderAction, OrderStatus},
    routes::create_app,
};

/// Answers calls from queued responses and counts refetches.
#[derive(Default)]
struct ScriptedApi {
    actions: Mutex<VecDeque<Result<Order, ClientError>>>,
    pages: Mutex<VecDeque<Result<OrdersPage, ClientError>>>,
    refetches: Mutex<usize>,
}

impl ScriptedApi {
    fn action(self, result: Result<Order, ClientError>) -> Self {
        self.actions.lock().unwrap().push_back(result);
        self
    }

    fn page(self, result: Result<OrdersPage, ClientError>) -> Self {
        self.pages.lock().unwrap().push_back(result);
        self
    }
}

#[async_trait]
impl OrderApi for ScriptedApi {
    async fn handle_order_action(
        &self,
        _id: Uuid,
        _action: OrderAction,
        _message: Option<&str>,
    ) -> Result<Order, ClientError> {
        self.actions
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected action call")
    }

    async fn list_orders(&self) -> Result<OrdersPage, ClientError> {
        *self.refetches.lock().unwrap() += 1;
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected list call")
    }
}

fn rejected(status: u16) -> ClientError {
    ClientError::Api {
        status,
        message: "Invalid state: Order is already approved".into(),
    }
}

async fn cached_orders(h: &Harness) -> OrderListCache {
    let mut orders = Vec::new();
    for _ in 0..3 {
        orders.push(h.pending_order().await);
    }
    OrderListCache {
        total_orders: orders.len() as i64,
        orders,
    }
}

#[tokio::test]
async fn server_rejection_restores_exact_snapshot() {
    let h = Harness::new().await;
    let mut cache = cached_orders(&h).await;
    let before = cache.clone();
    let target = cache.orders[1].id;

    let mutation = OrderActionMutation::new(
        ScriptedApi::default()
            .action(Err(rejected(400)))
            .page(Err(rejected(503))),
    );
    let err = mutation
        .execute(&mut cache, target, OrderAction::Approve, None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(cache, before);
    assert_eq!(*mutation.api().refetches.lock().unwrap(), 1);
}

#[tokio::test]
async fn success_takes_server_order_then_refetches() {
    let h = Harness::new().await;
    let mut cache = cached_orders(&h).await;
    let target = cache.orders[0].clone();

    let mut server_order = target.clone();
    server_order.apply_action(OrderAction::RequestChanges, Some("split by lab"), h.hod.id);

    let mut refreshed = cache.orders.clone();
    refreshed[0] = server_order.clone();
    refreshed.pop();

    let mutation = OrderActionMutation::new(
        ScriptedApi::default()
            .action(Ok(server_order.clone()))
            .page(Ok(OrdersPage {
                orders: refreshed.clone(),
                total_orders: 2,
            })),
    );
    let result = mutation
        .execute(&mut cache, target.id, OrderAction::RequestChanges, Some("split by lab"))
        .await
        .unwrap();

    assert_eq!(result, server_order);
    assert_eq!(cache.orders, refreshed);
    assert_eq!(cache.total_orders, 2);
    assert_eq!(cache.get(target.id).and_then(|o| o.approved_by), Some(h.hod.id));
}

#[tokio::test]
async fn failed_refetch_keeps_reconciled_entry() {
    let h = Harness::new().await;
    let mut cache = cached_orders(&h).await;
    let target = cache.orders[2].clone();

    let mut server_order = target.clone();
    server_order.apply_action(OrderAction::Reject, None, h.hod.id);

    let mutation = OrderActionMutation::new(
        ScriptedApi::default()
            .action(Ok(server_order.clone()))
            .page(Err(rejected(500))),
    );
    mutation
        .execute(&mut cache, target.id, OrderAction::Reject, None)
        .await
        .unwrap();

    assert_eq!(cache.get(target.id), Some(&server_order));
    assert_eq!(cache.total_orders, 3);
}

#[tokio::test]
async fn optimistic_entry_uses_placeholder_approver() {
    let h = Harness::new().await;
    let mut cache = cached_orders(&h).await;
    let target = cache.orders[0].id;

    let snapshot = cache.apply_optimistic(target, OrderAction::QuotationRequested, None);
    let optimistic = cache.get(target).unwrap();
    assert_eq!(optimistic.status, OrderStatus::QuotationRequested);
    assert_eq!(optimistic.approved_by, Some(Uuid::nil()));
    assert_eq!(
        optimistic,
        &apply_optimistic_transition(&cache.orders[0], OrderAction::QuotationRequested, None)
    );

    cache.restore(snapshot);
    assert_eq!(cache.get(target).map(|o| o.status), Some(OrderStatus::Pending));
}

#[tokio::test]
async fn http_client_against_running_server() {
    let h = Harness::new().await;
    let order = h.pending_order().await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app(h.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let token = issue_token(&h.hod, SECRET, 1).unwrap();
    let mutation = OrderActionMutation::new(HttpOrderApi::new(format!("http://{addr}/"), token));

    let mut cache: OrderListCache = mutation.api().list_orders().await.unwrap().into();
    assert_eq!(cache.total_orders, 1);

    let approved = mutation
        .execute(&mut cache, order.id, OrderAction::Approve, None)
        .await
        .unwrap();
    assert_eq!(approved.status, OrderStatus::Approved);
    assert_eq!(approved.approved_by, Some(h.hod.id));
    assert_eq!(cache.get(order.id), Some(&approved));

    let err = mutation
        .execute(&mut cache, order.id, OrderAction::Reject, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 400, .. }));
    assert_eq!(cache.get(order.id), Some(&approved));
}
