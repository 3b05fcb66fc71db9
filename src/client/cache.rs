use uuid::Uuid;

use super::{ClientError, OrderApi};
use crate::{
    dto::orders::OrdersPage,
    models::{Order, OrderAction},
};

/// Mirrors a server-side HOD decision on a cached copy of `order`.
///
/// Uses the same action table as the lifecycle service; the approver is the
/// nil UUID until the server's answer replaces the entry.
pub fn apply_optimistic_transition(order: &Order, action: OrderAction, message: Option<&str>) -> Order {
    let mut next = order.clone();
    next.apply_action(action, message, Uuid::nil());
    next
}

/// The cached `orders` listing as the console last saw it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderListCache {
    pub orders: Vec<Order>,
    pub total_orders: i64,
}

/// A verbatim copy of the cache taken before an optimistic write.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot(OrderListCache);

impl From<OrdersPage> for OrderListCache {
    fn from(page: OrdersPage) -> Self {
        Self {
            orders: page.orders,
            total_orders: page.total_orders,
        }
    }
}

impl OrderListCache {
    pub fn get(&self, id: Uuid) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot(self.clone())
    }

    pub fn restore(&mut self, snapshot: CacheSnapshot) {
        *self = snapshot.0;
    }

    /// Snapshots the cache, then rewrites the target order as if `action`
    /// had already succeeded. An order that is not cached is left alone.
    pub fn apply_optimistic(
        &mut self,
        id: Uuid,
        action: OrderAction,
        message: Option<&str>,
    ) -> CacheSnapshot {
        let snapshot = self.snapshot();
        if let Some(slot) = self.orders.iter_mut().find(|o| o.id == id) {
            *slot = apply_optimistic_transition(slot, action, message);
        }
        snapshot
    }

    /// Swaps in `order` for the entry with the same id. Returns whether an
    /// entry was found.
    pub fn replace(&mut self, order: Order) -> bool {
        match self.orders.iter_mut().find(|o| o.id == order.id) {
            Some(slot) => {
                *slot = order;
                true
            }
            None => false,
        }
    }
}

/// Runs an HOD decision against the server while keeping `OrderListCache`
/// responsive: the cache shows the expected outcome immediately and is
/// reconciled once the server answers.
pub struct OrderActionMutation<A> {
    api: A,
}

impl<A: OrderApi> OrderActionMutation<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Reloads the listing. On failure the cache keeps whatever it holds.
    pub async fn refetch(&self, cache: &mut OrderListCache) {
        match self.api.list_orders().await {
            Ok(page) => *cache = page.into(),
            Err(err) => tracing::warn!(error = %err, "order list refetch failed"),
        }
    }

    pub async fn execute(
        &self,
        cache: &mut OrderListCache,
        id: Uuid,
        action: OrderAction,
        message: Option<&str>,
    ) -> Result<Order, ClientError> {
        let snapshot = cache.apply_optimistic(id, action, message);

        let result = self.api.handle_order_action(id, action, message).await;
        match &result {
            Ok(order) => {
                cache.replace(order.clone());
            }
            Err(err) => {
                tracing::warn!(order_id = %id, action = %action, error = %err, "order action failed, rolling back");
                cache.restore(snapshot);
            }
        }

        self.refetch(cache).await;
        result
    }
}
