//! In-process backend used for local runs without a database and for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OrderFilter, OrderStore, PageRequest, UserStore, VendorStore, duplicate_vendor_email};
use crate::{
    error::{AppError, AppResult},
    models::{Order, OrderStatus, User, Vendor},
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    vendors: Arc<RwLock<HashMap<Uuid, Vendor>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &Order) -> AppResult<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(AppError::Dependency(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn replace_if_status(&self, order: &Order, expected: OrderStatus) -> AppResult<bool> {
        // check and write happen under one write guard
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id) {
            Some(stored) if stored.status == expected => {
                *stored = order.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_if_status(&self, id: Uuid, expected: OrderStatus) -> AppResult<bool> {
        let mut orders = self.orders.write().await;
        match orders.get(&id) {
            Some(stored) if stored.status == expected => {
                orders.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self, filter: &OrderFilter, page: PageRequest) -> AppResult<(Vec<Order>, i64)> {
        let orders = self.orders.read().await;
        let mut matching: Vec<&Order> = orders.values().filter(|o| filter.matches(o)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Validation("Email is already taken".into()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl VendorStore for MemoryStore {
    async fn insert_vendor(&self, vendor: &Vendor) -> AppResult<()> {
        let mut vendors = self.vendors.write().await;
        if vendors.values().any(|v| v.email == vendor.email) {
            return Err(duplicate_vendor_email());
        }
        vendors.insert(vendor.id, vendor.clone());
        Ok(())
    }

    async fn find_vendor(&self, id: Uuid) -> AppResult<Option<Vendor>> {
        let vendors = self.vendors.read().await;
        Ok(vendors.get(&id).cloned())
    }

    async fn list_vendors(&self) -> AppResult<Vec<Vendor>> {
        let vendors = self.vendors.read().await;
        let mut all: Vec<Vendor> = vendors.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn update_vendor(&self, vendor: &Vendor) -> AppResult<bool> {
        let mut vendors = self.vendors.write().await;
        if vendors
            .values()
            .any(|v| v.id != vendor.id && v.email == vendor.email)
        {
            return Err(duplicate_vendor_email());
        }
        match vendors.get_mut(&vendor.id) {
            Some(stored) => {
                *stored = vendor.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_vendor(&self, id: Uuid) -> AppResult<bool> {
        let mut vendors = self.vendors.write().await;
        Ok(vendors.remove(&id).is_some())
    }
}
