//! Persistence boundary for orders, users and vendors.
//!
//! Services only see the [`OrderStore`], [`UserStore`] and [`VendorStore`]
//! traits. Backends
//! must implement the conditional writes atomically: a swap either applies in
//! full while the stored status still matches, or leaves the document as it
//! was and reports `false`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Department, Order, OrderStatus, User, Vendor},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Substring of the vendor name.
    pub vendor: Option<String>,
    pub department: Option<Department>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| order.status == s)
            && self
                .department
                .is_none_or(|d| order.department() == d)
            && self
                .vendor
                .as_deref()
                .is_none_or(|v| order.vendor_details.name.contains(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Overwrites the stored order only if its status is still `expected`.
    async fn replace_if_status(&self, order: &Order, expected: OrderStatus) -> AppResult<bool>;

    /// Removes the order only if its status is still `expected`.
    async fn delete_if_status(&self, id: Uuid, expected: OrderStatus) -> AppResult<bool>;

    /// Matching orders, newest first, plus the total number of matches.
    async fn list(&self, filter: &OrderFilter, page: PageRequest) -> AppResult<(Vec<Order>, i64)>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> AppResult<()>;

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait VendorStore: Send + Sync {
    /// Fails with a validation error when the email is already registered.
    async fn insert_vendor(&self, vendor: &Vendor) -> AppResult<()>;

    async fn find_vendor(&self, id: Uuid) -> AppResult<Option<Vendor>>;

    /// All vendors ordered by name.
    async fn list_vendors(&self) -> AppResult<Vec<Vendor>>;

    /// Overwrites a stored vendor. Returns `false` when it no longer exists
    /// and fails like [`VendorStore::insert_vendor`] on an email clash.
    async fn update_vendor(&self, vendor: &Vendor) -> AppResult<bool>;

    async fn delete_vendor(&self, id: Uuid) -> AppResult<bool>;
}

pub(crate) fn duplicate_vendor_email() -> AppError {
    AppError::Validation("A vendor with this email already exists".into())
}
