use std::sync::Arc;

use crate::{
    config::AppConfig,
    notify::{LogNotifier, Notifier},
    store::{MemoryStore, OrderStore, UserStore, VendorStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orders: Arc<dyn OrderStore>,
    pub users: Arc<dyn UserStore>,
    pub vendors: Arc<dyn VendorStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        orders: Arc<dyn OrderStore>,
        users: Arc<dyn UserStore>,
        vendors: Arc<dyn VendorStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            orders,
            users,
            vendors,
            notifier,
        }
    }

    /// State backed by a fresh in-memory store and a logging notifier.
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store.clone(), store, Arc::new(LogNotifier))
    }
}
