pub mod auth_service;
pub mod lifecycle;
pub mod order_service;
pub mod vendor_service;
