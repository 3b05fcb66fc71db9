pub mod orders;
pub mod users;
pub mod vendors;

pub use orders::Entity as Orders;
pub use users::Entity as Users;
pub use vendors::Entity as Vendors;
