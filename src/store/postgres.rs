//! PostgreSQL backend over sea-orm. Orders keep their line items in a JSONB
//! column so each order stays a single row and every conditional write is a
//! single-statement `UPDATE`/`DELETE` guarded on `status`.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use super::{OrderFilter, OrderStore, PageRequest, UserStore, VendorStore, duplicate_vendor_email};
use crate::{
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
        vendors::{
            ActiveModel as VendorActive, Column as VendorCol, Entity as Vendors,
            Model as VendorModel,
        },
    },
    error::{AppError, AppResult},
    models::{
        Department, GinDetails, Order, OrderItem, OrderStatus, Role, User, Vendor, VendorDetails,
        VendorStatus,
    },
};

/// Substring `LIKE` pattern that treats `%`, `_` and `\` in `needle` as
/// literal characters, matching the in-memory `str::contains` filter.
fn contains_pattern(needle: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

#[derive(Clone)]
pub struct PgStore {
    orm: DatabaseConnection,
}

impl PgStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.orm
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert(&self, order: &Order) -> AppResult<()> {
        Orders::insert(order_to_active(order)?)
            .exec_without_returning(&self.orm)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        Orders::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(order_from_entity)
            .transpose()
    }

    async fn replace_if_status(&self, order: &Order, expected: OrderStatus) -> AppResult<bool> {
        let mut active = order_to_active(order)?;
        active.id = NotSet;
        active.created_by = NotSet;
        active.created_at = NotSet;

        let result = Orders::update_many()
            .set(active)
            .filter(OrderCol::Id.eq(order.id))
            .filter(OrderCol::Status.eq(expected.as_str()))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn delete_if_status(&self, id: Uuid, expected: OrderStatus) -> AppResult<bool> {
        let result = Orders::delete_many()
            .filter(OrderCol::Id.eq(id))
            .filter(OrderCol::Status.eq(expected.as_str()))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn list(&self, filter: &OrderFilter, page: PageRequest) -> AppResult<(Vec<Order>, i64)> {
        let mut condition = Condition::all();
        if let Some(status) = filter.status {
            condition = condition.add(OrderCol::Status.eq(status.as_str()));
        }
        if let Some(department) = filter.department {
            condition = condition.add(OrderCol::Department.eq(department.as_str()));
        }
        if let Some(vendor) = filter.vendor.as_deref() {
            condition = condition.add(OrderCol::VendorName.like(contains_pattern(vendor)));
        }

        let finder = Orders::find()
            .filter(condition)
            .order_by_desc(OrderCol::CreatedAt)
            .order_by_desc(OrderCol::Id);

        let total = finder.clone().count(&self.orm).await? as i64;

        let orders = finder
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((orders, total))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let active = UserActive {
            id: Set(user.id),
            full_name: Set(user.full_name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(user.role.as_str().to_string()),
            department: Set(user.department.map(|d| d.as_str().to_string())),
            created_at: Set(user.created_at.into()),
        };
        Users::insert(active).exec_without_returning(&self.orm).await?;
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Users::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(user_from_entity)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Users::find()
            .filter(UserCol::Email.eq(email))
            .one(&self.orm)
            .await?
            .map(user_from_entity)
            .transpose()
    }
}

#[async_trait]
impl VendorStore for PgStore {
    async fn insert_vendor(&self, vendor: &Vendor) -> AppResult<()> {
        Vendors::insert(vendor_to_active(vendor)?)
            .exec_without_returning(&self.orm)
            .await
            .map_err(vendor_write_error)?;
        Ok(())
    }

    async fn find_vendor(&self, id: Uuid) -> AppResult<Option<Vendor>> {
        Vendors::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(vendor_from_entity)
            .transpose()
    }

    async fn list_vendors(&self) -> AppResult<Vec<Vendor>> {
        Vendors::find()
            .order_by_asc(VendorCol::Name)
            .order_by_asc(VendorCol::Id)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(vendor_from_entity)
            .collect()
    }

    async fn update_vendor(&self, vendor: &Vendor) -> AppResult<bool> {
        let mut active = vendor_to_active(vendor)?;
        active.id = NotSet;
        active.created_at = NotSet;

        let result = Vendors::update_many()
            .set(active)
            .filter(VendorCol::Id.eq(vendor.id))
            .exec(&self.orm)
            .await
            .map_err(vendor_write_error)?;
        Ok(result.rows_affected == 1)
    }

    async fn delete_vendor(&self, id: Uuid) -> AppResult<bool> {
        let result = Vendors::delete_many()
            .filter(VendorCol::Id.eq(id))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected == 1)
    }
}

fn vendor_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate_vendor_email(),
        _ => err.into(),
    }
}

fn vendor_to_active(vendor: &Vendor) -> AppResult<VendorActive> {
    let products =
        serde_json::to_value(&vendor.products).map_err(|e| AppError::Internal(e.into()))?;
    Ok(VendorActive {
        id: Set(vendor.id),
        name: Set(vendor.name.clone()),
        email: Set(vendor.email.clone()),
        phone: Set(vendor.phone.clone()),
        address: Set(vendor.address.clone()),
        gst_number: Set(vendor.gst_number.clone()),
        products: Set(products),
        rating: Set(vendor.rating),
        total_orders: Set(vendor.total_orders),
        status: Set(vendor.status.as_str().to_string()),
        created_at: Set(vendor.created_at.into()),
        updated_at: Set(vendor.updated_at.into()),
    })
}

fn vendor_from_entity(model: VendorModel) -> AppResult<Vendor> {
    let products: Vec<String> = serde_json::from_value(model.products).map_err(|e| {
        AppError::Internal(anyhow!("vendor {} has corrupt products: {e}", model.id))
    })?;
    let status = model
        .status
        .parse::<VendorStatus>()
        .map_err(|e| AppError::Internal(anyhow!("vendor {}: {e}", model.id)))?;

    Ok(Vendor {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        gst_number: model.gst_number,
        products,
        rating: model.rating,
        total_orders: model.total_orders,
        status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn order_to_active(order: &Order) -> AppResult<OrderActive> {
    let items =
        serde_json::to_value(&order.items).map_err(|e| AppError::Internal(e.into()))?;
    let gin = &order.gin_details;
    let vendor = &order.vendor_details;
    Ok(OrderActive {
        id: Set(order.id),
        gin_number: Set(gin.gin_number.clone()),
        gin_date: Set(gin.date),
        department: Set(gin.department.as_str().to_string()),
        bill_number: Set(gin.bill_number.clone()),
        vendor_name: Set(vendor.name.clone()),
        vendor_contact_number: Set(vendor.contact_number.clone()),
        vendor_gstin: Set(vendor.gstin.clone()),
        vendor_address: Set(vendor.address.clone()),
        vendor_email: Set(vendor.email.clone()),
        items: Set(items),
        total_price: Set(order.total_price),
        status: Set(order.status.as_str().to_string()),
        requested_changes: Set(order.requested_changes.clone()),
        created_by: Set(order.created_by),
        approved_by: Set(order.approved_by),
        created_at: Set(order.created_at.into()),
        updated_at: Set(order.updated_at.into()),
    })
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let items: Vec<OrderItem> = serde_json::from_value(model.items)
        .map_err(|e| AppError::Internal(anyhow!("order {} has corrupt items: {e}", model.id)))?;
    let department = model
        .department
        .parse::<Department>()
        .map_err(|e| AppError::Internal(anyhow!("order {}: {e}", model.id)))?;
    let status = model
        .status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::Internal(anyhow!("order {}: {e}", model.id)))?;

    Ok(Order {
        id: model.id,
        gin_details: GinDetails {
            gin_number: model.gin_number,
            date: model.gin_date,
            department,
            bill_number: model.bill_number,
        },
        vendor_details: VendorDetails {
            name: model.vendor_name,
            contact_number: model.vendor_contact_number,
            gstin: model.vendor_gstin,
            address: model.vendor_address,
            email: model.vendor_email,
        },
        items,
        total_price: model.total_price,
        status,
        requested_changes: model.requested_changes,
        created_by: model.created_by,
        approved_by: model.approved_by,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn user_from_entity(model: UserModel) -> AppResult<User> {
    let role = model
        .role
        .parse::<Role>()
        .map_err(|e| AppError::Internal(anyhow!("user {}: {e}", model.id)))?;
    let department = model
        .department
        .as_deref()
        .map(str::parse::<Department>)
        .transpose()
        .map_err(|e| AppError::Internal(anyhow!("user {}: {e}", model.id)))?;

    Ok(User {
        id: model.id,
        full_name: model.full_name,
        email: model.email,
        password_hash: model.password_hash,
        role,
        department,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    #[test]
    fn vendor_pattern_escapes_like_wildcards() {
        let sql = Orders::find()
            .filter(OrderCol::VendorName.like(contains_pattern(r"50%_off\")))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(sql.contains(r"50\%"), "{sql}");
        assert!(sql.contains(r"\_off"), "{sql}");
        assert!(!sql.contains("'%50%_off"), "{sql}");
    }
}
