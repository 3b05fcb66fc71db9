use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{missing, normalize_email, required};
use crate::{
    error::{AppError, AppResult},
    models::{
        Department, GinDetails, NewOrder, Order, OrderItem, OrderLines, OrderPatch, VendorDetails,
    },
};

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GinDetailsInput {
    pub gin_number: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub date: String,
    pub department: String,
    pub bill_number: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorDetailsInput {
    pub name: String,
    pub contact_number: String,
    pub gstin: String,
    pub address: String,
    pub email: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItemInput {
    pub name: String,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    #[schema(value_type = Option<f64>)]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderRequest {
    pub gin_details: Option<GinDetailsInput>,
    pub vendor_details: Option<VendorDetailsInput>,
    pub items: Option<Vec<OrderItemInput>>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOrderRequest {
    pub gin_details: Option<GinDetailsInput>,
    pub vendor_details: Option<VendorDetailsInput>,
    pub items: Option<Vec<OrderItemInput>>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct OrderActionRequest {
    /// `approve`, `reject`, `quotation_requested` or `request_changes`.
    pub action: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    pub total_orders: i64,
}

impl CreateOrderRequest {
    pub fn validate(self) -> AppResult<NewOrder> {
        let gin_details = self
            .gin_details
            .ok_or_else(|| missing("ginDetails"))?
            .validate()?;
        let vendor_details = self
            .vendor_details
            .ok_or_else(|| missing("vendorDetails"))?
            .validate()?;
        let items = validate_items(self.items.ok_or_else(|| missing("items"))?)?;
        Ok(NewOrder {
            gin_details,
            vendor_details,
            items,
        })
    }
}

impl UpdateOrderRequest {
    pub fn validate(self) -> AppResult<OrderPatch> {
        let patch = OrderPatch {
            gin_details: self.gin_details.map(GinDetailsInput::validate).transpose()?,
            vendor_details: self
                .vendor_details
                .map(VendorDetailsInput::validate)
                .transpose()?,
            items: self.items.map(validate_items).transpose()?,
        };
        if patch.gin_details.is_none() && patch.vendor_details.is_none() && patch.items.is_none() {
            return Err(AppError::Validation("Nothing to update".into()));
        }
        Ok(patch)
    }
}

impl GinDetailsInput {
    pub fn validate(self) -> AppResult<GinDetails> {
        let department = required("ginDetails.department", self.department)?;
        let department = department.parse::<Department>().map_err(|_| {
            let allowed: Vec<&str> = Department::ALL.iter().map(Department::as_str).collect();
            AppError::Validation(format!(
                "ginDetails.department must be one of: {}",
                allowed.join(", ")
            ))
        })?;
        Ok(GinDetails {
            gin_number: required("ginDetails.ginNumber", self.gin_number)?,
            date: parse_date(&required("ginDetails.date", self.date)?)?,
            department,
            bill_number: required("ginDetails.billNumber", self.bill_number)?,
        })
    }
}

impl VendorDetailsInput {
    pub fn validate(self) -> AppResult<VendorDetails> {
        let email = self
            .email
            .map(|e| normalize_email("vendorDetails.email", &e))
            .transpose()?
            .filter(|e| !e.is_empty());
        Ok(VendorDetails {
            name: required("vendorDetails.name", self.name)?,
            contact_number: required("vendorDetails.contactNumber", self.contact_number)?,
            gstin: required("vendorDetails.gstin", self.gstin)?,
            address: required("vendorDetails.address", self.address)?,
            email,
        })
    }
}

fn validate_items(items: Vec<OrderItemInput>) -> AppResult<OrderLines> {
    if items.is_empty() {
        return Err(AppError::Validation(
            "Order must include at least one item".into(),
        ));
    }
    let items = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let name = required(&format!("items[{i}].name"), item.name)?;
            let quantity = item
                .quantity
                .ok_or_else(|| missing(&format!("items[{i}].quantity")))?;
            let quantity = i32::try_from(quantity)
                .ok()
                .filter(|q| *q >= 1)
                .ok_or_else(|| {
                    AppError::Validation(format!("items[{i}].quantity must be at least 1"))
                })?;
            let unit_price = item
                .unit_price
                .ok_or_else(|| missing(&format!("items[{i}].unitPrice")))?;
            if unit_price < Decimal::ZERO {
                return Err(AppError::Validation(format!(
                    "items[{i}].unitPrice must not be negative"
                )));
            }
            Ok(OrderItem {
                name,
                description: item.description.map(|d| d.trim().to_string()).unwrap_or_default(),
                quantity,
                unit_price,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    OrderLines::new(items).map_err(|e| AppError::Validation(e.to_string()))
}

fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::Validation("ginDetails.date must be a date (YYYY-MM-DD)".into()))
}
