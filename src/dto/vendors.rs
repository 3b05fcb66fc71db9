use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{missing, normalize_email, required};
use crate::{
    error::{AppError, AppResult},
    models::{MAX_VENDOR_RATING, NewVendor, VendorPatch, VendorStatus},
};

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateVendorRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub gst_number: Option<String>,
    pub products: Option<Vec<String>>,
    /// `active` (default) or `inactive`.
    pub status: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateVendorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// An empty string clears the GST number.
    pub gst_number: Option<String>,
    pub products: Option<Vec<String>>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VendorStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VendorRatingRequest {
    pub rating: f64,
}

impl CreateVendorRequest {
    pub fn validate(self) -> AppResult<NewVendor> {
        let email = normalize_email("email", &self.email)?;
        if email.is_empty() {
            return Err(missing("email"));
        }
        let products = self
            .products
            .ok_or_else(|| AppError::Validation("products must be an array".into()))?;
        Ok(NewVendor {
            name: required("name", self.name)?,
            email,
            phone: required("phone", self.phone)?,
            address: required("address", self.address)?,
            gst_number: self
                .gst_number
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
            products: clean_products(products),
            status: self
                .status
                .as_deref()
                .map(parse_status)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl UpdateVendorRequest {
    pub fn validate(self) -> AppResult<VendorPatch> {
        let non_empty = |field: &str, value: Option<String>| {
            value
                .map(|v| {
                    required(field, v).map_err(|_| {
                        AppError::Validation(format!("{field} cannot be empty"))
                    })
                })
                .transpose()
        };
        let email = match self.email {
            Some(e) => {
                let email = normalize_email("email", &e)?;
                if email.is_empty() {
                    return Err(AppError::Validation("email cannot be empty".into()));
                }
                Some(email)
            }
            None => None,
        };
        let patch = VendorPatch {
            name: non_empty("name", self.name)?,
            email,
            phone: non_empty("phone", self.phone)?,
            address: non_empty("address", self.address)?,
            gst_number: self.gst_number.map(|g| g.trim().to_string()),
            products: self.products.map(clean_products),
            status: self.status.as_deref().map(parse_status).transpose()?,
        };
        if patch.is_empty() {
            return Err(AppError::Validation("Nothing to update".into()));
        }
        Ok(patch)
    }
}

impl VendorStatusRequest {
    pub fn validate(&self) -> AppResult<VendorStatus> {
        parse_status(&self.status)
    }
}

impl VendorRatingRequest {
    pub fn validate(&self) -> AppResult<f64> {
        if !(0.0..=MAX_VENDOR_RATING).contains(&self.rating) {
            return Err(AppError::Validation(format!(
                "rating must be between 0 and {MAX_VENDOR_RATING}"
            )));
        }
        Ok(self.rating)
    }
}

fn parse_status(value: &str) -> AppResult<VendorStatus> {
    value
        .parse::<VendorStatus>()
        .map_err(|_| AppError::Validation("status must be `active` or `inactive`".into()))
}

fn clean_products(products: Vec<String>) -> Vec<String> {
    products
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
