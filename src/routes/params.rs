use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    store::PageRequest,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// Returns `(page, limit, offset)` with page clamped to ≥ 1 and limit to
    /// `1..=MAX_LIMIT`. A page whose offset does not fit an `i64` is a
    /// validation error.
    pub fn normalize(&self) -> AppResult<(i64, i64, i64)> {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| AppError::Validation(format!("page {page} is out of range")))?;
        Ok((page, limit, offset))
    }

    pub fn page_request(&self) -> AppResult<PageRequest> {
        let (_, limit, offset) = self.normalize()?;
        Ok(PageRequest {
            limit: limit as u64,
            offset: offset as u64,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    /// Page number, default 1.
    pub page: Option<i64>,
    /// Orders per page, default 10, at most 100.
    pub limit: Option<i64>,
    /// `pending`, `approved`, `rejected`, `changes_requested` or `quotation_requested`.
    pub status: Option<String>,
    /// Substring of the vendor name.
    pub vendor: Option<String>,
    /// Only honoured for management; HODs always see their own department.
    pub department: Option<String>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}
