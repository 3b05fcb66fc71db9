use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Department, Role, User};

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    /// `store_manager` (or `manager`), `hod` or `management`.
    pub role: String,
    /// Required for HODs.
    pub department: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub department: Option<Department>,
    pub exp: usize,
}
