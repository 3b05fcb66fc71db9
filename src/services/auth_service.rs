use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, issue_token},
    models::{Department, Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        full_name,
        email,
        password,
        role,
        department,
    } = payload;

    let full_name = full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(AppError::Validation("fullName is required".into()));
    }
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    let role = role
        .parse::<Role>()
        .map_err(|_| AppError::Validation("Invalid role".into()))?;
    let department = department
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            d.parse::<Department>()
                .map_err(|_| AppError::Validation(format!("Invalid department `{d}`")))
        })
        .transpose()?;
    if role == Role::Hod && department.is_none() {
        return Err(AppError::Validation(
            "Department is required for HOD accounts".into(),
        ));
    }

    if state.users.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Validation("Email is already taken".into()));
    }

    let user = User {
        id: Uuid::new_v4(),
        full_name,
        email,
        password_hash: hash_password(&password)?,
        role,
        department,
        created_at: Utc::now(),
    };
    state.users.insert_user(&user).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(ApiResponse::success("User created", user, Some(Meta::empty())))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let user = match state.users.find_user_by_email(&email).await? {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid email or password".into())),
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let token = issue_token(&user, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token, user },
        Some(Meta::empty()),
    ))
}

pub async fn current_user(state: &AppState, auth: &AuthUser) -> AppResult<ApiResponse<User>> {
    let user = state
        .users
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Profile", user, Some(Meta::empty())))
}
