// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signup, login, and current-user routes.

use std::sync::LazyLock;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::Argon2;
use axum::extract::State;
use axum::{Extension, Json};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;
use vidya_core::VidyaError;
use vidya_storage::queries::users;
use vidya_storage::{User, now_rfc3339};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "class")]
    pub class_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public shape of a user, without the password hash.
#[derive(Debug, Serialize)]
pub struct UserBody {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserBody,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            class_name: user.class_name.clone(),
        }
    }
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if body.name.trim().is_empty()
        || body.email.trim().is_empty()
        || body.password.is_empty()
        || body.class_name.trim().is_empty()
    {
        return Err(VidyaError::Validation(
            "name, email, password and class are required".to_string(),
        )
        .into());
    }
    let email = body.email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(VidyaError::Validation("invalid email address".to_string()).into());
    }
    if body.password.len() < 6 {
        return Err(
            VidyaError::Validation("password must be at least 6 characters".to_string()).into(),
        );
    }
    if !state.syllabus.class_names().contains(&body.class_name.as_str()) {
        return Err(VidyaError::Validation(format!(
            "unknown class: {}",
            body.class_name
        ))
        .into());
    }

    if users::get_user_by_email(&state.db, &email).await?.is_some() {
        return Err(VidyaError::Validation(
            "a user with this email already exists".to_string(),
        )
        .into());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(body.password.as_bytes(), &salt)
        .map_err(|e| VidyaError::Internal(format!("password hashing failed: {e}")))?
        .to_string();

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        email,
        password_hash,
        class_name: body.class_name,
        avatar: String::new(),
        role: "user".to_string(),
        created_at: now_rfc3339(),
    };
    users::create_user(&state.db, &user).await?;
    info!(user_id = %user.id, class = %user.class_name, "user registered");

    Ok(Json(AuthResponse {
        success: true,
        token: state.auth.keys.issue(&user.id),
        user: UserBody::from(&user),
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(
            VidyaError::Validation("email and password are required".to_string()).into(),
        );
    }

    let email = body.email.trim().to_lowercase();
    let user = users::get_user_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| VidyaError::Unauthorized("invalid credentials".to_string()))?;

    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|e| VidyaError::Internal(format!("stored hash unreadable: {e}")))?;
    Argon2::default()
        .verify_password(body.password.as_bytes(), &parsed)
        .map_err(|_| VidyaError::Unauthorized("invalid credentials".to_string()))?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        token: state.auth.keys.issue(&user.id),
        user: UserBody::from(&user),
    }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserBody,
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<MeResponse>, ApiError> {
    let user = users::get_user_by_id(&state.db, &user_id)
        .await?
        .ok_or_else(|| VidyaError::NotFound("user".to_string()))?;
    Ok(Json(MeResponse {
        success: true,
        user: UserBody::from(&user),
    }))
}
