// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token issuance, verification, and the auth middleware.
//!
//! Tokens are `user_id.expiry.signature` where the signature is
//! HMAC-SHA256 over `user_id.expiry` with the configured secret. The
//! middleware verifies the token and injects the user id into request
//! extensions for handlers to extract.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use vidya_core::VidyaError;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies bearer tokens.
pub struct TokenKeys {
    secret: Vec<u8>,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("secret", &"[redacted]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_days: u32) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl: chrono::Duration::days(i64::from(ttl_days)),
        }
    }

    /// Issue a token for `user_id` expiring after the configured TTL.
    pub fn issue(&self, user_id: &str) -> String {
        let expiry = (chrono::Utc::now() + self.ttl).timestamp();
        let payload = format!("{user_id}.{expiry}");
        format!("{payload}.{}", self.sign(&payload))
    }

    /// Verify a token and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<String, VidyaError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [user_id, expiry, signature] = parts.as_slice() else {
            return Err(VidyaError::Unauthorized("malformed token".to_string()));
        };

        let payload = format!("{user_id}.{expiry}");
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key size");
        mac.update(payload.as_bytes());
        let sig_bytes = hex::decode(signature)
            .map_err(|_| VidyaError::Unauthorized("malformed token".to_string()))?;
        mac.verify_slice(&sig_bytes)
            .map_err(|_| VidyaError::Unauthorized("invalid token".to_string()))?;

        let expiry: i64 = expiry
            .parse()
            .map_err(|_| VidyaError::Unauthorized("malformed token".to_string()))?;
        if chrono::Utc::now().timestamp() >= expiry {
            return Err(VidyaError::Unauthorized("token expired".to_string()));
        }

        Ok((*user_id).to_string())
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key size");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Shared auth state for the middleware.
#[derive(Clone)]
pub struct AuthState {
    pub keys: Arc<TokenKeys>,
}

/// The verified caller, available to protected handlers via `Extension`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Middleware validating the `Authorization: Bearer` header.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            ApiError(VidyaError::Unauthorized("missing bearer token".to_string()))
        })?;

    let user_id = auth.keys.verify(token)?;
    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}
