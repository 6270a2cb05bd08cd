use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::{AdminClaims, ADMIN_ROLE},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/login", post(login_admin))
}

/// POST /admin/login
async fn login_admin(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.username != state.admin.username || req.password != state.admin.password {
        tracing::warn!("Rejected admin login for {:?}", req.username);
        return Err(AppError::AuthenticationError("Invalid credentials".to_string()));
    }

    let claims = AdminClaims {
        sub: req.username,
        role: ADMIN_ROLE.to_owned(),
        jti: Uuid::new_v4().to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    tracing::info!("Admin {} logged in", claims.sub);
    Ok(Json(AuthResponse { token }))
}
