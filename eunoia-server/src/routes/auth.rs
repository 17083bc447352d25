// eunoia-server/src/routes/auth.rs

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use eunoia_common::models::{SubscriptionTier, User};

use crate::auth::issue_token;
use crate::context::ServerContext;
use crate::routes::error_response;

const BCRYPT_COST: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

pub async fn register(
    State(ctx): State<Arc<ServerContext>>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let (Some(email), Some(password)) = (required(body.email), required(body.password)) else {
        return Err((StatusCode::BAD_REQUEST, "Missing email or password".to_string()));
    };

    let existing = ctx.user_repo.get_by_email(&email).await.map_err(error_response)?;
    if existing.is_some() {
        return Err((StatusCode::CONFLICT, "Email already registered".to_string()));
    }

    let hash = bcrypt::hash(&password, BCRYPT_COST)
        .map_err(|e| error_response(e.to_string().into()))?;

    let now = Utc::now();
    let user = ctx
        .user_repo
        .create(&User {
            id: 0,
            email,
            password_hash: Some(hash),
            nickname: None,
            full_name: None,
            avatar_url: None,
            bio: None,
            subscription_tier: SubscriptionTier::Free,
            daily_chat_count: 0,
            daily_chat_reset_date: None,
            daily_report_count: 0,
            daily_report_reset_date: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .map_err(error_response)?;

    info!("Registered user {}", user.id);
    Ok(Json(json!({ "id": user.id, "email": user.email })))
}

pub async fn login(
    State(ctx): State<Arc<ServerContext>>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let (Some(email), Some(password)) = (required(body.email), required(body.password)) else {
        return Err((StatusCode::BAD_REQUEST, "Missing email or password".to_string()));
    };

    let invalid = || (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string());

    let user = ctx
        .user_repo
        .get_by_email(&email)
        .await
        .map_err(error_response)?
        .ok_or_else(invalid)?;
    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;

    let ok = bcrypt::verify(&password, hash).unwrap_or(false);
    if !ok {
        return Err(invalid());
    }

    let token = issue_token(&ctx.jwt_secret, user.id, &user.email).map_err(error_response)?;
    Ok(Json(json!({ "token": token })))
}
