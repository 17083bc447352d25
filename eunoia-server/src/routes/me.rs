// eunoia-server/src/routes/me.rs

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::Value;

use eunoia_common::models::{PublicProfile, User};
use eunoia_core::codec::merge_objects;

use crate::auth::AuthUser;
use crate::context::ServerContext;
use crate::routes::error_response;

/// Profile fields a caller may never set through the update surface.
const PROTECTED_FIELDS: [&str; 3] = ["password", "password_hash", "email"];

pub async fn get_me(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let user = ctx
        .user_repo
        .get(auth.id)
        .await
        .map_err(error_response)?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;
    // password_hash is skipped by the model's serializer.
    let body = serde_json::to_value(&user).map_err(|e| error_response(e.into()))?;
    Ok(Json(body))
}

pub async fn update_me(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    Json(mut payload): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if let Value::Object(map) = &mut payload {
        for field in PROTECTED_FIELDS {
            map.remove(field);
        }
    }

    let stored = ctx
        .user_repo
        .get(auth.id)
        .await
        .map_err(error_response)?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    let mut merged = serde_json::to_value(&stored).map_err(|e| error_response(e.into()))?;
    merge_objects(&mut merged, payload);
    let mut updated: User = serde_json::from_value(merged)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    // Identity and credential columns only ever change through their own
    // flows.
    updated.id = stored.id;
    updated.email = stored.email.clone();
    updated.password_hash = stored.password_hash.clone();

    ctx.user_repo.update(&updated).await.map_err(error_response)?;

    let refreshed = ctx
        .user_repo
        .get(auth.id)
        .await
        .map_err(error_response)?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;
    let body = serde_json::to_value(&refreshed).map_err(|e| error_response(e.into()))?;
    Ok(Json(body))
}

pub async fn user_by_email(
    State(ctx): State<Arc<ServerContext>>,
    Extension(_auth): Extension<AuthUser>,
    Path(email): Path<String>,
) -> Result<Json<PublicProfile>, (StatusCode, String)> {
    if email.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Invalid email".to_string()));
    }
    let user = ctx
        .user_repo
        .get_by_email(&email)
        .await
        .map_err(error_response)?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;
    Ok(Json(PublicProfile::from(&user)))
}
