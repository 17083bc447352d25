// eunoia-server/src/routes/integrations.rs

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::{Extension, Json};
use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use eunoia_ai::LlmRequest;
use eunoia_common::models::MeteredAction;
use eunoia_core::services::UsageDecision;

use crate::auth::AuthUser;
use crate::context::ServerContext;
use crate::routes::error_response;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: [&str; 5] =
    ["image/png", "image/jpeg", "image/jpg", "image/gif", "image/webp"];

#[derive(Debug, Deserialize)]
pub struct InvokeLlmBody {
    pub prompt: Option<String>,
    pub response_json_schema: Option<Value>,
    pub model: Option<String>,
}

/// Chat sends and other client-side generations run through here, so this
/// is where the chat quota is enforced: a hard stop for free tier, a soft
/// ceiling for Plus. The counter is bumped only after the provider answers,
/// as the original did.
pub async fn invoke_llm(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<InvokeLlmBody>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let prompt = body
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "Missing prompt".to_string()))?;

    let decision = ctx
        .usage
        .authorize(auth.id, MeteredAction::ChatMessage)
        .await
        .map_err(error_response)?;
    match decision {
        UsageDecision::Denied(message) => {
            return Err((StatusCode::TOO_MANY_REQUESTS, message));
        }
        UsageDecision::AllowedWithWarning(message) => {
            // The response body is raw generation output, so the soft-limit
            // notice only shows up in the logs; clients derive their own
            // banner from the /me counters.
            warn!("User {} past soft chat ceiling: {}", auth.id, message);
        }
        UsageDecision::Allowed => {}
    }

    let result = ctx
        .llm
        .invoke(LlmRequest {
            prompt,
            response_json_schema: body.response_json_schema,
            model: body.model,
        })
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    ctx.usage
        .record(auth.id, MeteredAction::ChatMessage)
        .await
        .map_err(error_response)?;

    Ok(Json(result))
}

pub async fn upload_file(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err((StatusCode::BAD_REQUEST, "Invalid file type".to_string()));
        }

        let extension = field
            .file_name()
            .and_then(|name| FsPath::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let data = field
            .bytes()
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "File too large".to_string()))?;
        if data.len() > MAX_UPLOAD_BYTES {
            return Err((StatusCode::BAD_REQUEST, "File too large".to_string()));
        }

        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let filename = format!("{}-{}{}", Utc::now().timestamp_millis(), suffix, extension);

        tokio::fs::write(ctx.uploads_dir.join(&filename), &data)
            .await
            .map_err(|e| error_response(e.into()))?;

        let host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("localhost:3001");
        let file_url = format!("http://{}/uploads/{}", host, filename);

        info!("{} uploaded {} ({} bytes)", auth.email, filename, data.len());
        return Ok(Json(json!({ "file_url": file_url })));
    }

    Err((StatusCode::BAD_REQUEST, "No file".to_string()))
}
