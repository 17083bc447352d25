// eunoia-server/src/routes/entities.rs
//
// The generic entity surface. Usage accounting meters EmotionReport
// creation here, and report/trend creation hands the new record to the
// analysis orchestrator on a detached task; the creating request returns
// as soon as the row exists.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use eunoia_common::models::{EntityKind, MeteredAction, StyleStatus};
use eunoia_core::services::{EntityService, UsageDecision};

use crate::auth::AuthUser;
use crate::context::ServerContext;
use crate::routes::error_response;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub order: Option<String>,
    pub limit: Option<String>,
}

pub async fn list_entities(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    Path(entity): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, (StatusCode, String)> {
    let items = ctx
        .entities
        .list(
            &entity,
            params.order.as_deref(),
            params.limit.as_deref(),
            &auth.email,
        )
        .await
        .map_err(error_response)?;
    Ok(Json(items))
}

pub async fn create_entity(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    Path(entity): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let kind = EntityService::resolve(&entity).map_err(error_response)?;

    // Report creation is a metered action for free-tier callers.
    if kind == EntityKind::EmotionReport {
        let decision = ctx
            .usage
            .authorize(auth.id, MeteredAction::EmotionReport)
            .await
            .map_err(error_response)?;
        if let UsageDecision::Denied(message) = decision {
            return Err((StatusCode::TOO_MANY_REQUESTS, message));
        }
    }

    let created = ctx
        .entities
        .create(&entity, payload, &auth.email)
        .await
        .map_err(error_response)?;

    match kind {
        EntityKind::EmotionReport => {
            ctx.usage
                .record(auth.id, MeteredAction::EmotionReport)
                .await
                .map_err(error_response)?;
            if let Some(id) = created["id"].as_i64() {
                let analysis = ctx.analysis.clone();
                tokio::spawn(async move {
                    analysis.run_report_analysis(id).await;
                });
            }
        }
        EntityKind::TrendAnalysis => {
            if let Some(id) = created["id"].as_i64() {
                let analysis = ctx.analysis.clone();
                tokio::spawn(async move {
                    analysis.run_trend_analysis(id).await;
                });
            }
        }
        _ => {}
    }

    Ok(Json(created))
}

pub async fn update_entity(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    Path((entity, id)): Path<(String, i64)>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    update_inner(&ctx, &auth, &entity, id, payload).await
}

pub async fn delete_entity(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    Path((entity, id)): Path<(String, i64)>,
) -> Result<StatusCode, (StatusCode, String)> {
    delete_inner(&ctx, &auth, &entity, id).await
}

// The ChatStyle id route carries the status check, so the generic update
// and delete verbs need explicit handlers on the same path.

pub async fn style_status(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<StyleStatus>, (StatusCode, String)> {
    let status = ctx
        .entities
        .style_status(id, &auth.email)
        .await
        .map_err(error_response)?;
    Ok(Json(status))
}

pub async fn update_chat_style(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    update_inner(&ctx, &auth, "ChatStyle", id, payload).await
}

pub async fn delete_chat_style(
    State(ctx): State<Arc<ServerContext>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    delete_inner(&ctx, &auth, "ChatStyle", id).await
}

async fn update_inner(
    ctx: &ServerContext,
    _auth: &AuthUser,
    entity: &str,
    id: i64,
    payload: Value,
) -> Result<Json<Value>, (StatusCode, String)> {
    let updated = ctx
        .entities
        .update(entity, id, payload)
        .await
        .map_err(error_response)?;
    Ok(Json(updated))
}

async fn delete_inner(
    ctx: &ServerContext,
    auth: &AuthUser,
    entity: &str,
    id: i64,
) -> Result<StatusCode, (StatusCode, String)> {
    ctx.entities
        .delete(entity, id)
        .await
        .map_err(error_response)?;
    info!("{} deleted {} {}", auth.email, entity, id);
    Ok(StatusCode::NO_CONTENT)
}
