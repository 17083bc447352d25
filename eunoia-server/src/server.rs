// eunoia-server/src/server.rs

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use axum_server::Server;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use eunoia_core::Error;

use crate::auth::auth_middleware;
use crate::context::ServerContext;
use crate::routes::{auth, entities, integrations, me};

/// Build the full application router. Register/login and the static uploads
/// directory are public; everything else sits behind the bearer check.
pub fn build_router(ctx: Arc<ServerContext>) -> Router {
    let protected = Router::new()
        .route("/api/me", get(me::get_me).put(me::update_me))
        .route("/api/users/by-email/{email}", get(me::user_by_email))
        .route(
            "/api/entities/{entity}",
            get(entities::list_entities).post(entities::create_entity),
        )
        .route(
            "/api/entities/{entity}/{id}",
            put(entities::update_entity).delete(entities::delete_entity),
        )
        // The static segment wins over `{entity}`, so the persona status
        // check must also carry the generic update/delete verbs.
        .route(
            "/api/entities/ChatStyle/{id}",
            get(entities::style_status)
                .put(entities::update_chat_style)
                .delete(entities::delete_chat_style),
        )
        .route("/api/integrations/core/invokeLLM", post(integrations::invoke_llm))
        .route(
            "/api/integrations/core/uploadFile",
            post(integrations::upload_file)
                .layer(DefaultBodyLimit::max(integrations::MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route_layer(middleware::from_fn_with_state(ctx.clone(), auth_middleware));

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
        .nest_service("/uploads", ServeDir::new(&ctx.uploads_dir))
        .with_state(ctx)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

pub async fn run(ctx: Arc<ServerContext>, addr: SocketAddr) -> Result<(), Error> {
    let app = build_router(ctx);

    info!("API server listening on http://{}", addr);
    Server::bind(addr)
        .serve(app.into_make_service())
        .await
        .map_err(Error::Io)?;

    Ok(())
}
