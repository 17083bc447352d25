//! eunoia-server/src/context.rs
//!
//! Defines the main "global" context (ServerContext) for the API server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use eunoia_ai::{LlmClient, ProviderConfig, ZhipuProvider};
use eunoia_core::db::Database;
use eunoia_core::repositories::sqlite::{
    ChatHistoryRepository, EmotionReportRepository, TrendAnalysisRepository, UserRepository,
};
use eunoia_core::repositories::UserRepo;
use eunoia_core::services::{AnalysisService, EntityService, UsageService};
use eunoia_core::tasks::seed::seed_defaults;
use eunoia_core::Error;

use crate::Args;

/// The global server context (a bag of references to the DB, repositories,
/// and domain services shared by every request handler).
pub struct ServerContext {
    pub db: Database,
    pub user_repo: Arc<dyn UserRepo>,
    pub entities: Arc<EntityService>,
    pub usage: Arc<UsageService>,
    pub analysis: Arc<AnalysisService>,
    pub llm: Arc<LlmClient>,
    pub jwt_secret: String,
    pub uploads_dir: PathBuf,
}

impl ServerContext {
    /// Creates and configures the entire context for server mode.
    pub async fn new(args: &Args) -> Result<Self, Error> {
        // 1) Connect to the DB and apply migrations + seed data
        let db = Database::new(&args.db_path).await?;
        db.migrate().await?;
        seed_defaults(&db).await?;

        let pool = db.pool().clone();
        let user_repo: Arc<dyn UserRepo> = Arc::new(UserRepository::new(pool.clone()));

        // 2) LLM provider from environment
        let provider_config = ProviderConfig::from_env();
        if provider_config.api_key.is_empty() {
            warn!("ZHIPU_API_KEY is not set; LLM-backed features will fail");
        }
        let llm = Arc::new(LlmClient::new(Arc::new(ZhipuProvider::new(provider_config))));

        // 3) Domain services
        let entities = Arc::new(EntityService::new(pool.clone()));
        let usage = Arc::new(UsageService::new(user_repo.clone()));
        let analysis = Arc::new(AnalysisService::new(
            llm.clone(),
            Arc::new(ChatHistoryRepository::new(pool.clone())),
            Arc::new(EmotionReportRepository::new(pool.clone())),
            Arc::new(TrendAnalysisRepository::new(pool.clone())),
        ));

        // 4) Auth + uploads configuration
        let jwt_secret = std::env::var("EUNOIA_JWT_SECRET")
            .unwrap_or_else(|_| "dev_local_secret_change_me".to_string());
        if jwt_secret == "dev_local_secret_change_me" {
            warn!("Using the development JWT secret; set EUNOIA_JWT_SECRET in production");
        }

        let uploads_dir = PathBuf::from(&args.uploads_dir);
        std::fs::create_dir_all(&uploads_dir)?;
        info!("Serving uploads from {}", uploads_dir.display());

        Ok(Self {
            db,
            user_repo,
            entities,
            usage,
            analysis,
            llm,
            jwt_secret,
            uploads_dir,
        })
    }
}
