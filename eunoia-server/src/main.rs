// eunoia-server/src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod auth;
mod context;
mod routes;
mod server;

use context::ServerContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "eunoia-server")]
#[command(author, version, about = "Eunoia - mental-wellness companion API server")]
pub struct Args {
    /// Address to which the server will bind
    #[arg(long, default_value = "0.0.0.0:3001")]
    pub server_addr: String,

    /// SQLite database URL
    #[arg(long, default_value = "sqlite://eunoia.db")]
    pub db_path: String,

    /// Directory where uploaded media is stored and served from
    #[arg(long, default_value = "./uploads")]
    pub uploads_dir: String,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("eunoia=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("Eunoia server starting. addr={}, db={}", args.server_addr, args.db_path);

    let addr: SocketAddr = args.server_addr.parse()?;
    let ctx = Arc::new(ServerContext::new(&args).await?);

    if let Err(e) = server::run(ctx, addr).await {
        error!("Server error: {:?}", e);
    }

    Ok(())
}
