use cafe_hex::application::gateway::PersistenceGateway;
use cafe_hex::application::storefront::Storefront;
use cafe_hex::config::Config;
use cafe_hex::inbound::http::{HttpServer, HttpServerConfig};
use cafe_hex::outbound::{build_completion, build_remote};
use cafe_repo::{build_local_store, LocalStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for SERVER_PORT, DATABASE_URL and the service keys when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = Config::from_env()?;
    let local: LocalStore = build_local_store(config.database_url.as_deref()).await?;
    tracing::info!(
        backend = local.backend(),
        remote = config.remote_configured(),
        completion = config.completion_configured(),
        "storefront configuration resolved"
    );

    let remote = build_remote(config.remote.as_ref())?;
    let completion = build_completion(config.completion.as_ref())?;
    let gateway = PersistenceGateway::new(local, remote);
    let storefront = Storefront::open(gateway, completion).await;

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };

    let http = HttpServer::new(storefront, server_cfg).await?;
    http.run().await
}
