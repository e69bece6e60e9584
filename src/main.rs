use std::net::SocketAddr;

use pressbox::{init_db, make_router, run_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pressbox=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let pool = init_db(&config.database_url).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let router = make_router();
    tracing::info!("Server started on {}", addr);
    run_app(router, addr, pool).await
}
