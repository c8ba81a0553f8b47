use anyhow::Context;
use registration_api::{
    config::{Backend, Config},
    db, handlers, Gateway, MemoryStore, RegistrationStore,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // Initialise logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create the store the gateway will own
    let store: Arc<dyn RegistrationStore> = match config.database.backend {
        Backend::Postgres => {
            let pool = db::ConnectionPool::create(
                &config.database.url,
                config.database.max_connections,
            )
            .await
            .context("database connection pool cannot be created")?;
            if config.database.initialise {
                let connection = pool
                    .get_connection()
                    .await
                    .context("could not get connection to database")?;
                db::initialise(&connection, &config.database.init_script)
                    .await
                    .context("database can't be initialised")?;
            }
            Arc::new(db::PostgresStore::new(pool))
        }
        Backend::Memory => {
            tracing::warn!("using in-memory store, registrations will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let gateway = Gateway::new(store, config.registration.require_affiliation);
    let app = handlers::router(gateway);

    let ip = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server.listen_addr))?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Starting api on {}...", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
