use liaison_services::{
    config::Config,
    database::{self, PgDocumentStore},
    routes,
    storage::{S3Config, S3FileStorage},
};
use std::net::{IpAddr, SocketAddr};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const BUILD_DATE: &str = env!("BUILD_DATE");
const BUILD_COMMIT: &str = env!("BUILD_COMMIT");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, the environment itself still applies.
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Liaison Services");
    info!("Build Date:   {}", BUILD_DATE);
    info!("Build Commit: {}", BUILD_COMMIT);

    let config: Config = Config::init()?;
    info!(
        environment = %config.environment(),
        server_addr = %config.server_addr(),
        port = %config.port(),
        "Configuration loaded"
    );

    let pool = database::create_pool(&config).await?;
    let store = PgDocumentStore::new(pool);
    store.ensure_schema().await?;

    let files = object_storage(&config);
    let route = routes(store, files, config.clone());

    let addr = SocketAddr::from((config.server_addr().parse::<IpAddr>()?, config.port()));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, route).await?;

    Ok(())
}

/// Real S3 when credentials are configured, mock-backed storage otherwise
/// (local runs without an object store).
fn object_storage(config: &Config) -> S3FileStorage {
    match (
        config.s3_region(),
        config.s3_access_key_id(),
        config.s3_secret_access_key(),
    ) {
        (Some(region), Some(access_key_id), Some(secret_access_key)) => {
            S3FileStorage::new(S3Config {
                region: region.to_owned(),
                endpoint: config.s3_endpoint().map(str::to_owned),
                access_key_id: access_key_id.to_owned(),
                secret_access_key: secret_access_key.to_owned(),
            })
        }
        _ => {
            info!("Object storage credentials not set, using in-memory storage");
            S3FileStorage::new_for_test()
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,liaison_services=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
