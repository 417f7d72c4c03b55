use mimalloc::MiMalloc;
use mnstore::types::RpcServerKind;
use mnstore::{Store, config::CONFIG};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_file = %cfg.database_file.display(),
        loglevel = %cfg.loglevel,
        trusted_servers = cfg.trusted_rpc_servers.len()
    );

    let store = Store::new(cfg.clone()).with_listener(Arc::new(|| {
        debug!("custom RPC servers changed");
    }));
    store.open().await?;

    let public = store.rpc_servers().list(RpcServerKind::Public).await?;
    let custom = store.rpc_servers().list(RpcServerKind::Custom).await?;
    let masternodes = store.masternodes().list().await?;

    info!(
        public = public.len(),
        custom = custom.len(),
        masternodes = masternodes.len(),
        "store summary"
    );
    println!("{}", serde_json::to_string_pretty(&custom)?);
    println!("{}", serde_json::to_string_pretty(&masternodes)?);

    store.close().await?;
    Ok(())
}
