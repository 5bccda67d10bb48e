use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use textgen_gateway::auth::SecretVerifier;
use textgen_gateway::clock::{Clock, SystemClock};
use textgen_gateway::config::{Args, StoreBackend};
use textgen_gateway::rate_limit::{KvStore, MemoryStore, SlidingWindowLimiter};
use textgen_gateway::server;
use textgen_gateway::state::AppState;
use textgen_gateway::upstream::OpenAiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // parse cli arguments
    let args = Args::parse();
    args.validate().map_err(anyhow::Error::msg)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = build_store(&args, clock.clone()).await?;

    let verifier = SecretVerifier::new(args.api_secret.as_deref());
    if !verifier.is_configured() {
        warn!("API_SECRET is not set, every generate request will be rejected");
    }

    let generator = OpenAiClient::new(
        &args.openai_base_url,
        args.openai_api_key.clone(),
        args.model.clone(),
        args.upstream_timeout(),
    )?;

    let state = Arc::new(AppState {
        generate_limiter: SlidingWindowLimiter::new(
            args.generate_window(),
            store.clone(),
            clock.clone(),
        )
        .with_key_prefix(args.key_prefix.clone()),
        root_limiter: SlidingWindowLimiter::new(args.root_window(), store, clock)
            .with_key_prefix(args.key_prefix.clone()),
        verifier,
        generator: Arc::new(generator),
        max_words: args.max_words,
        store_failure_policy: args.store_failure_policy,
    });

    info!(
        model = %args.model,
        upstream = %args.openai_base_url,
        generate_limit = args.generate_rate_limit,
        root_limit = args.root_rate_limit,
        window_secs = args.rate_window,
        store = ?args.store,
        failure_policy = ?args.store_failure_policy,
        "Starting text generation gateway"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    server::serve(addr, server::router(state)).await?;

    info!("Gateway stopped");
    Ok(())
}

async fn build_store(args: &Args, clock: Arc<dyn Clock>) -> anyhow::Result<Arc<dyn KvStore>> {
    match args.store {
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::with_clock(clock));
            server::spawn_purge_task(
                store.clone(),
                std::time::Duration::from_secs(args.rate_window),
            );
            Ok(store)
        }
        #[cfg(feature = "redis")]
        StoreBackend::Redis => {
            let store = textgen_gateway::rate_limit::RedisStore::connect(&args.redis_url).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis => {
            anyhow::bail!("built without the `redis` feature, cannot use {}", args.redis_url)
        }
    }
}
