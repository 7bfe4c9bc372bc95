mod cli;

use crate::cli::{CacheBackendArg, LogFormat, StorageBackendArg, CLI};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tether_cache::{LayeredCache, MokaUrlCache, NoopUrlCache, RedisUrlCache};
use tether_core::{LinkRepository, UrlCache};
use tether_gateway::{App, AppState};
use tether_generator::TokenGenerator;
use tether_redirector::{ClickQueue, RedirectorService, RedirectorSettings};
use tether_shortener::{ShortenerService, ShortenerSettings};
use tether_storage::{InMemoryRepository, MySqlRepository};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error>;

/// Upper bound on waiting for queued clicks during shutdown.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let dotenv = dotenvy::dotenv();
    let config = CLI::parse();
    init_tracing(config.log_format);

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }
    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting gateway server"
    );

    match config.storage {
        StorageBackendArg::InMemory => {
            with_cache(config, Arc::new(InMemoryRepository::new())).await
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .clone()
                .ok_or("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(&mysql_dsn).await?;
            if config.mysql_ensure_schema {
                repository.ensure_schema().await?;
                info!("mysql schema ensured");
            }
            with_cache(config, Arc::new(repository)).await
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn redis_cache(config: &CLI) -> Result<RedisUrlCache, BoxError> {
    let redis_url = config
        .redis_url
        .as_deref()
        .ok_or("redis url is required when cache backend uses redis")?;
    Ok(RedisUrlCache::connect(redis_url, config.redis_key_prefix.clone()).await?)
}

async fn with_cache<R: LinkRepository>(config: CLI, repository: Arc<R>) -> Result<(), BoxError> {
    match config.cache {
        CacheBackendArg::None => serve(config, repository, NoopUrlCache).await,
        CacheBackendArg::Moka => {
            let cache = MokaUrlCache::with_capacity(config.moka_capacity);
            serve(config, repository, cache).await
        }
        CacheBackendArg::Redis => {
            let cache = redis_cache(&config).await?;
            serve(config, repository, cache).await
        }
        CacheBackendArg::Layered => {
            let cache = LayeredCache::new(
                MokaUrlCache::with_capacity(config.moka_capacity),
                redis_cache(&config).await?,
                config.local_cache_ttl(),
            );
            serve(config, repository, cache).await
        }
    }
}

async fn serve<R: LinkRepository, C: UrlCache>(
    config: CLI,
    repository: Arc<R>,
    cache: C,
) -> Result<(), BoxError> {
    let cache = Arc::new(cache);

    let shortener = ShortenerService::new(
        Arc::clone(&repository),
        Arc::clone(&cache),
        Arc::new(TokenGenerator::new()),
        ShortenerSettings::builder()
            .public_domain(config.public_base_url.clone())
            .cache_ttl(config.cache_ttl())
            .max_generate_attempts(config.max_generate_attempts)
            .build(),
    );

    let (clicks, click_worker) = ClickQueue::spawn(Arc::clone(&repository), config.click_queue_capacity);
    let redirector = RedirectorService::new(
        repository,
        cache,
        clicks,
        RedirectorSettings::builder()
            .cache_ttl(config.cache_ttl())
            .click_policy(config.click_policy.into())
            .build(),
    );

    let state = AppState::new(
        Arc::new(shortener),
        Arc::new(redirector),
        config.public_base_url,
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped, draining click queue");
    click_worker.drain(CLICK_DRAIN_TIMEOUT).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}
