use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use forum_backend::{
    AppState,
    authority::HttpTokenAuthority,
    cache::{MemoryTokenCache, RedisTokenCache, TokenCache},
    config::{Config, TokenCacheBackend},
    database::PgRecordStore,
    middleware::AuthGate,
    router::create_router,
};
#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置数据库连接池
    let store = PgRecordStore::connect(&config)
        .await
        .expect("Failed to connect to Postgres");
    if config.run_migrations {
        store.migrate().await.expect("Failed to run migrations");
        tracing::info!("Database migrations applied");
    }

    // 设置令牌缓存
    let cache: Arc<dyn TokenCache> = match config.token_cache {
        TokenCacheBackend::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .expect("REDIS_URL is required for the redis token cache");
            let redis_client =
                redis::Client::open(redis_url).expect("Failed to create Redis client");
            let cache = RedisTokenCache::connect(&redis_client)
                .await
                .expect("Failed to connect to Redis");
            tracing::info!("Using Redis token cache");
            Arc::new(cache)
        }
        TokenCacheBackend::Memory => {
            let cache = Arc::new(MemoryTokenCache::new());
            cache.clone().spawn_sweeper(SWEEP_INTERVAL);
            tracing::info!("Using in-process token cache");
            cache
        }
    };

    // 设置令牌校验服务
    let authority = HttpTokenAuthority::new(&config.auth_url, config.auth_timeout())
        .expect("Invalid AUTH_URL");
    let gate = Arc::new(AuthGate::new(cache, Arc::new(authority)));

    // 设置应用状态
    let state = AppState {
        store: Arc::new(store.clone()),
        gate,
    };

    let router = create_router(state, &config.api_base_uri);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    store.close().await;
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
