use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use lookup_gateway::{
    AppState,
    config::Config,
    gate::{Gate, GateSettings, SystemClock},
    router::create_router,
    store::RedisStore,
    upstream::HttpProvider,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

    if config.debug {
        tracing::warn!("DEBUG enabled, error responses include details");
    }

    // 设置 Redis 客户端
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let store = Arc::new(RedisStore::new(Arc::new(redis_client)));

    // 上游查询服务
    let base_url =
        reqwest::Url::parse(&config.upstream_base_url).expect("Invalid UPSTREAM_BASE_URL");
    let upstream = Arc::new(HttpProvider::new(
        base_url,
        config.upstream_api_key.clone(),
        config.upstream_key_param.clone(),
    ));

    // 设置应用状态
    let gate = Gate::new(store, Arc::new(SystemClock), GateSettings::from(&config));
    let state = AppState {
        config: Arc::new(config),
        gate: Arc::new(gate),
        upstream,
    };

    let app = create_router(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
