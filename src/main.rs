use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    routing::{get, post},
};
use core_backend::{
    AppState,
    auth::{AuthState, OAuthClient},
    config::Config,
    middleware::{auth_middleware, log_errors},
    routes,
};
use sqlx::postgres::PgPoolOptions;
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

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // 认证服务：签名密钥与会话存储在此构造一次，显式传入网关与各端点
    let auth = AuthState::from_config(&config);
    let oauth = OAuthClient::from_config(&config);

    let state = AppState {
        pool,
        config: config.clone(),
        auth: auth.clone(),
        oauth,
    };

    // 会话过期清扫
    {
        let sessions = auth.sessions.clone();
        let interval = config.session_sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let purged = sessions.purge_expired();
                if purged > 0 {
                    tracing::debug!("Purged {} expired sessions", purged);
                }
            }
        });
    }

    // 公开路由：注册/登录/OAuth回调/登出，不经过认证网关
    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/oauth/callback", get(routes::auth::oauth_callback))
        .route("/auth/logout", post(routes::auth::logout));

    // 受保护路由：统一挂在认证网关之后
    let protected_routes = Router::new()
        .route("/protected", get(routes::protected::probe))
        // 项目配置
        .route(
            "/project-configurations",
            post(routes::configuration::create).get(routes::configuration::list),
        )
        .route(
            "/project-configurations/search",
            get(routes::configuration::search),
        )
        .route(
            "/project-configurations/{id}",
            get(routes::configuration::get_by_id)
                .put(routes::configuration::update)
                .delete(routes::configuration::remove),
        )
        // 系统模块
        .route(
            "/system-modules",
            post(routes::system_module::create).get(routes::system_module::list),
        )
        .route("/system-modules/search", get(routes::system_module::search))
        .route(
            "/system-modules/{id}",
            get(routes::system_module::get_by_id)
                .put(routes::system_module::update)
                .delete(routes::system_module::remove),
        )
        // 界面表单
        .route(
            "/ui-forms",
            post(routes::ui_form::create).get(routes::ui_form::list),
        )
        .route("/ui-forms/search", get(routes::ui_form::search))
        .route(
            "/ui-forms/{id}",
            get(routes::ui_form::get_by_id)
                .put(routes::ui_form::update)
                .delete(routes::ui_form::remove),
        )
        // 计费模块
        .route(
            "/billing-modules",
            post(routes::billing::create).get(routes::billing::list),
        )
        .route("/billing-modules/search", get(routes::billing::search))
        .route(
            "/billing-modules/{id}",
            get(routes::billing::get_by_id)
                .put(routes::billing::update)
                .delete(routes::billing::remove),
        )
        // 存储条目
        .route(
            "/storage-entries",
            post(routes::storage::create).get(routes::storage::list),
        )
        .route("/storage-entries/search", get(routes::storage::search))
        .route(
            "/storage-entries/{id}",
            get(routes::storage::get_by_id)
                .put(routes::storage::update)
                .delete(routes::storage::remove),
        )
        // 校验器
        .route(
            "/validators",
            post(routes::validator::create).get(routes::validator::list),
        )
        .route("/validators/search", get(routes::validator::search))
        .route(
            "/validators/{id}",
            get(routes::validator::get_by_id)
                .put(routes::validator::update)
                .delete(routes::validator::remove),
        )
        // 认证网关：令牌或会话任一有效即放行
        .layer(axum::middleware::from_fn_with_state(
            auth.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .merge(public_routes)
        .nest(&config.api_base_uri, protected_routes);

    // 添加日志中间件
    let router = router.layer(axum::middleware::from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 添加应用状态
    let app = router.with_state(state.clone());

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
