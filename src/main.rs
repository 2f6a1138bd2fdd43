use axum::{
    routing::{get, post},
    Router,
};
use clause_billing_rust::{api, create_pool, AppConfig, InvoiceAssembler, PgStore, TicketEnricher};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database.url).await?;
    info!("Database pool created");

    // 管道服务共用同一个 Postgres 存储
    let store = PgStore::new(pool);
    let state = api::AppState {
        enricher: Arc::new(TicketEnricher::new(store.clone())),
        assembler: Arc::new(InvoiceAssembler::new(store.clone())),
        store,
    };

    // 构建路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/tickets/enrich", post(api::enrich_tickets))
        .route("/api/invoices/generate", post(api::generate_invoice))
        .layer(ServiceBuilder::new())
        .with_state(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/tickets/enrich    - enrich tickets with billing annotations");
    info!("  POST /api/invoices/generate - classify tickets and assemble a DRAFT invoice");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
