//! 规则引擎服务
//!
//! 提供规则创建、合并、求值与修改的 REST API。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rule_engine::http::{AppState, build_router};
use rule_engine::store::{MemoryRuleRepository, PostgresRuleRepository, RuleRepository};
use rule_shared::config::{AppConfig, StorageBackend};
use rule_shared::observability;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 从 config/{service_name}.toml 与 RULES_ 环境变量加载配置
    let config = AppConfig::load("rule-engine").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig {
            service_name: "rule-engine".to_string(),
            ..Default::default()
        }
    });

    let _guard = observability::init(&config.observability()).await?;

    info!("Starting rule-engine on {}", config.server_addr());

    let repo = build_repository(&config).await?;
    let app = build_router(AppState::new(repo));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// 按配置选择存储后端
async fn build_repository(config: &AppConfig) -> Result<Arc<dyn RuleRepository>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let db = &config.database;
            let pool = PgPoolOptions::new()
                .max_connections(db.max_connections)
                .min_connections(db.min_connections)
                .acquire_timeout(Duration::from_secs(db.connect_timeout_seconds))
                .idle_timeout(Duration::from_secs(db.idle_timeout_seconds))
                .connect(&db.url)
                .await?;

            let repo = PostgresRuleRepository::new(pool);
            repo.ensure_schema().await?;
            info!("Rule store: postgres");
            Ok(Arc::new(repo))
        }
        StorageBackend::Memory => {
            if config.is_production() {
                warn!("Memory rule store in production, rules are lost on restart");
            }
            info!("Rule store: memory");
            Ok(Arc::new(MemoryRuleRepository::new()))
        }
    }
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
