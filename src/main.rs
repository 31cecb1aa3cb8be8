//! Try-On - 虚拟试衣编排服务
//!
//! - Domain: tryon/ (值对象与输入规则)
//! - Application: commands, queries, ports, staging
//! - Infrastructure: http, adapters (storage, replicate)

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tryon::application::StorageSelector;
use tryon::config::{load_config, print_config, LogConfig};
use tryon::infrastructure::adapters::{
    GcsStorageBackend, GcsStorageConfig, HttpReplicateClient, HttpReplicateClientConfig,
    LocalStorageBackend,
};
use tryon::infrastructure::http::{AppState, HttpServer, HttpSettings};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},tryon={},tower_http=debug", log.level, log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Try-On - 虚拟试衣编排服务");
    print_config(&config);

    // 上传目录同时是本地回退的静态目录
    tokio::fs::create_dir_all(&config.upload.dir).await?;

    // 存储后端：远端配置齐全时优先，否则回退到本地
    let firebase = &config.firebase;
    let remote = Arc::new(GcsStorageBackend::new(GcsStorageConfig {
        project_id: firebase.project_id.clone(),
        private_key_id: firebase.private_key_id.clone(),
        private_key: firebase.private_key.clone(),
        client_email: firebase.client_email.clone(),
        client_id: firebase.client_id.clone(),
        storage_bucket: firebase.storage_bucket.clone(),
        token_uri: firebase.token_uri.clone(),
        api_base: firebase.api_base.clone(),
        public_base: firebase.public_base.clone(),
        timeout_secs: firebase.timeout_secs,
    })?);
    let local = Arc::new(LocalStorageBackend::new(&config.server.public_base_url()));
    let storage = StorageSelector::new(remote, local);

    // 远端推理客户端
    let replicate = &config.replicate;
    let inference = Arc::new(HttpReplicateClient::new(HttpReplicateClientConfig {
        api_base: replicate.api_base.clone(),
        api_token: replicate.api_token.clone(),
        model: replicate.model.clone(),
        poll_interval_ms: replicate.poll_interval_ms,
        timeout_secs: replicate.timeout_secs,
    })?);

    let state = AppState::new(
        storage,
        inference,
        HttpSettings {
            upload_dir: config.upload.dir.clone(),
            max_file_size: config.upload.max_file_size,
            expose_error_details: config.server.environment.exposes_error_details(),
        },
    );

    let server = HttpServer::new(config.server.clone(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
