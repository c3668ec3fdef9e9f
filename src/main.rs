//! Sift - 邮件分诊服务
//!
//! 入口：初始化日志、加载配置、按配置选择 LLM 后端、启动 HTTP 服务。

use std::sync::Arc;

use anyhow::Context;

use sift::config::load_config;
use sift::llm::{LlmClient, MockLlmClient, OpenAiClient};
use sift::server;
use sift::triage::TriageEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sift::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;

    let llm: Arc<dyn LlmClient> = match cfg.llm.provider.as_str() {
        "mock" => Arc::new(MockLlmClient::new()),
        _ => Arc::new(OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            &cfg.llm.model,
            None,
        )),
    };
    tracing::info!(provider = %cfg.llm.provider, model = %cfg.llm.model, "LLM client ready");

    let engine = Arc::new(TriageEngine::new(llm));
    let app = server::router(engine);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.effective_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Sift listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
