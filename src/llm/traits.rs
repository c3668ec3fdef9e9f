//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient：complete（prompt 进、文本出，非流式）。
//! 分诊引擎只依赖这一契约，测试用确定性 Mock 替换真实调用。

use async_trait::async_trait;
use thiserror::Error;

/// LLM 调用失败（网络、API、空响应等）
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM returned no content")]
    EmptyResponse,
}

/// LLM 客户端 trait：单轮完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成：输入 prompt，返回生成文本
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
