//! Sift - 邮件分诊服务
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **session**: 待审批会话的内存存储（草稿可寻址、可恢复）
//! - **triage**: 核心分诊状态机与编排引擎（classify → 审批循环）
//! - **server**: HTTP 接入层（triage_email / triage_email_response / health）
//! - **observability**: tracing 初始化

pub mod config;
pub mod llm;
pub mod observability;
pub mod server;
pub mod session;
pub mod triage;

pub use session::SessionStore;
pub use triage::{Decision, Disposition, EmailContext, TriageEngine, TriageError};
