//! 分诊核心：状态机 + 编排引擎
//!
//! - **types**: EmailContext / Disposition / Decision / TriageError
//! - **classifier**: LLM 输出的确定性解析（marker 匹配，与 Provider 解耦）
//! - **machine**: 可序列化状态 + 纯转移函数（classify / redraft）
//! - **engine**: 对外唯一入口 submit / decide，持有 SessionStore 与 LlmClient

pub mod classifier;
pub mod engine;
pub mod machine;
pub mod types;

pub use engine::TriageEngine;
pub use machine::{IntakeOutcome, SessionState};
pub use types::{Decision, Disposition, EmailContext, TriageError};
