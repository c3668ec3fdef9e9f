//! 分诊核心类型

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmError;

/// 待分诊邮件的语义输入（入库后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailContext {
    pub author: String,
    pub to: String,
    pub subject: String,
    pub email_thread: String,
}

impl EmailContext {
    /// 校验必填字段（trim 后非空）；不合格在状态机运行前拒绝
    pub fn validate(&self) -> Result<(), TriageError> {
        let fields = [
            ("author", &self.author),
            ("to", &self.to),
            ("subject", &self.subject),
            ("email_thread", &self.email_thread),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(TriageError::MalformedInput(format!(
                    "field '{}' must be a non-empty string",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// 分诊结果类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// 仅供参考，无需回复
    Fyi,
    /// 垃圾/无关，丢弃
    Discard,
    /// 需要回复，进入审批循环
    Respond,
    /// 草稿已批准（终态）
    Approved,
    /// 草稿被否决，已重新起草
    Rejected,
    /// 处理失败（Provider 错误等）
    Error,
}

/// 同步返回给调用方的决策值（不独立持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub triage_decision: Disposition,
    pub needs_response: bool,
    pub drafted_response: Option<String>,
    pub session_id: Option<String>,
    pub message: String,
}

impl Decision {
    /// 无会话的单次结论（fyi / discard / approved）
    pub fn stateless(disposition: Disposition, message: impl Into<String>) -> Self {
        Self {
            triage_decision: disposition,
            needs_response: false,
            drafted_response: None,
            session_id: None,
            message: message.into(),
        }
    }

    /// 挂起待审批的结论（respond / rejected），携带当前草稿与会话 ID
    pub fn pending(
        disposition: Disposition,
        draft: String,
        session_id: String,
        message: impl Into<String>,
    ) -> Self {
        Self {
            triage_decision: disposition,
            needs_response: true,
            drafted_response: Some(draft),
            session_id: Some(session_id),
            message: message.into(),
        }
    }

    /// 处理失败结论（会话不受影响）
    pub fn error(message: impl Into<String>) -> Self {
        Self::stateless(Disposition::Error, message)
    }
}

/// 分诊错误分类
///
/// 三类都上报直接调用方、都不会让进程崩溃；Provider 失败不留下半提交状态。
#[derive(Error, Debug)]
pub enum TriageError {
    /// 推理调用失败或返回不可用内容；不在本层重试
    #[error("reasoning provider failed: {0}")]
    Provider(#[from] LlmError),

    /// 未知/已终结的会话 ID（调用方误用，非系统故障）
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// 必填邮件字段缺失或为空
    #[error("malformed input: {0}")]
    MalformedInput(String),
}
