//! 分诊状态机
//!
//! 状态全部是可序列化数据（存在 Session 记录里），转移是普通函数：
//! 「挂起」= classify 返回 AwaitingApproval、由调用方持久化会话；
//! 「恢复」= 调用方拿着会话再调 redraft 或直接终结。整个系统唯一的
//! 挂起点是 AwaitingApproval。

use serde::{Deserialize, Serialize};

use crate::llm::LlmClient;
use crate::triage::classifier::{self, Classification};
use crate::triage::types::{EmailContext, TriageError};

/// 会话状态机的全部状态
///
/// NEW → CLASSIFYING → {FYI, DISCARD, AWAITING_APPROVAL}；
/// AWAITING_APPROVAL → APPROVED（终态）；
/// AWAITING_APPROVAL → DRAFTING → AWAITING_APPROVAL（否决后重起草）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    New,
    Classifying,
    Fyi,
    Discard,
    AwaitingApproval,
    Drafting,
    Approved,
}

/// classify 转移的产出：两个终态，或带初稿的挂起态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    Fyi,
    Discard,
    AwaitingApproval { draft: String },
}

/// 分诊 + 起草提示词（与 respond marker 约定配套）
pub fn intake_prompt(ctx: &EmailContext) -> String {
    format!(
        "Analyze the following email and determine the appropriate action:\n\n\
         Author: {}\n\
         To: {}\n\
         Subject: {}\n\
         Email Thread: {}\n\n\
         Determine if this email should be classified in one of the following categories:\n\
         1. FYI (no response needed)\n\
         2. Discard (spam/unimportant)\n\
         3. Respond (requires action)\n\n\
         If a response is needed, insert a line that says \"professional response:\" \
         and then draft a professional response starting on the next line.",
        ctx.author, ctx.to, ctx.subject, ctx.email_thread
    )
}

/// 重起草提示词：永远基于原始邮件上下文，而非上一版草稿
pub fn redraft_prompt(ctx: &EmailContext) -> String {
    format!(
        "Generate a new email response for:\n\n\
         Author: {}\n\
         Subject: {}\n\
         Email Thread: {}\n\n\
         Make sure it is professional and appropriate.",
        ctx.author, ctx.subject, ctx.email_thread
    )
}

/// NEW → CLASSIFYING → {FYI, DISCARD, AWAITING_APPROVAL}
///
/// Provider 失败原样上抛，不提交任何状态。
pub async fn classify(
    llm: &dyn LlmClient,
    ctx: &EmailContext,
) -> Result<IntakeOutcome, TriageError> {
    let text = llm.complete(&intake_prompt(ctx)).await?;
    tracing::debug!(chars = text.len(), "classification reply received");

    Ok(match classifier::classify(&text) {
        Classification::Respond { draft } => IntakeOutcome::AwaitingApproval { draft },
        Classification::Fyi => IntakeOutcome::Fyi,
        Classification::Discard => IntakeOutcome::Discard,
    })
}

/// AWAITING_APPROVAL → DRAFTING → AWAITING_APPROVAL：产出新草稿
///
/// Provider 失败原样上抛；调用方保持会话处于原 AwaitingApproval 状态。
pub async fn redraft(llm: &dyn LlmClient, ctx: &EmailContext) -> Result<String, TriageError> {
    let text = llm.complete(&redraft_prompt(ctx)).await?;
    Ok(classifier::draft_from_reply(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn ctx() -> EmailContext {
        EmailContext {
            author: "boss@x.com".to_string(),
            to: "me@x.com".to_string(),
            subject: "Quarterly numbers".to_string(),
            email_thread: "Please send the Q3 figures.".to_string(),
        }
    }

    #[test]
    fn test_intake_prompt_carries_all_fields() {
        let p = intake_prompt(&ctx());
        assert!(p.contains("boss@x.com"));
        assert!(p.contains("me@x.com"));
        assert!(p.contains("Quarterly numbers"));
        assert!(p.contains("professional response:"));
    }

    #[test]
    fn test_redraft_prompt_uses_original_context() {
        let p = redraft_prompt(&ctx());
        assert!(p.contains("Please send the Q3 figures."));
        // 重起草不引用旧草稿
        assert!(!p.to_lowercase().contains("previous draft"));
    }

    #[tokio::test]
    async fn test_classify_maps_parser_branches() {
        let llm = MockLlmClient::scripted(["This is FYI, no response needed."]);
        assert_eq!(classify(&llm, &ctx()).await.unwrap(), IntakeOutcome::Fyi);

        let llm = MockLlmClient::scripted(["professional response:\nOn it."]);
        assert_eq!(
            classify(&llm, &ctx()).await.unwrap(),
            IntakeOutcome::AwaitingApproval { draft: "On it.".to_string() }
        );
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let llm = MockLlmClient::failing();
        let err = classify(&llm, &ctx()).await.unwrap_err();
        assert!(matches!(err, TriageError::Provider(_)));
    }
}
