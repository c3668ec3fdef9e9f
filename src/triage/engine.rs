//! 分诊引擎（编排）
//!
//! 其它组件只调用这里的 submit / decide。引擎持有 SessionStore 与 LlmClient，
//! 把两个入口映射到状态机转移上；会话状态的全部变更都走 store 的原子操作。

use std::sync::Arc;

use crate::llm::LlmClient;
use crate::session::{Session, SessionStore};
use crate::triage::machine::{self, IntakeOutcome};
use crate::triage::types::{Decision, Disposition, EmailContext, TriageError};

/// 分诊引擎：submit(email) → Decision，decide(session, approve) → Decision
pub struct TriageEngine {
    llm: Arc<dyn LlmClient>,
    store: SessionStore,
}

impl TriageEngine {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            store: SessionStore::new(),
        }
    }

    /// 当前待审批会话数（health 探针直读，无副作用）
    pub async fn open_sessions(&self) -> usize {
        self.store.len().await
    }

    /// 只读访问会话存储（探针与测试用）
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// 邮件入口：NEW → CLASSIFYING → 终态或挂起
    ///
    /// respond 结论会创建会话并返回会话 ID；fyi / discard 不落任何状态。
    pub async fn submit(&self, ctx: EmailContext) -> Result<Decision, TriageError> {
        ctx.validate()?;
        tracing::info!(author = %ctx.author, subject = %ctx.subject, "triaging email");

        match machine::classify(self.llm.as_ref(), &ctx).await? {
            IntakeOutcome::AwaitingApproval { draft } => {
                let id = self.store.create(ctx, draft.clone()).await;
                tracing::info!(session_id = %id, "draft ready, awaiting human approval");
                Ok(Decision::pending(
                    Disposition::Respond,
                    draft,
                    id,
                    "Email requires human approval for response",
                ))
            }
            IntakeOutcome::Fyi => {
                tracing::info!("email marked as FYI");
                Ok(Decision::stateless(
                    Disposition::Fyi,
                    "Email marked as FYI. No response needed.",
                ))
            }
            IntakeOutcome::Discard => {
                tracing::info!("email marked for discard");
                Ok(Decision::stateless(
                    Disposition::Discard,
                    "Email marked for discard.",
                ))
            }
        }
    }

    /// 审批入口：批准终结会话，否决重起草并保持同一会话 ID
    ///
    /// 同一会话上的 decide 调用彼此串行（跨 Provider 调用持每会话锁）；
    /// Provider 失败时会话原样保留在 AwaitingApproval。
    pub async fn decide(&self, session_id: &str, approve: bool) -> Result<Decision, TriageError> {
        let lock = self
            .store
            .session_lock(session_id)
            .await
            .ok_or_else(|| TriageError::SessionNotFound(session_id.to_string()))?;
        let _serial = lock.lock().await;

        // 锁到手后重查：并发批准可能已终结该会话
        let session = self
            .store
            .get(session_id)
            .await
            .ok_or_else(|| TriageError::SessionNotFound(session_id.to_string()))?;

        if approve {
            self.send_email(&session);
            self.store.remove(session_id).await;
            tracing::info!(session_id, "draft approved, session closed");
            return Ok(Decision::stateless(
                Disposition::Approved,
                "Email response has been sent successfully.",
            ));
        }

        let new_draft = machine::redraft(self.llm.as_ref(), &session.context).await?;
        let updated = self
            .store
            .update_draft(session_id, new_draft)
            .await
            .ok_or_else(|| TriageError::SessionNotFound(session_id.to_string()))?;

        tracing::info!(session_id, rejected_drafts = updated.history.len(), "draft rejected, new draft generated");
        Ok(Decision::pending(
            Disposition::Rejected,
            updated.draft,
            updated.id,
            "New email draft generated. Please review and approve.",
        ))
    }

    /// 发送已批准的回复。真实投递（SMTP 等）不在范围内，这里只记录日志。
    fn send_email(&self, session: &Session) {
        tracing::info!(
            to = %session.context.author,
            subject = %session.context.subject,
            "sending approved response (no-op)"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn ctx() -> EmailContext {
        EmailContext {
            author: "colleague@x.com".to_string(),
            to: "me@x.com".to_string(),
            subject: "Meeting request".to_string(),
            email_thread: "Can we meet this week?".to_string(),
        }
    }

    fn engine(mock: MockLlmClient) -> TriageEngine {
        TriageEngine::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_fyi_submit_creates_no_session() {
        let e = engine(MockLlmClient::scripted(["This is FYI, no response needed."]));
        let d = e.submit(ctx()).await.unwrap();

        assert_eq!(d.triage_decision, Disposition::Fyi);
        assert!(!d.needs_response);
        assert!(d.session_id.is_none());
        assert_eq!(e.open_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_respond_submit_opens_session() {
        let e = engine(MockLlmClient::scripted([
            "Respond.\nprofessional response:\nThanks, will follow up.\n",
        ]));
        let d = e.submit(ctx()).await.unwrap();

        assert_eq!(d.triage_decision, Disposition::Respond);
        assert!(d.needs_response);
        assert_eq!(d.drafted_response.as_deref(), Some("Thanks, will follow up."));
        assert!(d.session_id.is_some());
        assert_eq!(e.open_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_approve_closes_session_then_not_found() {
        let e = engine(MockLlmClient::scripted([
            "professional response:\nSee you there.",
        ]));
        let id = e.submit(ctx()).await.unwrap().session_id.unwrap();

        let d = e.decide(&id, true).await.unwrap();
        assert_eq!(d.triage_decision, Disposition::Approved);
        assert!(!d.needs_response);
        assert!(d.drafted_response.is_none());
        assert_eq!(e.open_sessions().await, 0);

        let err = e.decide(&id, true).await.unwrap_err();
        assert!(matches!(err, TriageError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_reject_keeps_id_and_replaces_draft() {
        let e = engine(MockLlmClient::scripted([
            "professional response:\nFirst draft.",
            "Second draft, rewritten.",
        ]));
        let id = e.submit(ctx()).await.unwrap().session_id.unwrap();

        let d = e.decide(&id, false).await.unwrap();
        assert_eq!(d.triage_decision, Disposition::Rejected);
        assert!(d.needs_response);
        assert_eq!(d.session_id.as_deref(), Some(id.as_str()));
        assert_eq!(d.drafted_response.as_deref(), Some("Second draft, rewritten."));
        // 仍然在途，可继续批准
        assert_eq!(e.open_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_reject_provider_error_leaves_session_intact() {
        // 入口成功，之后的重起草调用全部失败
        let e = engine(MockLlmClient::failing_after([
            "professional response:\nOnly draft.",
        ]));
        let id = e.submit(ctx()).await.unwrap().session_id.unwrap();

        let err = e.decide(&id, false).await.unwrap_err();
        assert!(matches!(err, TriageError::Provider(_)));

        // 会话原样保留：草稿未变，仍可批准
        let s = e.store().get(&id).await.unwrap();
        assert_eq!(s.draft, "Only draft.");
        assert!(s.history.is_empty());
        let d = e.decide(&id, true).await.unwrap();
        assert_eq!(d.triage_decision, Disposition::Approved);
    }

    #[tokio::test]
    async fn test_malformed_input_rejected_before_machine() {
        let mock = MockLlmClient::new();
        let e = engine(mock);
        let mut c = ctx();
        c.email_thread = String::new();

        let err = e.submit(c).await.unwrap_err();
        assert!(matches!(err, TriageError::MalformedInput(_)));
        // 状态机未运行，Provider 未被调用
        assert_eq!(e.open_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_rejections_serialized() {
        let e = Arc::new(engine(MockLlmClient::scripted([
            "professional response:\nInitial.",
            "Rewrite A.",
            "Rewrite B.",
        ])));
        let id = e.submit(ctx()).await.unwrap().session_id.unwrap();

        let (e1, e2) = (Arc::clone(&e), Arc::clone(&e));
        let (id1, id2) = (id.clone(), id.clone());
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { e1.decide(&id1, false).await }),
            tokio::spawn(async move { e2.decide(&id2, false).await }),
        );
        let d1 = r1.unwrap().unwrap();
        let d2 = r2.unwrap().unwrap();

        // 两次否决都成功且指向同一会话
        assert_eq!(d1.session_id.as_deref(), Some(id.as_str()));
        assert_eq!(d2.session_id.as_deref(), Some(id.as_str()));

        // 串行化后当前草稿恰好是两次返回之一，不是拼接垃圾
        let session = e.store().get(&id).await.unwrap();
        let returned = [d1.drafted_response.unwrap(), d2.drafted_response.unwrap()];
        assert!(returned.contains(&session.draft));
        // 初稿 + 第一轮否决稿都进了历史
        assert_eq!(session.history.len(), 2);
    }
}
