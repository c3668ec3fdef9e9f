//! 会话存储
//!
//! 键值式管理所有「待审批」会话：一个会话只在草稿生成到批准之间存在，
//! fyi / discard 结论从不入库。所有操作对单个会话 ID 原子；跨 ID 无事务。
//! 每个会话另配一把串行锁（`session_lock`），供引擎在 decide 期间跨
//! Provider 调用保持互斥——两个并发否决不会交错出不一致的草稿。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::triage::{EmailContext, SessionState};

/// 一封「需要回复」邮件的在途记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// 不透明、不可猜测的会话 ID（uuid v4，122 位随机）
    pub id: String,
    /// 原始邮件上下文（入库后不可变；重起草永远基于它）
    pub context: EmailContext,
    /// 状态机当前状态（入库会话恒为 AwaitingApproval）
    pub state: SessionState,
    /// 当前草稿（任一时刻恰好一份；批准消费它，否决替换它）
    pub draft: String,
    /// 被否决的历史草稿，按时间序（审计用）
    pub history: Vec<String>,
    pub created_at: DateTime<Utc>,
}

struct Entry {
    session: Session,
    /// decide 期间的每会话串行锁
    lock: Arc<Mutex<()>>,
}

/// 内存会话存储
///
/// 由 TriageEngine 显式持有，随引擎创建/销毁；没有进程级全局状态。
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建 AwaitingApproval 会话（带初稿），返回新分配的会话 ID
    pub async fn create(&self, context: EmailContext, draft: String) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Session {
            id: id.clone(),
            context,
            state: SessionState::AwaitingApproval,
            draft,
            history: Vec::new(),
            created_at: Utc::now(),
        };

        self.sessions.write().await.insert(
            id.clone(),
            Entry {
                session,
                lock: Arc::new(Mutex::new(())),
            },
        );

        id
    }

    /// 读取会话快照
    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).map(|e| e.session.clone())
    }

    /// 用新草稿替换当前草稿（旧稿进 history），返回更新后的快照
    pub async fn update_draft(&self, id: &str, new_draft: String) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;

        let old = std::mem::replace(&mut entry.session.draft, new_draft);
        entry.session.history.push(old);
        entry.session.state = SessionState::AwaitingApproval;

        Some(entry.session.clone())
    }

    /// 移除会话；幂等，移除不存在的 ID 不是错误
    pub async fn remove(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    /// 当前在途（待审批）会话数
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// 取出某会话的串行锁句柄
    ///
    /// 持有者在锁内必须重查 `get`：锁到手时会话可能已被并发批准移除。
    pub async fn session_lock(&self, id: &str) -> Option<Arc<Mutex<()>>> {
        self.sessions.read().await.get(id).map(|e| Arc::clone(&e.lock))
    }
}
