//! Mock LLM 客户端（用于测试与离线运行，无需 API）
//!
//! 支持预置脚本回复（按顺序出队）；脚本耗尽后回落到带计数器的默认草稿，
//! 保证每次重新起草的内容可区分。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError};

/// Mock 客户端：脚本回复队列 + 调用计数
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    fail: bool,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置脚本回复，complete 按顺序出队
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// 始终失败的客户端（测试 Provider 错误路径）
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// 脚本回复耗尽后开始失败（测试「先成功后失败」的序列）
    pub fn failing_after<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// 累计调用次数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(reply) = self.replies.lock().unwrap_or_else(|e| e.into_inner()).pop_front() {
            return Ok(reply);
        }

        if self.fail {
            return Err(LlmError::Request("mock failure".to_string()));
        }

        Ok(format!(
            "professional response:\nThank you for reaching out. I will look into this and follow up. (draft #{})",
            n
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let mock = MockLlmClient::scripted(["one", "two"]);
        assert_eq!(mock.complete("p").await.unwrap(), "one");
        assert_eq!(mock.complete("p").await.unwrap(), "two");
        // 脚本耗尽后回落到默认草稿
        assert!(mock.complete("p").await.unwrap().contains("draft #3"));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_client() {
        let mock = MockLlmClient::failing();
        assert!(mock.complete("p").await.is_err());
    }
}
