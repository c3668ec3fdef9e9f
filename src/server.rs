//! HTTP 接入层（薄胶水）
//!
//! 两个语义操作 + 健康探针：
//! - POST /triage_email          提交邮件 → 分诊决策
//! - POST /triage_email_response 提交审批 → 更新后的决策
//! - GET  /health                存活 + 当前待审批会话数
//!
//! 错误一律映射为结构化 JSON：输入不合法 400、会话不存在 404、
//! Provider 失败返回 disposition=error 的决策体——从不向外抛裸异常。

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::triage::{Decision, EmailContext, TriageEngine, TriageError};

/// POST /triage_email 请求体
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub author: String,
    pub to: String,
    pub subject: String,
    pub email_thread: String,
}

/// POST /triage_email_response 请求体
#[derive(Debug, Deserialize)]
pub struct EmailApprovalRequest {
    pub session_id: String,
    pub approve_email: bool,
}

/// 构建路由；引擎作为共享状态注入
pub fn router(engine: Arc<TriageEngine>) -> Router {
    Router::new()
        .route("/triage_email", post(triage_email))
        .route("/triage_email_response", post(triage_email_response))
        .route("/health", get(health))
        .with_state(engine)
}

/// POST /triage_email：分诊一封邮件
async fn triage_email(
    State(engine): State<Arc<TriageEngine>>,
    Json(req): Json<EmailRequest>,
) -> Response {
    let ctx = EmailContext {
        author: req.author,
        to: req.to,
        subject: req.subject,
        email_thread: req.email_thread,
    };

    match engine.submit(ctx).await {
        Ok(decision) => Json(decision).into_response(),
        Err(e) => error_response(e, "Error processing email"),
    }
}

/// POST /triage_email_response：批准或否决草稿
async fn triage_email_response(
    State(engine): State<Arc<TriageEngine>>,
    Json(req): Json<EmailApprovalRequest>,
) -> Response {
    match engine.decide(&req.session_id, req.approve_email).await {
        Ok(decision) => Json(decision).into_response(),
        Err(e) => error_response(e, "Error processing response"),
    }
}

/// GET /health：进程存活 + 待审批会话数（直读 store，无副作用）
async fn health(State(engine): State<Arc<TriageEngine>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "pending_sessions": engine.open_sessions().await,
    }))
}

/// 错误 → 结构化响应
///
/// Provider 失败按契约仍返回 200 的决策体（disposition=error），
/// 调用方据此重试；另两类是客户端错误，带状态码与 detail。
fn error_response(err: TriageError, context: &str) -> Response {
    match err {
        TriageError::MalformedInput(msg) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "detail": msg })),
        )
            .into_response(),
        TriageError::SessionNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "detail": "Session not found" })),
        )
            .into_response(),
        TriageError::Provider(e) => {
            tracing::warn!(error = %e, "reasoning provider failed");
            Json(Decision::error(format!("{}: {}", context, e))).into_response()
        }
    }
}
