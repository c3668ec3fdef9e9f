//! LLM 输出的确定性解析
//!
//! 分类只依赖固定 marker 短语的匹配（大小写不敏感），与 Provider 完全解耦、
//! 可独立单测。优先级：回复 marker > FYI marker > 丢弃（默认）。

/// 触发「需要回复」分支的 marker（任一命中即算；按整段文本匹配）
const RESPONSE_MARKERS: [&str; 3] = ["professional response:", "response:", "draft:"];

/// 触发「仅供参考」分支的 marker
const FYI_MARKERS: [&str; 2] = ["fyi", "no response"];

/// marker 后无草稿正文时的兜底致谢语
pub const FALLBACK_DRAFT: &str =
    "Thank you for your email. I will review this and get back to you shortly.";

/// 解析结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// 需要回复，附提取出的草稿
    Respond { draft: String },
    /// 仅供参考
    Fyi,
    /// 丢弃
    Discard,
}

/// 解析 LLM 的分诊输出
///
/// 回复 marker 先查：FYI 短语与回复 marker 同时出现时以回复为准。
pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();

    if RESPONSE_MARKERS.iter().any(|m| lower.contains(m)) {
        return Classification::Respond {
            draft: extract_draft(text),
        };
    }

    if FYI_MARKERS.iter().any(|m| lower.contains(m)) {
        return Classification::Fyi;
    }

    Classification::Discard
}

/// 提取首个 marker 行之后的全部行（逐行 trim），拼接为草稿；为空则回落兜底语
fn extract_draft(text: &str) -> String {
    let mut in_response = false;
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if !in_response {
            let lower = line.to_lowercase();
            if RESPONSE_MARKERS.iter().any(|m| lower.contains(m)) {
                in_response = true;
            }
            continue;
        }
        lines.push(line.trim());
    }

    let draft = lines.join("\n").trim().to_string();
    if draft.is_empty() {
        FALLBACK_DRAFT.to_string()
    } else {
        draft
    }
}

/// 从重起草回复中取草稿：有 marker 则取 marker 之后，否则取整段 trim 后的文本
pub fn draft_from_reply(text: &str) -> String {
    let lower = text.to_lowercase();
    if RESPONSE_MARKERS.iter().any(|m| lower.contains(m)) {
        return extract_draft(text);
    }

    let draft = text.trim().to_string();
    if draft.is_empty() {
        FALLBACK_DRAFT.to_string()
    } else {
        draft
    }
}
