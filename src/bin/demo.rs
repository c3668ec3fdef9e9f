//! Sift 演示客户端
//!
//! 对运行中的服务依次演示：FYI 邮件、需回复邮件、否决一次、批准发送。
//! 启动服务：SIFT__LLM__PROVIDER=mock cargo run --bin sift
//! 运行演示：cargo run --bin sift-demo

use anyhow::Context;
use serde_json::{json, Value};

const BASE_URL: &str = "http://127.0.0.1:8000";

fn print_separator(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!(" {}", title);
    println!("{}", "=".repeat(60));
}

async fn triage(client: &reqwest::Client, email: Value) -> anyhow::Result<Value> {
    let resp = client
        .post(format!("{}/triage_email", BASE_URL))
        .json(&email)
        .send()
        .await
        .context("triage_email request failed")?;
    Ok(resp.json().await?)
}

async fn decide(client: &reqwest::Client, session_id: &str, approve: bool) -> anyhow::Result<Value> {
    let resp = client
        .post(format!("{}/triage_email_response", BASE_URL))
        .json(&json!({ "session_id": session_id, "approve_email": approve }))
        .send()
        .await
        .context("triage_email_response request failed")?;
    Ok(resp.json().await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = reqwest::Client::new();

    print_separator("Health Check");
    let health: Value = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .context("is the sift server running?")?
        .json()
        .await?;
    println!("{}", serde_json::to_string_pretty(&health)?);

    print_separator("FYI Email");
    let result = triage(
        &client,
        json!({
            "author": "hr@company.com",
            "to": "all@company.com",
            "subject": "Company Holiday Schedule Update",
            "email_thread": "The company will be closed on December 25th and January 1st."
        }),
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    print_separator("Email Requiring a Response");
    let result = triage(
        &client,
        json!({
            "author": "colleague@company.com",
            "to": "user@company.com",
            "subject": "Project Update Meeting Request",
            "email_thread": "Would you be available for a 30-minute call sometime this week?"
        }),
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    let Some(session_id) = result["session_id"].as_str().map(String::from) else {
        println!("\nNo approval session opened; demo ends here.");
        return Ok(());
    };

    print_separator("Reject the Draft (new draft generated)");
    let result = decide(&client, &session_id, false).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    print_separator("Approve the New Draft");
    let result = decide(&client, &session_id, true).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
