//! LLM command implementations

use anyhow::{bail, Result};
use tally_core::ai::{AIBackend, AIClient};
use tally_core::assistant::Assistant;
use tally_core::db::Database;

pub async fn cmd_ask(db: &Database, account_id: i64, question: &str) -> Result<()> {
    let ai = AIClient::from_env();
    if ai.is_none() {
        println!("💡 Tip: Set GOOGLE_API_KEY or OLLAMA_HOST to enable questions");
    }

    let answer = Assistant::new(db, ai.as_ref())
        .answer(account_id, question)
        .await?;
    println!("{}", answer);
    Ok(())
}

pub async fn cmd_models() -> Result<()> {
    let Some(client) = AIClient::from_env() else {
        bail!("No AI backend configured (set GOOGLE_API_KEY, OLLAMA_HOST or OPENAI_COMPATIBLE_HOST)");
    };

    println!("🤖 {} at {} (using {})", client.kind(), client.host(), client.model());
    for model in client.list_models().await? {
        let marker = if model == client.model() { "*" } else { " " };
        println!("   {} {}", marker, model);
    }
    Ok(())
}
