//! Natural-language questions about an account
//!
//! The model only sees the account's most recent transactions, rendered one per
//! line into a prompt template. The template is loaded with a two-layer
//! resolution: an override in the data dir
//! (~/.local/share/tally/prompts/answer_question.md), else the embedded default.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::ai::{AIBackend, AIClient};
use crate::db::Database;
use crate::error::Result;
use crate::models::{Transaction, PLACEHOLDER_USER};

/// Embedded default prompt template
const DEFAULT_PROMPT: &str = include_str!("../../../prompts/answer_question.md");

/// How many recent transactions are given to the model
pub const CONTEXT_TRANSACTIONS: usize = 40;

pub const NO_TRANSACTIONS_ANSWER: &str =
    "I couldn't find any transactions for this account to analyze.";
pub const FAILURE_ANSWER: &str = "Sorry, I encountered an error while analyzing your question.";

/// Prompt override path
pub fn prompt_override_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| {
        d.join("tally")
            .join("prompts")
            .join("answer_question.md")
    })
}

fn load_template() -> String {
    if let Some(path) = prompt_override_path() {
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => return content,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to read prompt override"),
            }
        }
    }
    DEFAULT_PROMPT.to_string()
}

/// One line per transaction
pub fn build_context(transactions: &[Transaction]) -> String {
    let mut context = String::new();
    for t in transactions {
        let date = if t.date.is_empty() { "N/A" } else { &t.date };
        let description = if t.description.is_empty() {
            "N/A"
        } else {
            &t.description
        };
        context.push_str(&format!(
            "- Date: {}, Description: {}, Amount: {:.2}, Category: {}\n",
            date, description, t.amount, t.category
        ));
    }
    context
}

/// Fill a prompt template with the transaction context and question
///
/// Placeholders are substituted in a single pass over the template, so
/// placeholder text inside a description or the question is left as is.
pub fn render_prompt(template: &str, context: &str, question: &str) -> String {
    let mut out = String::with_capacity(template.len() + context.len() + question.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{{transactions}}") {
            out.push_str(context.trim_end());
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{{question}}") {
            out.push_str(question.trim());
            rest = after;
        } else {
            out.push_str("{{");
            rest = &tail[2..];
        }
    }
    out.push_str(rest);
    out
}

/// Prompt from the configured template
pub fn build_prompt(context: &str, question: &str) -> String {
    render_prompt(&load_template(), context, question)
}

/// Answer `question` about an account with the configured template
pub async fn answer_question(
    db: &Database,
    ai: Option<&AIClient>,
    account_id: i64,
    question: &str,
) -> Result<String> {
    Assistant::new(db, ai).answer(account_id, question).await
}

/// Answers questions about an account's transactions
pub struct Assistant<'a> {
    db: &'a Database,
    ai: Option<&'a AIClient>,
    template: String,
}

impl<'a> Assistant<'a> {
    pub fn new(db: &'a Database, ai: Option<&'a AIClient>) -> Self {
        Self {
            db,
            ai,
            template: load_template(),
        }
    }

    /// Use a specific prompt template instead of the configured one
    pub fn with_template(mut self, template: &str) -> Self {
        self.template = template.to_string();
        self
    }

    /// Answer `question` using the account's recent transactions
    ///
    /// Model failures never surface as errors: the caller gets a fixed
    /// apology instead. Only database failures are returned as `Err`.
    pub async fn answer(&self, account_id: i64, question: &str) -> Result<String> {
        let transactions =
            self.db
                .recent_transactions(account_id, PLACEHOLDER_USER, CONTEXT_TRANSACTIONS)?;

        if transactions.is_empty() {
            return Ok(NO_TRANSACTIONS_ANSWER.to_string());
        }

        let Some(ai) = self.ai else {
            warn!("Question asked but no AI backend is configured");
            return Ok(FAILURE_ANSWER.to_string());
        };

        let prompt = render_prompt(&self.template, &build_context(&transactions), question);
        info!(
            account_id,
            transactions = transactions.len(),
            backend = ai.kind(),
            "Asking model about account"
        );

        match ai.generate(&prompt).await {
            Ok(answer) => Ok(answer),
            Err(e) => {
                warn!(error = %e, "Model call failed");
                Ok(FAILURE_ANSWER.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::models::{Confidence, NewTransaction};

    fn seed(db: &Database, account_id: i64, count: usize) {
        let txs: Vec<NewTransaction> = (0..count)
            .map(|i| NewTransaction {
                date: format!("2024-01-{:02}T00:00:00", (i % 28) + 1),
                amount: -(i as f64) - 1.0,
                description: format!("purchase {}", i),
                category: "Miscellaneous".into(),
                confidence: Confidence::Low,
                original_data: serde_json::json!({}),
            })
            .collect();
        db.insert_transactions(account_id, PLACEHOLDER_USER, &txs)
            .unwrap();
    }

    #[test]
    fn test_build_context_format() {
        let tx = Transaction {
            id: 1,
            account_id: 1,
            user_id: PLACEHOLDER_USER.into(),
            date: "2024-01-05T00:00:00".into(),
            amount: -450.0,
            description: "Swiggy".into(),
            category: "Food".into(),
            confidence: Confidence::High,
            original_data: serde_json::Value::Null,
            created_at: chrono::Utc::now(),
        };
        assert_eq!(
            build_context(&[tx]),
            "- Date: 2024-01-05T00:00:00, Description: Swiggy, Amount: -450.00, Category: Food\n"
        );
    }

    #[test]
    fn test_render_prompt_fills_placeholders() {
        let prompt = render_prompt(DEFAULT_PROMPT, "- Date: x\n", "  How much on food? ");
        assert!(prompt.contains("based ONLY on this data"));
        assert!(prompt.contains("- Date: x"));
        assert!(prompt.contains("User's Question: \"How much on food?\""));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_render_prompt_keeps_placeholders_in_data() {
        let template = "Data:\n{{transactions}}\nQ: {{question}} {{other}}";
        let context = "- Description: promo {{question}} code\n";
        let prompt = render_prompt(template, context, "what about {{transactions}}?");
        assert_eq!(
            prompt,
            "Data:\n- Description: promo {{question}} code\nQ: what about {{transactions}}? {{other}}"
        );
    }

    #[tokio::test]
    async fn test_no_transactions_answer() {
        let db = Database::in_memory().unwrap();
        let account = db.create_account("Empty", "savings", PLACEHOLDER_USER).unwrap();
        let ai = AIClient::mock();

        let answer = Assistant::new(&db, Some(&ai))
            .answer(account, "anything?")
            .await
            .unwrap();
        assert_eq!(answer, NO_TRANSACTIONS_ANSWER);
    }

    #[tokio::test]
    async fn test_context_is_capped() {
        let db = Database::in_memory().unwrap();
        let account = db.create_account("Busy", "savings", PLACEHOLDER_USER).unwrap();
        seed(&db, account, 55);
        let ai = AIClient::mock();

        let answer = Assistant::new(&db, Some(&ai))
            .with_template(DEFAULT_PROMPT)
            .answer(account, "what's up?")
            .await
            .unwrap();
        assert_eq!(answer, "Reviewed 40 transactions.");
    }

    #[tokio::test]
    async fn test_model_failure_is_apology() {
        let db = Database::in_memory().unwrap();
        let account = db.create_account("A", "savings", PLACEHOLDER_USER).unwrap();
        seed(&db, account, 3);
        let ai = AIClient::Mock(MockBackend::unhealthy());

        let answer = Assistant::new(&db, Some(&ai))
            .answer(account, "?")
            .await
            .unwrap();
        assert_eq!(answer, FAILURE_ANSWER);
    }

    #[tokio::test]
    async fn test_missing_backend_is_apology() {
        let db = Database::in_memory().unwrap();
        let account = db.create_account("A", "savings", PLACEHOLDER_USER).unwrap();
        seed(&db, account, 1);

        let answer = answer_question(&db, None, account, "?").await.unwrap();
        assert_eq!(answer, FAILURE_ANSWER);
    }
}
