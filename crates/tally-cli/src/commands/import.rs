//! Import and categorization command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use tally_core::categorize::Categorizer;
use tally_core::db::Database;
use tally_core::import::parse_csv_file;
use tally_core::models::PLACEHOLDER_USER;
use tracing::warn;

/// Rules from the data-dir override, else the built-in table
fn load_categorizer() -> Categorizer {
    Categorizer::new().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load category rules, using built-in rules");
        Categorizer::default()
    })
}

pub fn cmd_import(db: &Database, file: &Path, account_id: i64) -> Result<()> {
    let Some(account) = db.get_account(account_id)? else {
        bail!("Account not found: {}", account_id);
    };

    println!("📥 Importing {} into {}...", file.display(), account.name);

    let categorizer = load_categorizer();
    let parsed = parse_csv_file(file, &categorizer)
        .with_context(|| format!("Failed to process the CSV file {}", file.display()))?;

    if parsed.realigned {
        println!("   Repaired a shifted header row");
    }
    if parsed.transactions.is_empty() {
        bail!("No records to save.");
    }

    let count = db.insert_transactions(account_id, PLACEHOLDER_USER, &parsed.transactions)?;
    let review = parsed
        .transactions
        .iter()
        .filter(|t| t.confidence.needs_review())
        .count();

    println!("✅ Successfully uploaded and saved {} transactions.", count);
    if review > 0 {
        println!(
            "   {} need a category check. Run 'tally review --account {}'",
            review, account_id
        );
    }

    Ok(())
}

pub fn cmd_categorize(description: &str) -> Result<()> {
    let categorizer = load_categorizer();
    let result = categorizer.categorize(description);

    println!("{} ({})", result.category, result.confidence);
    Ok(())
}
