//! Account command implementations

use anyhow::{bail, Result};
use tally_core::db::Database;
use tally_core::models::PLACEHOLDER_USER;

use super::truncate;

pub fn cmd_accounts_list(db: &Database) -> Result<()> {
    let accounts = db.list_accounts(PLACEHOLDER_USER)?;

    if accounts.is_empty() {
        println!("No accounts yet. Create one with:");
        println!("  tally accounts add \"HDFC Savings\" savings");
        return Ok(());
    }

    println!();
    println!("🏦 Accounts");
    println!("   ─────────────────────────────────────────────");
    for account in accounts {
        println!(
            "   {:>4} │ {:24} │ {}",
            account.id,
            truncate(&account.name, 24),
            account.account_type
        );
    }

    Ok(())
}

pub fn cmd_accounts_add(db: &Database, name: &str, account_type: &str) -> Result<()> {
    if name.trim().is_empty() || account_type.trim().is_empty() {
        bail!("Account name and type must not be empty");
    }

    let id = db.create_account(name.trim(), account_type.trim(), PLACEHOLDER_USER)?;
    println!("✅ Created account {} (id {})", name.trim(), id);
    Ok(())
}

pub fn cmd_accounts_rename(db: &Database, id: i64, name: &str, account_type: &str) -> Result<()> {
    if !db.update_account(id, name.trim(), account_type.trim())? {
        bail!("Account not found: {}", id);
    }
    println!("✅ Updated account {}", id);
    Ok(())
}

pub fn cmd_accounts_delete(db: &Database, id: i64) -> Result<()> {
    let Some(removed) = db.delete_account(id)? else {
        bail!("Account not found: {}", id);
    };
    println!(
        "🗑️  Account and {} associated transactions deleted successfully.",
        removed
    );
    Ok(())
}
