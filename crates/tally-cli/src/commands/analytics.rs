//! Analytics command implementations

use anyhow::{bail, Result};
use tally_core::db::Database;
use tally_core::models::PLACEHOLDER_USER;

use super::truncate;

pub fn cmd_summary(db: &Database, account_id: i64) -> Result<()> {
    let summary = db.summary(account_id, PLACEHOLDER_USER)?;
    let by_category = db.spending_by_category(account_id, PLACEHOLDER_USER)?;

    println!();
    println!("📊 Account {} Summary", account_id);
    println!("   ─────────────────────────────");
    println!("   Transactions:  {}", summary.transaction_count);
    println!("   Spending:      {:>12.2}", summary.total_spending);
    println!("   Income:        {:>12.2}", summary.total_income);
    println!("   Net cash flow: {:>12.2}", summary.net_cash_flow);

    if !by_category.is_empty() {
        println!();
        println!("   Spending by category");
        for row in by_category {
            println!("   {:24} {:>12.2}", truncate(&row.category, 24), row.total);
        }
    }

    Ok(())
}

pub fn cmd_subscriptions(db: &Database, account_id: i64) -> Result<()> {
    let subscriptions = db.subscriptions(account_id, PLACEHOLDER_USER)?;

    if subscriptions.is_empty() {
        println!("No recurring monthly charges found for account {}.", account_id);
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Charges");
    println!("   ─────────────────────────────────────────────────────────────");
    for sub in subscriptions {
        println!(
            "   {:20} │ {:>10.2} │ {:>2} charges │ last {}",
            truncate(&sub.merchant, 20),
            sub.avg_amount,
            sub.transaction_count,
            sub.last_payment_date
        );
    }

    Ok(())
}

pub fn cmd_review(db: &Database, account_id: Option<i64>) -> Result<()> {
    let transactions = db.list_review_transactions(PLACEHOLDER_USER, account_id)?;

    if transactions.is_empty() {
        println!("✅ Nothing to review.");
        return Ok(());
    }

    println!();
    println!("🔎 {} transactions need review", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for tx in transactions {
        let date = tx.date.get(..10).unwrap_or("?");
        println!(
            "   {:>5} │ {:10} │ {:30} │ {:>10.2} │ {} ({})",
            tx.id,
            date,
            truncate(&tx.description, 30),
            tx.amount,
            tx.category,
            tx.confidence
        );
    }
    println!();
    println!("Fix one with: tally recategorize <id> <category>");

    Ok(())
}

pub fn cmd_recategorize(db: &Database, id: i64, category: &str) -> Result<()> {
    let category = category.trim();
    if category.is_empty() {
        bail!("Category must not be empty");
    }
    if !db.update_transaction_category(id, category)? {
        bail!("Transaction not found: {}", id);
    }
    println!("✅ Transaction {} is now {}", id, category);
    Ok(())
}
