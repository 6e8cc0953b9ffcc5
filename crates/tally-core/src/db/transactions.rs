//! Transaction operations

use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tracing::{debug, info};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Confidence, NewTransaction, Transaction};

const TRANSACTION_COLUMNS: &str =
    "id, account_id, user_id, date, amount, description, category, confidence, original_data, created_at";

pub(super) fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let confidence_str: String = row.get(7)?;
    let original_data: Option<String> = row.get(8)?;
    let created_at_str: String = row.get(9)?;

    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        user_id: row.get(2)?,
        date: row.get(3)?,
        amount: row.get(4)?,
        description: row.get(5)?,
        category: row.get(6)?,
        confidence: confidence_str.parse().unwrap_or(Confidence::Low),
        original_data: original_data
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or(serde_json::Value::Null),
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Insert a batch of transactions for an account in a single SQLite transaction
    ///
    /// Returns the number of rows inserted.
    pub fn insert_transactions(
        &self,
        account_id: i64,
        user_id: &str,
        txs: &[NewTransaction],
    ) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO transactions (account_id, user_id, date, amount, description, category, confidence, original_data)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;

            for new_tx in txs {
                stmt.execute(params![
                    account_id,
                    user_id,
                    new_tx.date,
                    new_tx.amount,
                    new_tx.description,
                    new_tx.category,
                    new_tx.confidence.as_str(),
                    new_tx.original_data.to_string(),
                ])?;
            }
        }

        tx.commit()?;
        info!(account_id, count = txs.len(), "Inserted transactions");
        Ok(txs.len())
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE id = ?",
                    TRANSACTION_COLUMNS
                ),
                params![id],
                row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// List a user's transactions, optionally restricted to one account
    pub fn list_transactions(
        &self,
        user_id: &str,
        account_id: Option<i64>,
    ) -> Result<Vec<Transaction>> {
        self.query_transactions(user_id, account_id, false)
    }

    /// Transactions whose automatic category was Medium or Low confidence
    pub fn list_review_transactions(
        &self,
        user_id: &str,
        account_id: Option<i64>,
    ) -> Result<Vec<Transaction>> {
        self.query_transactions(user_id, account_id, true)
    }

    fn query_transactions(
        &self,
        user_id: &str,
        account_id: Option<i64>,
        review_only: bool,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut conditions = vec!["user_id = ?".to_string()];
        let mut values: Vec<rusqlite::types::Value> = vec![user_id.to_string().into()];

        if let Some(id) = account_id {
            conditions.push("account_id = ?".to_string());
            values.push(id.into());
        }
        if review_only {
            conditions.push("confidence IN (?, ?)".to_string());
            values.push(Confidence::Medium.as_str().to_string().into());
            values.push(Confidence::Low.as_str().to_string().into());
        }

        let sql = format!(
            "SELECT {} FROM transactions WHERE {} ORDER BY date, id",
            TRANSACTION_COLUMNS,
            conditions.join(" AND ")
        );
        debug!(sql = %sql, "Querying transactions");

        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params_from_iter(values), row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Correct a transaction's category. The user's choice is trusted, so
    /// confidence becomes High. Returns false if the transaction doesn't exist.
    pub fn update_transaction_category(&self, id: i64, category: &str) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE transactions SET category = ?, confidence = ? WHERE id = ?",
            params![category, Confidence::High.as_str(), id],
        )?;
        Ok(changed == 1)
    }

    /// Most recent transactions of an account, newest first
    pub fn recent_transactions(
        &self,
        account_id: i64,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE account_id = ? AND user_id = ? ORDER BY date DESC, id DESC LIMIT ?",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![account_id, user_id, limit as i64], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Dated expenses of an account, oldest first
    pub fn expenses_for_account(&self, account_id: i64, user_id: &str) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions
             WHERE account_id = ? AND user_id = ? AND amount < 0 AND date != ''
             ORDER BY date, id",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![account_id, user_id], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}
