//! Account operations

use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::Account;

const ACCOUNT_COLUMNS: &str = "id, name, account_type, user_id, created_at";

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    let created_at_str: String = row.get(4)?;
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        account_type: row.get(2)?,
        user_id: row.get(3)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Create an account owned by `user_id`, returning its id
    pub fn create_account(&self, name: &str, account_type: &str, user_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO accounts (name, account_type, user_id) VALUES (?, ?, ?)",
            params![name, account_type, user_id],
        )?;

        let id = conn.last_insert_rowid();
        info!(account_id = id, name, "Created account");
        Ok(id)
    }

    /// List a user's accounts
    pub fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts WHERE user_id = ? ORDER BY id",
            ACCOUNT_COLUMNS
        ))?;

        let accounts = stmt
            .query_map(params![user_id], row_to_account)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Get an account by ID
    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;
        let account = conn
            .query_row(
                &format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS),
                params![id],
                row_to_account,
            )
            .optional()?;

        Ok(account)
    }

    /// Rename an account / change its type. Returns false if it doesn't exist.
    pub fn update_account(&self, id: i64, name: &str, account_type: &str) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE accounts SET name = ?, account_type = ? WHERE id = ?",
            params![name, account_type, id],
        )?;
        Ok(changed == 1)
    }

    /// Delete an account and all its transactions
    ///
    /// Returns the number of transactions removed, or `None` if the account
    /// did not exist (nothing is deleted in that case).
    pub fn delete_account(&self, id: i64) -> Result<Option<usize>> {
        let mut conn = self.conn()?;
        // Dropping `tx` without commit rolls back
        let tx = conn.transaction()?;

        let removed_account = tx.execute("DELETE FROM accounts WHERE id = ?", params![id])?;
        if removed_account == 0 {
            return Ok(None);
        }
        let removed_txns = tx.execute("DELETE FROM transactions WHERE account_id = ?", params![id])?;

        tx.commit()?;
        info!(account_id = id, transactions = removed_txns, "Deleted account");
        Ok(Some(removed_txns))
    }
}
