//! Read-side aggregations over stored transactions

use rusqlite::params;

use super::Database;
use crate::detect::{detect_subscriptions, DetectionConfig};
use crate::error::Result;
use crate::models::{CategorySpending, Subscription, Summary};

impl Database {
    /// Spending/income totals for an account
    ///
    /// Accounts without transactions get an all-zero summary.
    pub fn summary(&self, account_id: i64, user_id: &str) -> Result<Summary> {
        let conn = self.conn()?;
        let (spent, income, count): (f64, f64, i64) = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN amount < 0 THEN amount ELSE 0 END), 0.0),
                COALESCE(SUM(CASE WHEN amount > 0 THEN amount ELSE 0 END), 0.0),
                COUNT(*)
            FROM transactions
            WHERE account_id = ? AND user_id = ?
            "#,
            params![account_id, user_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(Summary {
            total_spending: spent.abs(),
            total_income: income,
            net_cash_flow: income + spent,
            transaction_count: count,
        })
    }

    /// Expense totals per category, largest first
    pub fn spending_by_category(
        &self,
        account_id: i64,
        user_id: &str,
    ) -> Result<Vec<CategorySpending>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category, -SUM(amount) AS total
            FROM transactions
            WHERE account_id = ? AND user_id = ? AND amount < 0
            GROUP BY category
            ORDER BY total DESC, category
            "#,
        )?;

        let rows = stmt
            .query_map(params![account_id, user_id], |row| {
                Ok(CategorySpending {
                    category: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Recurring monthly charges for an account
    pub fn subscriptions(&self, account_id: i64, user_id: &str) -> Result<Vec<Subscription>> {
        self.subscriptions_with_config(account_id, user_id, &DetectionConfig::default())
    }

    pub fn subscriptions_with_config(
        &self,
        account_id: i64,
        user_id: &str,
        config: &DetectionConfig,
    ) -> Result<Vec<Subscription>> {
        let expenses = self.expenses_for_account(account_id, user_id)?;
        Ok(detect_subscriptions(&expenses, config))
    }
}
