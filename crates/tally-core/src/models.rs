//! Domain models for Tally

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner of every account and transaction until real users exist
pub const PLACEHOLDER_USER: &str = "placeholder_user";

/// Category assigned when no rule matches
pub const DEFAULT_CATEGORY: &str = "Miscellaneous";

/// A bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    #[serde(rename = "account_name")]
    pub name: String,
    pub account_type: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Trust level attached to an automatic category assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Whether a transaction with this confidence should be shown for review
    pub fn needs_review(&self) -> bool {
        !matches!(self, Self::High)
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Unknown confidence: {}", s)),
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub user_id: String,
    /// ISO `YYYY-MM-DDTHH:MM:SS`, or empty when the statement date was unreadable
    pub date: String,
    /// Negative for expenses
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub confidence: Confidence,
    /// Raw CSV row as header -> cell
    pub original_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// A normalized transaction ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: String,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub confidence: Confidence,
    pub original_data: serde_json::Value,
}

/// Account-level totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Sum of expenses, reported as a positive number
    pub total_spending: f64,
    pub total_income: f64,
    pub net_cash_flow: f64,
    pub transaction_count: i64,
}

/// Expense total for one category (positive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: String,
    pub total: f64,
}

/// A merchant flagged as a recurring monthly payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub merchant: String,
    pub transaction_count: usize,
    /// Mean of the signed amounts, so negative for charges
    pub avg_amount: f64,
    pub last_payment_date: String,
}
