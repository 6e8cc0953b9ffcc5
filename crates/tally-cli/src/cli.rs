//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Import bank statements and see where the money goes
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted personal finance tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (default: ~/.local/share/tally/tally.db)
    #[arg(long, env = "TALLY_DB_PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Import a CSV bank statement into an account
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Account ID to import into
        #[arg(short, long)]
        account: i64,
    },

    /// Manage accounts (list, add, rename, delete)
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Show spending, income and per-category totals for an account
    Summary {
        /// Account ID
        account: i64,
    },

    /// List recurring monthly charges of an account
    Subscriptions {
        /// Account ID
        account: i64,
    },

    /// List transactions whose category needs review
    Review {
        /// Only this account
        #[arg(short, long)]
        account: Option<i64>,
    },

    /// Set a transaction's category (marks it reviewed)
    Recategorize {
        /// Transaction ID
        id: i64,
        /// New category
        category: String,
    },

    /// Show how a description would be categorized
    Categorize {
        /// Raw statement description
        description: String,
    },

    /// Ask a question about an account's transactions
    Ask {
        /// Account ID
        account: i64,

        /// The question
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// List models on the configured LLM backend
    Models,
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// List accounts
    List,

    /// Add an account
    Add {
        /// Account name
        name: String,
        /// Account type (e.g. savings, credit)
        account_type: String,
    },

    /// Rename or retype an account
    Rename {
        /// Account ID
        id: i64,
        /// New name
        name: String,
        /// New account type
        account_type: String,
    },

    /// Delete an account and all its transactions
    Delete {
        /// Account ID
        id: i64,
    },
}
