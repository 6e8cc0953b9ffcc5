//! Tally CLI - Personal finance tracker
//!
//! Usage:
//!   tally accounts add "HDFC Savings" savings   Create an account
//!   tally import --file CSV --account 1         Import a bank statement
//!   tally summary 1                             Totals for an account
//!   tally serve --port 8000                     Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = commands::resolve_db_path(cli.db.as_deref());

    match cli.command {
        Commands::Serve { port, host } => commands::cmd_serve(&db_path, &host, port).await,
        Commands::Import { file, account } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_import(&db, &file, account)
        }
        Commands::Accounts { action } => {
            let db = commands::open_db(&db_path)?;
            match action {
                None | Some(AccountsAction::List) => commands::cmd_accounts_list(&db),
                Some(AccountsAction::Add { name, account_type }) => {
                    commands::cmd_accounts_add(&db, &name, &account_type)
                }
                Some(AccountsAction::Rename {
                    id,
                    name,
                    account_type,
                }) => commands::cmd_accounts_rename(&db, id, &name, &account_type),
                Some(AccountsAction::Delete { id }) => commands::cmd_accounts_delete(&db, id),
            }
        }
        Commands::Summary { account } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_summary(&db, account)
        }
        Commands::Subscriptions { account } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_subscriptions(&db, account)
        }
        Commands::Review { account } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_review(&db, account)
        }
        Commands::Recategorize { id, category } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_recategorize(&db, id, &category)
        }
        Commands::Categorize { description } => commands::cmd_categorize(&description),
        Commands::Ask { account, question } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_ask(&db, account, &question.join(" ")).await
        }
        Commands::Models => commands::cmd_models().await,
    }
}
