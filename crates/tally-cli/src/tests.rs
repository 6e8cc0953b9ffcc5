//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::PathBuf;

use clap::Parser;
use tally_core::db::Database;
use tally_core::models::{Confidence, NewTransaction, PLACEHOLDER_USER};

use crate::cli::{AccountsAction, Cli, Commands};
use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn create_test_account(db: &Database) -> i64 {
    db.create_account("Test", "savings", PLACEHOLDER_USER).unwrap()
}

fn insert_test_transaction(db: &Database, account_id: i64, description: &str, amount: f64) -> i64 {
    db.insert_transactions(
        account_id,
        PLACEHOLDER_USER,
        &[NewTransaction {
            date: "2024-01-01T00:00:00".into(),
            amount,
            description: description.into(),
            category: "Miscellaneous".into(),
            confidence: Confidence::Low,
            original_data: serde_json::Value::Null,
        }],
    )
    .unwrap();
    db.list_transactions(PLACEHOLDER_USER, Some(account_id))
        .unwrap()
        .into_iter()
        .find(|t| t.description == description)
        .unwrap()
        .id
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_serve_defaults() {
    let cli = Cli::try_parse_from(["tally", "serve"]).unwrap();
    match cli.command {
        Commands::Serve { port, host } => {
            assert_eq!(port, 8000);
            assert_eq!(host, "127.0.0.1");
        }
        _ => panic!("expected serve"),
    }
}

#[test]
fn test_parse_global_db_flag_after_subcommand() {
    let cli = Cli::try_parse_from(["tally", "summary", "3", "--db", "/tmp/x.db", "-v"]).unwrap();
    assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Summary { account: 3 }));
}

#[test]
fn test_parse_import() {
    let cli =
        Cli::try_parse_from(["tally", "import", "--file", "jan.csv", "--account", "2"]).unwrap();
    match cli.command {
        Commands::Import { file, account } => {
            assert_eq!(file, PathBuf::from("jan.csv"));
            assert_eq!(account, 2);
        }
        _ => panic!("expected import"),
    }

    assert!(Cli::try_parse_from(["tally", "import", "--file", "jan.csv"]).is_err());
}

#[test]
fn test_parse_accounts_actions() {
    let cli = Cli::try_parse_from(["tally", "accounts"]).unwrap();
    assert!(matches!(cli.command, Commands::Accounts { action: None }));

    let cli = Cli::try_parse_from(["tally", "accounts", "rename", "4", "Card", "credit"]).unwrap();
    match cli.command {
        Commands::Accounts {
            action:
                Some(AccountsAction::Rename {
                    id,
                    name,
                    account_type,
                }),
        } => {
            assert_eq!(id, 4);
            assert_eq!(name, "Card");
            assert_eq!(account_type, "credit");
        }
        _ => panic!("expected accounts rename"),
    }
}

#[test]
fn test_parse_ask_joins_words() {
    let cli = Cli::try_parse_from(["tally", "ask", "1", "how", "much", "on", "food?"]).unwrap();
    match cli.command {
        Commands::Ask { account, question } => {
            assert_eq!(account, 1);
            assert_eq!(question.join(" "), "how much on food?");
        }
        _ => panic!("expected ask"),
    }

    assert!(Cli::try_parse_from(["tally", "ask", "1"]).is_err());
}

#[test]
fn test_parse_review_optional_account() {
    let cli = Cli::try_parse_from(["tally", "review"]).unwrap();
    assert!(matches!(cli.command, Commands::Review { account: None }));

    let cli = Cli::try_parse_from(["tally", "review", "--account", "7"]).unwrap();
    assert!(matches!(cli.command, Commands::Review { account: Some(7) }));
}

// ========== Database Path Tests ==========

#[test]
fn test_resolve_db_path() {
    let explicit = PathBuf::from("/data/finance.db");
    assert_eq!(commands::resolve_db_path(Some(&explicit)), explicit);

    let default = commands::resolve_db_path(None);
    assert!(default.ends_with("tally.db"));
}

#[test]
fn test_open_db_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tally.db");

    let db = commands::open_db(&path).unwrap();
    assert!(path.exists());
    assert!(db.list_accounts(PLACEHOLDER_USER).unwrap().is_empty());
}

// ========== Account Command Tests ==========

#[test]
fn test_cmd_accounts_lifecycle() {
    let db = setup_test_db();
    assert!(commands::cmd_accounts_list(&db).is_ok());

    commands::cmd_accounts_add(&db, "HDFC Savings", "savings").unwrap();
    let accounts = db.list_accounts(PLACEHOLDER_USER).unwrap();
    assert_eq!(accounts.len(), 1);
    let id = accounts[0].id;
    assert!(commands::cmd_accounts_list(&db).is_ok());

    commands::cmd_accounts_rename(&db, id, "HDFC Salary", "salary").unwrap();
    assert_eq!(db.get_account(id).unwrap().unwrap().name, "HDFC Salary");

    insert_test_transaction(&db, id, "tea", -10.0);
    commands::cmd_accounts_delete(&db, id).unwrap();
    assert!(db.get_account(id).unwrap().is_none());
    assert!(db.list_transactions(PLACEHOLDER_USER, None).unwrap().is_empty());
}

#[test]
fn test_cmd_accounts_errors() {
    let db = setup_test_db();
    assert!(commands::cmd_accounts_add(&db, "  ", "savings").is_err());
    assert!(commands::cmd_accounts_rename(&db, 99, "x", "y").is_err());
    assert!(commands::cmd_accounts_delete(&db, 99).is_err());
}

// ========== Import Command Tests ==========

#[test]
fn test_cmd_import() {
    let db = setup_test_db();
    let account_id = create_test_account(&db);

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("statement.csv");
    std::fs::write(
        &file,
        "Date,Description,Amount,Type\n\
         01/03/2024,Swiggy order,450.00,DR\n\
         02/03/2024,Mystery shop,99.00,DR\n",
    )
    .unwrap();

    commands::cmd_import(&db, &file, account_id).unwrap();

    let stored = db.list_transactions(PLACEHOLDER_USER, Some(account_id)).unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|t| t.amount < 0.0));
}

#[test]
fn test_cmd_import_errors() {
    let db = setup_test_db();
    let account_id = create_test_account(&db);
    let dir = tempfile::tempdir().unwrap();

    // Unknown account
    let file = dir.path().join("ok.csv");
    std::fs::write(&file, "Date,Description,Amount\n01/03/2024,tea,10\n").unwrap();
    assert!(commands::cmd_import(&db, &file, account_id + 100).is_err());

    // Header only
    let empty = dir.path().join("empty.csv");
    std::fs::write(&empty, "Date,Description,Amount\n").unwrap();
    let err = commands::cmd_import(&db, &empty, account_id).unwrap_err();
    assert_eq!(err.to_string(), "No records to save.");

    // Missing file
    assert!(commands::cmd_import(&db, &dir.path().join("nope.csv"), account_id).is_err());
}

#[test]
fn test_cmd_categorize() {
    assert!(commands::cmd_categorize("UPI/123/Ride/uber@axis").is_ok());
}

// ========== Analytics Command Tests ==========

#[test]
fn test_cmd_summary_and_subscriptions() {
    let db = setup_test_db();
    let account_id = create_test_account(&db);
    insert_test_transaction(&db, account_id, "NETFLIX", -649.0);

    assert!(commands::cmd_summary(&db, account_id).is_ok());
    assert!(commands::cmd_subscriptions(&db, account_id).is_ok());
}

#[test]
fn test_cmd_review_and_recategorize() {
    let db = setup_test_db();
    let account_id = create_test_account(&db);
    let tx_id = insert_test_transaction(&db, account_id, "Mystery shop", -99.0);

    assert!(commands::cmd_review(&db, Some(account_id)).is_ok());

    commands::cmd_recategorize(&db, tx_id, "Shopping").unwrap();
    let tx = db.get_transaction(tx_id).unwrap().unwrap();
    assert_eq!(tx.category, "Shopping");
    assert_eq!(tx.confidence, Confidence::High);
    assert!(db
        .list_review_transactions(PLACEHOLDER_USER, Some(account_id))
        .unwrap()
        .is_empty());

    assert!(commands::cmd_recategorize(&db, 9999, "Food").is_err());
    assert!(commands::cmd_recategorize(&db, tx_id, " ").is_err());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer description", 10), "a much ...");
    assert_eq!(truncate("₹₹₹₹₹₹", 5), "₹₹...");
}
