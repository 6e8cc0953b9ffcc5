//! Integration tests for tally-core
//!
//! These tests exercise the full import → store → analyze workflow.

use tally_core::{
    assistant::{Assistant, NO_TRANSACTIONS_ANSWER},
    categorize::Categorizer,
    db::Database,
    import::{parse_csv, parse_csv_file},
    models::{Confidence, PLACEHOLDER_USER},
    AIClient, Error,
};

/// A savings-account export with CR/DR markers, UPI descriptions and
/// two monthly Netflix charges
fn hdfc_style_csv() -> &'static str {
    "Date,Narration,Amount,Transaction Type\n\
     05/01/2024,UPI/400112345678/Payment/swiggy@ybl,450.00,DR\n\
     05/01/2024,NETFLIX SUBSCRIPTION,649.00,DR\n\
     07/01/2024,SALARY JAN,\"85,000.00\",CR\n\
     10/01/2024,CORNER CAFE,120.00,DR\n\
     15/01/2024,GADGET STORE,2999.00,DR\n\
     05/02/2024,NETFLIX SUBSCRIPTION,649.00,DR\n\
     06/02/2024,UPI/400198765432/Ride/uber@axis,230.50,DR\n"
}

#[test]
fn test_full_import_workflow() {
    let db = Database::in_memory().expect("Failed to create database");
    let categorizer = Categorizer::default();

    let parsed = parse_csv(hdfc_style_csv().as_bytes(), &categorizer).expect("Failed to parse CSV");
    assert_eq!(parsed.transactions.len(), 7);
    assert!(!parsed.realigned);

    let account_id = db
        .create_account("HDFC Savings", "savings", PLACEHOLDER_USER)
        .expect("Failed to create account");
    let inserted = db
        .insert_transactions(account_id, PLACEHOLDER_USER, &parsed.transactions)
        .expect("Failed to insert");
    assert_eq!(inserted, 7);

    let stored = db.list_transactions(PLACEHOLDER_USER, Some(account_id)).unwrap();
    assert_eq!(stored.len(), 7);

    let swiggy = stored
        .iter()
        .find(|t| t.description.contains("swiggy"))
        .unwrap();
    assert_eq!(swiggy.date, "2024-01-05T00:00:00");
    assert_eq!(swiggy.amount, -450.0);
    assert_eq!(swiggy.category, "Food");
    assert_eq!(swiggy.confidence, Confidence::High);
    assert_eq!(swiggy.original_data["Transaction Type"], "DR");

    let salary = stored.iter().find(|t| t.description == "SALARY JAN").unwrap();
    assert_eq!(salary.amount, 85_000.0);

    // Summary
    let summary = db.summary(account_id, PLACEHOLDER_USER).unwrap();
    assert_eq!(summary.transaction_count, 7);
    assert_eq!(summary.total_income, 85_000.0);
    assert!((summary.total_spending - 5097.5).abs() < 1e-9);
    assert!((summary.net_cash_flow - 79_902.5).abs() < 1e-9);

    // Subscriptions: only Netflix repeats monthly
    let subs = db.subscriptions(account_id, PLACEHOLDER_USER).unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].merchant, "netflix");
    assert_eq!(subs[0].transaction_count, 2);
    assert_eq!(subs[0].last_payment_date, "2024-02-05T00:00:00");
}

#[test]
fn test_review_workflow() {
    let db = Database::in_memory().unwrap();
    let categorizer = Categorizer::default();
    let account_id = db.create_account("Card", "credit", PLACEHOLDER_USER).unwrap();

    let parsed = parse_csv(hdfc_style_csv().as_bytes(), &categorizer).unwrap();
    db.insert_transactions(account_id, PLACEHOLDER_USER, &parsed.transactions)
        .unwrap();

    let review = db
        .list_review_transactions(PLACEHOLDER_USER, Some(account_id))
        .unwrap();
    let gadget = review
        .iter()
        .find(|t| t.description == "GADGET STORE")
        .expect("unmatched description should need review");
    assert_eq!(gadget.category, "Miscellaneous");
    assert_eq!(gadget.confidence, Confidence::Low);

    assert!(db.update_transaction_category(gadget.id, "Shopping").unwrap());

    let review = db
        .list_review_transactions(PLACEHOLDER_USER, Some(account_id))
        .unwrap();
    assert!(review.iter().all(|t| t.description != "GADGET STORE"));

    let by_category = db.spending_by_category(account_id, PLACEHOLDER_USER).unwrap();
    let shopping = by_category.iter().find(|c| c.category == "Shopping").unwrap();
    assert_eq!(shopping.total, 2999.0);
}

#[test]
fn test_shifted_header_export() {
    // The header row is one cell off: "Date" sits over the CR/DR column
    let csv = "Description,Date,Transaction Type,Amount,UPI_Reference\n\
               Zepto order,DR,120.00,UPI123,02/03/2024\n\
               Refund,CR,50.00,UPI124,03/03/2024\n";

    let parsed = parse_csv(csv.as_bytes(), &Categorizer::default()).unwrap();
    assert!(parsed.realigned);
    assert_eq!(parsed.transactions.len(), 2);

    let zepto = &parsed.transactions[0];
    assert_eq!(zepto.date, "2024-03-02T00:00:00");
    assert_eq!(zepto.amount, -120.0);
    assert_eq!(zepto.category, "Groceries");

    assert_eq!(parsed.transactions[1].amount, 50.0);
}

#[test]
fn test_missing_columns_is_reported() {
    let csv = "When,Value Date,Memo\n01/01/2024,01/01/2024,hello\n";
    let err = parse_csv(csv.as_bytes(), &Categorizer::default()).unwrap_err();

    match err {
        Error::MissingColumns { missing, available } => {
            assert!(missing.contains(&"Amount".to_string()));
            assert!(missing.contains(&"Description".to_string()));
            assert_eq!(available, vec!["When", "Value Date", "Memo"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_parse_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statement.csv");
    std::fs::write(&path, hdfc_style_csv()).unwrap();

    let parsed = parse_csv_file(&path, &Categorizer::default()).unwrap();
    assert_eq!(parsed.transactions.len(), 7);
}

#[test]
fn test_delete_account_removes_its_transactions() {
    let db = Database::in_memory().unwrap();
    let account_id = db.create_account("Temp", "savings", PLACEHOLDER_USER).unwrap();
    let parsed = parse_csv(hdfc_style_csv().as_bytes(), &Categorizer::default()).unwrap();
    db.insert_transactions(account_id, PLACEHOLDER_USER, &parsed.transactions)
        .unwrap();

    assert_eq!(db.delete_account(account_id).unwrap(), Some(7));
    assert!(db.list_transactions(PLACEHOLDER_USER, None).unwrap().is_empty());
}

#[tokio::test]
async fn test_question_over_imported_statement() {
    let db = Database::in_memory().unwrap();
    let account_id = db.create_account("Q", "savings", PLACEHOLDER_USER).unwrap();
    let empty_id = db.create_account("Empty", "savings", PLACEHOLDER_USER).unwrap();
    let parsed = parse_csv(hdfc_style_csv().as_bytes(), &Categorizer::default()).unwrap();
    db.insert_transactions(account_id, PLACEHOLDER_USER, &parsed.transactions)
        .unwrap();

    let ai = AIClient::mock();
    let assistant = Assistant::new(&db, Some(&ai));

    let answer = assistant
        .answer(account_id, "How much did I spend on food?")
        .await
        .unwrap();
    assert_eq!(answer, "Reviewed 7 transactions.");

    let answer = assistant.answer(empty_id, "Anything?").await.unwrap();
    assert_eq!(answer, NO_TRANSACTIONS_ANSWER);
}

#[cfg(feature = "test-utils")]
#[tokio::test]
async fn test_question_through_http_backend() {
    use tally_core::test_utils::MockLlmServer;

    let server = MockLlmServer::start().await;
    let ai = AIClient::ollama(&server.url(), "llama3.2");

    let db = Database::in_memory().unwrap();
    let account_id = db.create_account("Q", "savings", PLACEHOLDER_USER).unwrap();
    let parsed = parse_csv(hdfc_style_csv().as_bytes(), &Categorizer::default()).unwrap();
    db.insert_transactions(account_id, PLACEHOLDER_USER, &parsed.transactions)
        .unwrap();

    let answer = Assistant::new(&db, Some(&ai))
        .answer(account_id, "Summarize")
        .await
        .unwrap();
    assert_eq!(answer, "Looked at 7 transactions.");
}
