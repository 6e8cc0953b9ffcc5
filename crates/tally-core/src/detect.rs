//! Recurring-payment (subscription) detection
//!
//! A fixed heuristic over an account's dated expenses:
//! - group by a first-token merchant name
//! - require a minimum number of charges
//! - require near-identical amounts (population standard deviation)
//! - require at least one monthly-looking gap between consecutive charges
//!
//! There is no seasonality or non-monthly cadence detection.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::models::{Subscription, Transaction};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Detection configuration
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Minimum charges from one merchant
    pub min_occurrences: usize,
    /// Shortest gap (days) between consecutive charges that counts as monthly
    pub min_gap_days: f64,
    /// Longest gap (days) that counts as monthly
    pub max_gap_days: f64,
    /// Largest population standard deviation of amounts
    pub max_amount_stddev: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 2,
            min_gap_days: 28.0,
            max_gap_days: 31.0,
            max_amount_stddev: 5.0,
        }
    }
}

/// Merchant key used for grouping: lowercase, `/` treated as a separator,
/// first space-delimited token
pub fn normalize_merchant(description: &str) -> String {
    description
        .to_lowercase()
        .replace('/', " ")
        .split(' ')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Find merchants that charge a near-constant amount roughly monthly
///
/// Non-expenses and undated rows are ignored. Output is sorted by merchant.
pub fn detect_subscriptions(
    transactions: &[Transaction],
    config: &DetectionConfig,
) -> Vec<Subscription> {
    let mut groups: BTreeMap<String, Vec<(NaiveDateTime, &Transaction)>> = BTreeMap::new();

    for tx in transactions {
        if !tx.is_expense() || tx.date.is_empty() {
            continue;
        }
        let Ok(when) = NaiveDateTime::parse_from_str(&tx.date, ISO_FORMAT) else {
            debug!(id = tx.id, date = %tx.date, "Skipping transaction with unreadable date");
            continue;
        };
        groups
            .entry(normalize_merchant(&tx.description))
            .or_default()
            .push((when, tx));
    }

    let mut found = Vec::new();
    for (merchant, mut charges) in groups {
        if charges.len() < config.min_occurrences {
            continue;
        }
        charges.sort_by_key(|(when, tx)| (*when, tx.id));

        let amounts: Vec<f64> = charges.iter().map(|(_, tx)| tx.amount).collect();
        let stddev = population_stddev(&amounts);
        if stddev > config.max_amount_stddev {
            continue;
        }

        let has_monthly_gap = charges.windows(2).any(|w| {
            let days = (w[1].0 - w[0].0).num_seconds() as f64 / SECONDS_PER_DAY;
            days >= config.min_gap_days && days <= config.max_gap_days
        });
        if !has_monthly_gap {
            continue;
        }

        let last_payment_date = charges
            .last()
            .map(|(_, tx)| tx.date.clone())
            .unwrap_or_default();

        debug!(merchant = %merchant, count = charges.len(), stddev, "Subscription detected");
        found.push(Subscription {
            merchant,
            transaction_count: charges.len(),
            avg_amount: mean(&amounts),
            last_payment_date,
        });
    }

    found
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation over the whole population (divides by n)
fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;
    use chrono::Utc;

    fn tx(id: i64, date: &str, amount: f64, description: &str) -> Transaction {
        Transaction {
            id,
            account_id: 1,
            user_id: "placeholder_user".into(),
            date: date.into(),
            amount,
            description: description.into(),
            category: "Bills & Subscriptions".into(),
            confidence: Confidence::High,
            original_data: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_merchant() {
        assert_eq!(normalize_merchant("NETFLIX SUBSCRIPTION"), "netflix");
        assert_eq!(normalize_merchant("UPI/123/Spotify"), "upi");
        assert_eq!(normalize_merchant("Spotify/India"), "spotify");
        assert_eq!(normalize_merchant(""), "");
    }

    #[test]
    fn test_population_stddev() {
        assert_eq!(population_stddev(&[]), 0.0);
        assert_eq!(population_stddev(&[-199.0, -199.0]), 0.0);
        // Population (not sample) deviation of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_stddev(&v) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_charge_detected() {
        let txs = vec![
            tx(1, "2024-01-05T00:00:00", -649.0, "NETFLIX Monthly"),
            tx(2, "2024-02-04T00:00:00", -649.0, "NETFLIX Monthly"),
            tx(3, "2024-03-05T00:00:00", -649.0, "NETFLIX Monthly"),
        ];
        let subs = detect_subscriptions(&txs, &DetectionConfig::default());
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].merchant, "netflix");
        assert_eq!(subs[0].transaction_count, 3);
        assert_eq!(subs[0].avg_amount, -649.0);
        assert_eq!(subs[0].last_payment_date, "2024-03-05T00:00:00");
    }

    #[test]
    fn test_single_charge_not_detected() {
        let txs = vec![tx(1, "2024-01-05T00:00:00", -649.0, "Netflix")];
        assert!(detect_subscriptions(&txs, &DetectionConfig::default()).is_empty());
    }

    #[test]
    fn test_gap_boundaries() {
        let config = DetectionConfig::default();

        // Exactly 28 and exactly 31 days both count
        let at_28 = vec![
            tx(1, "2024-02-01T00:00:00", -99.0, "gym"),
            tx(2, "2024-02-29T00:00:00", -99.0, "gym"),
        ];
        assert_eq!(detect_subscriptions(&at_28, &config).len(), 1);

        let at_31 = vec![
            tx(1, "2024-01-01T00:00:00", -99.0, "gym"),
            tx(2, "2024-02-01T00:00:00", -99.0, "gym"),
        ];
        assert_eq!(detect_subscriptions(&at_31, &config).len(), 1);

        let at_27 = vec![
            tx(1, "2024-01-01T00:00:00", -99.0, "gym"),
            tx(2, "2024-01-28T00:00:00", -99.0, "gym"),
        ];
        assert!(detect_subscriptions(&at_27, &config).is_empty());

        let at_32 = vec![
            tx(1, "2024-01-01T00:00:00", -99.0, "gym"),
            tx(2, "2024-02-02T00:00:00", -99.0, "gym"),
        ];
        assert!(detect_subscriptions(&at_32, &config).is_empty());
    }

    #[test]
    fn test_any_monthly_gap_is_enough() {
        // Weekly noise plus one monthly gap still flags the merchant
        let txs = vec![
            tx(1, "2024-01-01T00:00:00", -50.0, "cloud storage"),
            tx(2, "2024-01-08T00:00:00", -50.0, "cloud storage"),
            tx(3, "2024-02-07T00:00:00", -50.0, "cloud storage"),
        ];
        assert_eq!(detect_subscriptions(&txs, &DetectionConfig::default()).len(), 1);
    }

    #[test]
    fn test_variable_amounts_rejected() {
        let txs = vec![
            tx(1, "2024-01-10T00:00:00", -300.0, "Electricity board"),
            tx(2, "2024-02-09T00:00:00", -420.0, "Electricity board"),
        ];
        assert!(detect_subscriptions(&txs, &DetectionConfig::default()).is_empty());
    }

    #[test]
    fn test_small_variance_allowed() {
        // Amounts -100 and -110 have a population stddev of exactly 5
        let txs = vec![
            tx(1, "2024-01-10T00:00:00", -100.0, "Airtel postpaid"),
            tx(2, "2024-02-09T00:00:00", -110.0, "Airtel postpaid"),
        ];
        let subs = detect_subscriptions(&txs, &DetectionConfig::default());
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].avg_amount, -105.0);
    }

    #[test]
    fn test_income_and_undated_ignored() {
        let txs = vec![
            tx(1, "2024-01-01T00:00:00", 50_000.0, "salary credit"),
            tx(2, "2024-01-31T00:00:00", 50_000.0, "salary credit"),
            tx(3, "", -10.0, "mystery"),
            tx(4, "", -10.0, "mystery"),
        ];
        assert!(detect_subscriptions(&txs, &DetectionConfig::default()).is_empty());
    }

    #[test]
    fn test_results_sorted_by_merchant() {
        let txs = vec![
            tx(1, "2024-01-01T00:00:00", -199.0, "spotify"),
            tx(2, "2024-01-31T00:00:00", -199.0, "spotify"),
            tx(3, "2024-01-02T00:00:00", -649.0, "netflix"),
            tx(4, "2024-02-01T00:00:00", -649.0, "netflix"),
        ];
        let subs = detect_subscriptions(&txs, &DetectionConfig::default());
        let merchants: Vec<_> = subs.iter().map(|s| s.merchant.as_str()).collect();
        assert_eq!(merchants, vec!["netflix", "spotify"]);
    }
}
