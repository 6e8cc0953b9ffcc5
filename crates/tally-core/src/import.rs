//! CSV statement import
//!
//! Bank exports disagree on column names and layouts, so instead of one parser
//! per bank this module:
//! - maps headers to the Date / Amount / Description / Transaction Type roles by name
//! - repairs exports whose header row is shifted by one cell
//! - normalizes dates to ISO and amounts to signed numbers (DR rows become negative)
//! - categorizes each row and keeps the raw row as JSON

use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::categorize::Categorizer;
use crate::error::{Error, Result};
use crate::models::NewTransaction;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output format for normalized dates
pub const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

/// Readings before this year are treated as misparses
const MIN_YEAR: i32 = 1900;

const DESCRIPTION_HEADERS: &[&str] = &[
    "description",
    "narration",
    "transaction details",
    "particulars",
    "notes",
    "upi_reference",
];
const AMOUNT_HINTS: &[&str] = &["amount", "txn amount", "value"];
const TYPE_HINTS: &[&str] = &["transaction type", "type", "cr/dr", "dr/cr"];

// Day-first formats are tried before month-first ones. Two-digit-year
// variants come before four-digit ones, and year-first ones come last, so
// "05/01/24" isn't read as year 24 or year 5.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%y",
    "%d-%m-%Y",
    "%d.%m.%y",
    "%d.%m.%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%B-%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
];
const MONTH_FIRST_DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Header index for each transaction field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub date: Option<usize>,
    pub amount: Option<usize>,
    pub description: Option<usize>,
    pub transaction_type: Option<usize>,
}

impl ColumnMapping {
    /// Names of required roles that were not found
    pub fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("Date".to_string());
        }
        if self.amount.is_none() {
            missing.push("Amount".to_string());
        }
        if self.description.is_none() {
            missing.push("Description".to_string());
        }
        missing
    }
}

/// Result of parsing an uploaded statement
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    /// Headers after trimming and misalignment repair
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    /// Whether the shifted-header repair was applied
    pub realigned: bool,
    pub transactions: Vec<NewTransaction>,
}

/// Map headers to transaction fields by name
///
/// Each header takes at most one role, checked in the order Date, Amount,
/// Description, Transaction Type. Date, Amount and Transaction Type go to the
/// last matching header (`Value Date` over `Transaction Date`). Description
/// keeps the first match. When no description-like header exists, the first
/// header mentioning `upi` or `reference` is used instead.
pub fn map_columns(headers: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for (i, header) in headers.iter().enumerate() {
        let name = header.trim().to_lowercase();

        if name.contains("date") {
            mapping.date = Some(i);
        } else if AMOUNT_HINTS.iter().any(|h| name.contains(h)) {
            mapping.amount = Some(i);
        } else if DESCRIPTION_HEADERS.contains(&name.as_str()) {
            mapping.description.get_or_insert(i);
        } else if TYPE_HINTS.iter().any(|h| name.contains(h)) {
            mapping.transaction_type = Some(i);
        }
    }

    if mapping.description.is_none() {
        mapping.description = headers.iter().position(|h| {
            let name = h.to_lowercase();
            name.contains("upi") || name.contains("reference")
        });
    }

    mapping
}

/// Repair exports whose header row is shifted by one cell
///
/// The tell is a column named `Date` holding CR/DR markers. Returns true if
/// the headers were renamed.
pub fn fix_misalignment(headers: &mut [String], rows: &[StringRecord]) -> bool {
    let Some(date_idx) = headers.iter().position(|h| h == "Date") else {
        return false;
    };

    let shifted = rows.iter().any(|row| {
        row.get(date_idx)
            .map(|v| {
                let v = v.trim();
                v.eq_ignore_ascii_case("CR") || v.eq_ignore_ascii_case("DR")
            })
            .unwrap_or(false)
    });
    if !shifted {
        return false;
    }

    for header in headers.iter_mut() {
        let renamed = match header.as_str() {
            "Date" => "Transaction Type",
            "Transaction Type" => "Amount",
            "Amount" => "UPI_Reference",
            "UPI_Reference" => "Date",
            _ => continue,
        };
        *header = renamed.to_string();
    }

    true
}

/// Normalize a statement date to `YYYY-MM-DDTHH:MM:SS`
///
/// Day-first readings win over month-first ones. Returns an empty string when
/// the value is blank or unreadable.
pub fn normalize_date(raw: &str) -> String {
    let s = raw.trim().trim_end_matches(',').trim();
    if s.is_empty() {
        return String::new();
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            if dt.year() < MIN_YEAR {
                continue;
            }
            return dt.format(ISO_DATETIME).to_string();
        }
    }

    for fmt in DAY_FIRST_DATE_FORMATS.iter().chain(MONTH_FIRST_DATE_FORMATS) {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if date.year() < MIN_YEAR {
                continue;
            }
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return dt.format(ISO_DATETIME).to_string();
            }
        }
    }

    debug!(value = %s, "Unreadable date");
    String::new()
}

/// Parse an amount, tolerating currency markers and thousands separators
///
/// Parenthesized values are negative. Anything unparseable becomes 0.
pub fn normalize_amount(raw: &str) -> f64 {
    let mut s = raw.trim().to_string();
    for marker in ["INR", "Rs.", "Rs", "₹", "$"] {
        s = s.replace(marker, "");
    }
    let s: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();

    let (negative, body) = match s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s.as_str()),
    };

    match body.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if negative {
                -v.abs()
            } else {
                v
            }
        }
        _ => 0.0,
    }
}

/// Apply the debit/credit marker: a `DR` row is money out
pub fn apply_transaction_type(amount: f64, transaction_type: &str) -> f64 {
    if transaction_type.trim().eq_ignore_ascii_case("DR") {
        -amount
    } else {
        amount
    }
}

/// Convert a CSV record to a JSON object using headers as keys
fn record_to_json(headers: &[String], record: &StringRecord) -> Value {
    let mut map = serde_json::Map::new();
    for (i, header) in headers.iter().enumerate() {
        let value = record.get(i).unwrap_or_default();
        map.insert(header.clone(), Value::String(value.to_string()));
    }
    Value::Object(map)
}

/// Parse an uploaded statement into categorized transactions
///
/// Fails with [`Error::MissingColumns`] when Date, Amount or Description
/// cannot be mapped. A statement with headers but no rows parses to an empty
/// transaction list.
pub fn parse_csv(data: &[u8], categorizer: &Categorizer) -> Result<ParsedUpload> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let mut headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;

    let realigned = fix_misalignment(&mut headers, &records);
    if realigned {
        info!(headers = ?headers, "Shifted header row repaired");
    }

    let mapping = map_columns(&headers);
    debug!(mapping = ?mapping, "Detected column mapping");

    let (Some(date_idx), Some(amount_idx), Some(desc_idx)) =
        (mapping.date, mapping.amount, mapping.description)
    else {
        return Err(Error::MissingColumns {
            missing: mapping.missing(),
            available: headers,
        });
    };

    let mut transactions = Vec::with_capacity(records.len());
    for record in &records {
        let cell = |i: usize| record.get(i).unwrap_or_default();

        let mut amount = normalize_amount(cell(amount_idx));
        if let Some(type_idx) = mapping.transaction_type {
            amount = apply_transaction_type(amount, cell(type_idx));
        }

        let description = cell(desc_idx).trim().to_string();
        let categorization = categorizer.categorize(&description);

        transactions.push(NewTransaction {
            date: normalize_date(cell(date_idx)),
            amount,
            description,
            category: categorization.category,
            confidence: categorization.confidence,
            original_data: record_to_json(&headers, record),
        });
    }

    debug!("Parsed {} statement rows", transactions.len());
    Ok(ParsedUpload {
        headers,
        mapping,
        realigned,
        transactions,
    })
}

/// Read and parse a statement file from disk
pub fn parse_csv_file(path: &Path, categorizer: &Categorizer) -> Result<ParsedUpload> {
    let data = std::fs::read(path)?;
    parse_csv(&data, categorizer)
}
