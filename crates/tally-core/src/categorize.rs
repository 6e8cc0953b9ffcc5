//! Rule-based transaction categorization
//!
//! Rules are loaded with a two-layer resolution:
//! 1. An override file in the data dir (~/.local/share/tally/config/categories.toml)
//!    or an explicit path
//! 2. The embedded default table (compiled into the binary)
//!
//! Each rule is a regex tested against the lowercased merchant text. Rules are
//! evaluated in file order and the first match wins, so ties go to whichever
//! rule is listed first rather than the most specific one.

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Confidence, DEFAULT_CATEGORY};

/// Embedded default rule table
const DEFAULT_RULES: &str = include_str!("../../../config/categories.toml");

/// A category rule as written in the TOML table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    pub pattern: String,
    pub category: String,
    #[serde(default = "default_rule_confidence")]
    pub confidence: Confidence,
}

fn default_rule_confidence() -> Confidence {
    Confidence::High
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone)]
struct CategoryRule {
    regex: Regex,
    category: String,
    confidence: Confidence,
}

/// Outcome of categorizing one description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Categorization {
    pub category: String,
    pub confidence: Confidence,
}

impl Categorization {
    fn fallback() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            confidence: Confidence::Low,
        }
    }
}

/// Ordered regex rule table
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Categorizer {
    /// Load rules from the data-dir override if present, else the embedded table
    pub fn new() -> Result<Self> {
        match default_rules_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Self::from_toml(DEFAULT_RULES),
        }
    }

    /// Load rules from an explicit file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let categorizer = Self::from_toml(&content)?;
        info!(
            path = %path.display(),
            rules = categorizer.rules.len(),
            "Loaded category rules"
        );
        Ok(categorizer)
    }

    /// Parse a TOML rule table
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: RulesFile = toml::from_str(content)?;
        Self::from_rules(file.rules)
    }

    /// Compile rules in the given order
    pub fn from_rules(rules: Vec<RuleConfig>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|r| {
                let regex = RegexBuilder::new(&r.pattern)
                    .case_insensitive(true)
                    .build()?;
                Ok(CategoryRule {
                    regex,
                    category: r.category,
                    confidence: r.confidence,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Assign a category and confidence to a raw statement description
    ///
    /// Total: anything no rule matches is `Miscellaneous` with Low confidence.
    pub fn categorize(&self, description: &str) -> Categorization {
        let merchant = extract_upi_merchant(description).to_lowercase();

        for rule in &self.rules {
            if rule.regex.is_match(&merchant) {
                debug!(merchant = %merchant, category = %rule.category, "Category rule matched");
                return Categorization {
                    category: rule.category.clone(),
                    confidence: rule.confidence,
                };
            }
        }

        Categorization::fallback()
    }

    /// Distinct categories in table order, ending with the fallback category
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for rule in &self.rules {
            if !names.contains(&rule.category) {
                names.push(rule.category.clone());
            }
        }
        if !names.iter().any(|n| n == DEFAULT_CATEGORY) {
            names.push(DEFAULT_CATEGORY.to_string());
        }
        names
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::from_toml(DEFAULT_RULES).unwrap_or_else(|e| {
            warn!(error = %e, "Embedded category rules failed to load");
            Self { rules: Vec::new() }
        })
    }
}

/// Default rule override path
pub fn default_rules_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("categories.toml"))
}

/// Pull the payee out of a UPI description
///
/// `UPI/<ref>/<...>/<payee@bank>` style descriptions carry the payee in the
/// last segment. Anything else is returned unchanged.
pub fn extract_upi_merchant(description: &str) -> &str {
    if !description.starts_with("UPI/") {
        return description;
    }

    let parts: Vec<&str> = description.split('/').collect();
    if parts.len() <= 3 {
        return description;
    }

    let last = parts[parts.len() - 1].trim_matches(',').trim();
    last.split('@').next().unwrap_or(last)
}
