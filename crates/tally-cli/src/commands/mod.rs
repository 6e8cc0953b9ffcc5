//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (database path resolution, open_db)
//! - `accounts` - Account management (list, add, rename, delete)
//! - `import` - CSV statement import and categorization preview
//! - `analytics` - Summary, subscriptions, review queue
//! - `ai` - Questions and model listing
//! - `serve` - Web server command

pub mod accounts;
pub mod ai;
pub mod analytics;
pub mod core;
pub mod import;
pub mod serve;

// Re-export command functions for main.rs
pub use accounts::*;
pub use ai::*;
pub use analytics::*;
pub use core::*;
pub use import::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
