//! Configuration for filter compilation.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::Result;

static DEFAULT_CASE_SENSITIVE: AtomicBool = AtomicBool::new(true);

/// Process-wide default for case-sensitive string comparisons
#[must_use]
pub fn default_case_sensitive() -> bool {
    DEFAULT_CASE_SENSITIVE.load(Ordering::Relaxed)
}

/// Change the process-wide default for case-sensitive string comparisons.
///
/// Filters without an explicit [`FilterConfig`] pick the new value up the next
/// time they are compiled.
pub fn set_default_case_sensitive(case_sensitive: bool) {
    DEFAULT_CASE_SENSITIVE.store(case_sensitive, Ordering::Relaxed);
}

/// Configuration applied when a filter is compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Compare string fields case-sensitively
    pub case_sensitive: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            case_sensitive: default_case_sensitive(),
        }
    }
}

impl FilterConfig {
    /// Configuration with case-sensitive string comparisons
    #[must_use]
    pub const fn case_sensitive() -> Self {
        Self {
            case_sensitive: true,
        }
    }

    /// Configuration with case-insensitive string comparisons
    #[must_use]
    pub const fn case_insensitive() -> Self {
        Self {
            case_sensitive: false,
        }
    }

    /// Load a configuration from a JSON document.
    ///
    /// Missing keys fall back to the process-wide defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Configuration for date format handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormatConfig {
    /// List of date format strings to try when parsing dates
    pub date_formats: Vec<String>,
    /// Enable heuristic format detection
    pub enable_format_detection: bool,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO format: 2023-01-15
                "%d-%m-%Y".to_string(), // European: 15-01-2023
                "%m/%d/%Y".to_string(), // US: 01/15/2023
                "%d/%m/%Y".to_string(), // UK: 15/01/2023
                "%d.%m.%Y".to_string(), // German/Danish: 15.01.2023
                "%Y%m%d".to_string(),   // Compact: 20230115
                "%d %b %Y".to_string(), // 15 Jan 2023
                "%d %B %Y".to_string(), // 15 January 2023
            ],
            enable_format_detection: true,
        }
    }
}
