//! Basic state types shared by the feeds and the controller

use serde::{Deserialize, Serialize};

/// Snapshot of one feed's state
///
/// `data == None` means "never fetched since the last invalidation".
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState<T> {
    pub data: Option<T>,
    pub loading: bool,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
        }
    }
}

/// Result of a feed fetch that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// A request was made and its result applied
    Fetched(T),
    /// Served from cached state without a request
    Cached(T),
    /// The response arrived after a newer request or an invalidation and was dropped
    Superseded,
}

impl<T> FetchOutcome<T> {
    /// The newly applied value, if any
    pub fn fresh(self) -> Option<T> {
        match self {
            FetchOutcome::Fetched(value) => Some(value),
            _ => None,
        }
    }

    /// The value, whether freshly fetched or cached
    pub fn value(self) -> Option<T> {
        match self {
            FetchOutcome::Fetched(value) | FetchOutcome::Cached(value) => Some(value),
            FetchOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, FetchOutcome::Superseded)
    }
}

/// Filter mode of the view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "employee_id", rename_all = "snake_case")]
pub enum FilterMode {
    /// All transactions, paginated
    Unfiltered,
    /// Transactions of one employee
    FilteredByEmployee(String),
}

impl Default for FilterMode {
    fn default() -> Self {
        FilterMode::Unfiltered
    }
}

impl FilterMode {
    /// Build the mode for an employee id; the empty id means no filter
    pub fn for_employee(employee_id: &str) -> Self {
        if employee_id.is_empty() {
            FilterMode::Unfiltered
        } else {
            FilterMode::FilteredByEmployee(employee_id.to_string())
        }
    }

    /// The filter as an employee id, empty when unfiltered
    pub fn employee_id(&self) -> &str {
        match self {
            FilterMode::Unfiltered => "",
            FilterMode::FilteredByEmployee(id) => id,
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterMode::Unfiltered => write!(f, "unfiltered"),
            FilterMode::FilteredByEmployee(id) => write!(f, "employee:{}", id),
        }
    }
}
