//! Core data models for the ledger browser

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employee as returned by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique employee identifier
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    /// The "All Employees" entry. Never returned by a directory fetch.
    pub fn empty() -> Self {
        Self {
            id: String::new(),
            first_name: "All".to_string(),
            last_name: "Employees".to_string(),
        }
    }

    /// Whether this is the no-filter entry
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Get the display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Transaction information
///
/// Identity is `id`: two records with the same id are the same logical
/// transaction even if other fields differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: String,
    pub amount: Decimal,
    /// Employee that made the transaction
    pub employee: Employee,
    pub merchant: String,
    pub date: NaiveDate,
    /// Approval state
    pub approved: bool,
}

impl Transaction {
    /// Check if the transaction belongs to an employee
    pub fn belongs_to(&self, employee_id: &str) -> bool {
        self.employee.id == employee_id
    }
}

/// One page of a paginated response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: T,
    /// Index of the following page, `None` once the feed is exhausted
    pub next_page: Option<u32>,
}

impl<T> PaginatedResponse<T> {
    /// Check if no further pages remain
    pub fn is_exhausted(&self) -> bool {
        self.next_page.is_none()
    }
}

/// A page of transactions
pub type Page = PaginatedResponse<Vec<Transaction>>;
