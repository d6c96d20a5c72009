//! Collaborator contracts for the data sources
//!
//! The transport behind these traits is opaque to the core. Implementations
//! must be idempotent for identical arguments: the merge step relies on
//! repeated queries returning the same records.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CoreResult;
use crate::models::{Employee, Page, Transaction};

/// Source of transaction pages
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetch one page of the unfiltered feed. Pages are numbered from 1.
    async fn get_page(&self, page: u32) -> CoreResult<Page>;

    /// Fetch every transaction of one employee in a single response
    async fn get_by_employee(&self, employee_id: &str) -> CoreResult<Vec<Transaction>>;
}

/// Source of the employee directory
#[async_trait]
pub trait EmployeeSource: Send + Sync {
    async fn get_all_employees(&self) -> CoreResult<Vec<Employee>>;
}

/// Shared transaction source reference
pub type TransactionSourceRef = Arc<dyn TransactionSource>;

/// Shared employee source reference
pub type EmployeeSourceRef = Arc<dyn EmployeeSource>;
