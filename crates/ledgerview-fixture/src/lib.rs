//! In-memory ledger transport
//!
//! Loads employees and transactions from a JSON fixture and serves them
//! through the core source traits, with server-side pagination.

use async_trait::async_trait;
use ledgerview_core::{Employee, Transaction};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

pub mod backend;
pub mod error;

pub use backend::{FixtureBackend, Latency};
pub use error::FixtureError;

/// Contents of a fixture file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureDataset {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl FixtureDataset {
    /// Check ids are present and employees unique.
    ///
    /// Repeated transaction ids are allowed, they model records a server
    /// sends twice.
    pub fn validate(&self) -> Result<(), FixtureError> {
        let mut employee_ids = HashSet::new();
        for employee in &self.employees {
            if employee.id.is_empty() {
                return Err(FixtureError::ValidationError {
                    message: format!("employee {} has an empty id", employee.full_name()),
                });
            }
            if !employee_ids.insert(employee.id.as_str()) {
                return Err(FixtureError::ValidationError {
                    message: format!("duplicate employee id {}", employee.id),
                });
            }
        }

        let mut transaction_ids = HashSet::new();
        for transaction in &self.transactions {
            if transaction.id.is_empty() {
                return Err(FixtureError::ValidationError {
                    message: format!("transaction at {} has an empty id", transaction.merchant),
                });
            }
            if !employee_ids.contains(transaction.employee.id.as_str()) {
                return Err(FixtureError::ValidationError {
                    message: format!(
                        "transaction {} references unknown employee {}",
                        transaction.id, transaction.employee.id
                    ),
                });
            }
            if !transaction_ids.insert(transaction.id.as_str()) {
                warn!(target: "ledgerview::fixture", "Transaction {} appears more than once", transaction.id);
            }
        }

        Ok(())
    }
}

// ==================== Loader Trait ====================

/// Trait for fixture loaders
#[async_trait]
pub trait DatasetLoader: Send + Sync {
    /// Parse fixture content
    async fn parse(&self, content: &str) -> Result<FixtureDataset, FixtureError>;

    /// Read and parse a fixture file
    async fn load_file(&self, path: PathBuf) -> Result<FixtureDataset, FixtureError>;
}

/// JSON fixture loader
#[derive(Debug, Default)]
pub struct JsonDatasetLoader;

impl JsonDatasetLoader {
    fn decode(content: &str, location: &str) -> Result<FixtureDataset, FixtureError> {
        let dataset: FixtureDataset = serde_json::from_str(content)
            .map_err(|e| FixtureError::SyntaxError {
                location: location.to_string(),
                message: e.to_string(),
            })?;
        dataset.validate()?;
        Ok(dataset)
    }
}

#[async_trait]
impl DatasetLoader for JsonDatasetLoader {
    async fn parse(&self, content: &str) -> Result<FixtureDataset, FixtureError> {
        Self::decode(content, "input")
    }

    async fn load_file(&self, path: PathBuf) -> Result<FixtureDataset, FixtureError> {
        let content = tokio::fs::read_to_string(&path).await?;
        let dataset = Self::decode(&content, &path.to_string_lossy())?;
        info!(
            target: "ledgerview::fixture",
            "Loaded {} employees and {} transactions from {}",
            dataset.employees.len(),
            dataset.transactions.len(),
            path.display()
        );
        Ok(dataset)
    }
}
