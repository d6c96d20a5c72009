//! Fixture-backed implementation of the core data sources

use async_trait::async_trait;
use ledgerview_core::{
    CoreError, CoreResult, Employee, EmployeeSource, Page, PaginatedResponse, Transaction,
    TransactionSource,
};
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::FixtureDataset;

/// Simulated transport latency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latency {
    pub employees: Duration,
    pub transactions: Duration,
}

impl Latency {
    pub fn from_millis(employees: u64, transactions: u64) -> Self {
        Self {
            employees: Duration::from_millis(employees),
            transactions: Duration::from_millis(transactions),
        }
    }
}

async fn delay(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Serves a fixture dataset with server-side pagination
#[derive(Debug)]
pub struct FixtureBackend {
    dataset: FixtureDataset,
    page_size: usize,
    latency: Latency,
    directory_requests: AtomicUsize,
    page_requests: AtomicUsize,
    employee_requests: AtomicUsize,
}

impl FixtureBackend {
    /// Create a backend; a page size of 0 is treated as 1
    pub fn new(dataset: FixtureDataset, page_size: usize, latency: Latency) -> Self {
        Self {
            dataset,
            page_size: page_size.max(1),
            latency,
            directory_requests: AtomicUsize::new(0),
            page_requests: AtomicUsize::new(0),
            employee_requests: AtomicUsize::new(0),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Requests served so far: (directory, pages, per-employee)
    pub fn request_counts(&self) -> (usize, usize, usize) {
        (
            self.directory_requests.load(Ordering::Relaxed),
            self.page_requests.load(Ordering::Relaxed),
            self.employee_requests.load(Ordering::Relaxed),
        )
    }

    fn slice_page(&self, page: u32) -> CoreResult<Page> {
        if page == 0 {
            return Err(CoreError::InvalidPage { page });
        }

        let total = self.dataset.transactions.len();
        let start = (page as usize - 1).saturating_mul(self.page_size);
        if start >= total {
            return Ok(PaginatedResponse { data: Vec::new(), next_page: None });
        }

        let end = (start + self.page_size).min(total);
        Ok(PaginatedResponse {
            data: self.dataset.transactions[start..end].to_vec(),
            next_page: (end < total).then_some(page + 1),
        })
    }
}

#[async_trait]
impl TransactionSource for FixtureBackend {
    async fn get_page(&self, page: u32) -> CoreResult<Page> {
        self.page_requests.fetch_add(1, Ordering::Relaxed);
        delay(self.latency.transactions).await;
        let response = self.slice_page(page)?;
        debug!(
            target: "ledgerview::fixture",
            "Served page {} ({} rows, next {:?})",
            page,
            response.data.len(),
            response.next_page
        );
        Ok(response)
    }

    async fn get_by_employee(&self, employee_id: &str) -> CoreResult<Vec<Transaction>> {
        self.employee_requests.fetch_add(1, Ordering::Relaxed);
        if employee_id.is_empty() {
            return Err(CoreError::EmptyEmployeeId);
        }
        delay(self.latency.transactions).await;
        Ok(self
            .dataset
            .transactions
            .iter()
            .filter(|t| t.belongs_to(employee_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EmployeeSource for FixtureBackend {
    async fn get_all_employees(&self) -> CoreResult<Vec<Employee>> {
        self.directory_requests.fetch_add(1, Ordering::Relaxed);
        delay(self.latency.employees).await;
        Ok(self.dataset.employees.clone())
    }
}
