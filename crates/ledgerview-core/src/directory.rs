//! Employee directory cache

use log::{debug, info};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CoreResult;
use crate::models::Employee;
use crate::source::EmployeeSourceRef;
use crate::types::{FeedState, FetchOutcome};

/// Loads the employee list once per session and serves it from cache afterwards
pub struct EmployeeDirectory {
    source: EmployeeSourceRef,
    state: Mutex<FeedState<Vec<Employee>>>,
}

impl EmployeeDirectory {
    pub fn new(source: EmployeeSourceRef) -> Self {
        Self {
            source,
            state: Mutex::new(FeedState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState<Vec<Employee>>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the directory, or return the cached copy without a request.
    ///
    /// Failures are surfaced to the caller and leave the cache empty.
    pub async fn fetch_all(&self) -> CoreResult<FetchOutcome<Vec<Employee>>> {
        {
            let mut state = self.lock();
            if let Some(ref employees) = state.data {
                debug!(target: "ledgerview::directory", "Serving {} cached employees", employees.len());
                return Ok(FetchOutcome::Cached(employees.clone()));
            }
            state.loading = true;
        }

        let result = self.source.get_all_employees().await;

        let mut state = self.lock();
        state.loading = false;
        let employees = result?;
        info!(target: "ledgerview::directory", "Loaded {} employees", employees.len());
        state.data = Some(employees.clone());
        Ok(FetchOutcome::Fetched(employees))
    }

    /// Drop the cache and fetch the directory again
    pub async fn reload(&self) -> CoreResult<FetchOutcome<Vec<Employee>>> {
        self.lock().data = None;
        self.fetch_all().await
    }

    /// Cached employees, `None` until the first successful fetch
    pub fn employees(&self) -> Option<Vec<Employee>> {
        self.lock().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    pub fn state(&self) -> FeedState<Vec<Employee>> {
        self.lock().clone()
    }
}
