//! Employee-scoped feed
//!
//! The server returns every transaction of an employee in one response, so
//! this feed has no cursor. Requests follow a last-issued-wins rule: each
//! request carries a token, and only the response to the most recently issued
//! token may update state.

use log::{debug, info};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{CoreError, CoreResult};
use crate::models::Transaction;
use crate::source::TransactionSourceRef;
use crate::types::{FeedState, FetchOutcome};

/// Handle for one issued request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    employee_id: String,
    token: u64,
}

#[derive(Debug, Default)]
struct Scope {
    data: Option<Vec<Transaction>>,
    employee_id: Option<String>,
    /// Token of the most recently issued request, also bumped on invalidation
    latest: u64,
    in_flight: usize,
}

/// Fetches the complete transaction set of one employee
pub struct EmployeeFeed {
    source: TransactionSourceRef,
    scope: Mutex<Scope>,
}

impl EmployeeFeed {
    pub fn new(source: TransactionSourceRef) -> Self {
        Self {
            source,
            scope: Mutex::new(Scope::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Scope> {
        self.scope.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a request for `employee_id` without awaiting it.
    ///
    /// Switching to a different employee discards the previous employee's
    /// data immediately, before any response arrives.
    pub fn issue(&self, employee_id: &str) -> CoreResult<RequestTicket> {
        if employee_id.is_empty() {
            return Err(CoreError::EmptyEmployeeId);
        }

        let mut scope = self.lock();
        if scope.employee_id.as_deref() != Some(employee_id) {
            if scope.data.take().is_some() {
                debug!(target: "ledgerview::feed", "Discarding cached transactions before switching to employee {}", employee_id);
            }
            scope.employee_id = Some(employee_id.to_string());
        }
        scope.latest += 1;
        scope.in_flight += 1;

        Ok(RequestTicket {
            employee_id: employee_id.to_string(),
            token: scope.latest,
        })
    }

    /// Await the response for `ticket` and apply it if it is still the latest request
    pub async fn resolve(&self, ticket: RequestTicket) -> CoreResult<FetchOutcome<Vec<Transaction>>> {
        self.resolve_with(ticket, |_| ()).await
    }

    /// Like [`resolve`](Self::resolve), running `apply` on an accepted
    /// response under the same lock as the token check.
    pub async fn resolve_with<F>(
        &self,
        ticket: RequestTicket,
        apply: F,
    ) -> CoreResult<FetchOutcome<Vec<Transaction>>>
    where
        F: FnOnce(&[Transaction]) + Send,
    {
        let result = self.source.get_by_employee(&ticket.employee_id).await;

        let mut scope = self.lock();
        scope.in_flight = scope.in_flight.saturating_sub(1);
        if scope.latest != ticket.token {
            debug!(
                target: "ledgerview::feed",
                "Dropping superseded response for employee {} (token {}, latest {})",
                ticket.employee_id,
                ticket.token,
                scope.latest
            );
            return Ok(FetchOutcome::Superseded);
        }

        let transactions = result?;
        info!(
            target: "ledgerview::feed",
            "Received {} transactions for employee {}",
            transactions.len(),
            ticket.employee_id
        );
        scope.data = Some(transactions.clone());
        apply(&transactions);
        Ok(FetchOutcome::Fetched(transactions))
    }

    /// Fetch every transaction of one employee
    pub async fn fetch_by_id(&self, employee_id: &str) -> CoreResult<FetchOutcome<Vec<Transaction>>> {
        let ticket = self.issue(employee_id)?;
        self.resolve(ticket).await
    }

    /// Clear cached data. Responses to requests issued before this call are dropped.
    pub fn invalidate_data(&self) {
        let mut scope = self.lock();
        scope.data = None;
        scope.employee_id = None;
        scope.latest += 1;
    }

    pub fn has_data(&self) -> bool {
        self.lock().data.is_some()
    }

    pub fn loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    /// Employee the cached data (or the pending request) belongs to
    pub fn employee_id(&self) -> Option<String> {
        self.lock().employee_id.clone()
    }

    pub fn state(&self) -> FeedState<Vec<Transaction>> {
        let scope = self.lock();
        FeedState {
            data: scope.data.clone(),
            loading: scope.in_flight > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tx, wait_until, ScriptedSource};
    use std::sync::Arc;

    fn source() -> ScriptedSource {
        ScriptedSource::new()
            .with_employee_transactions("e1", vec![tx("a1", "e1"), tx("a2", "e1")])
            .with_employee_transactions("e2", vec![tx("b1", "e2")])
    }

    #[tokio::test]
    async fn test_fetch_by_id() {
        let feed = EmployeeFeed::new(Arc::new(source()));
        let transactions = feed.fetch_by_id("e1").await.unwrap().fresh().unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(feed.employee_id().as_deref(), Some("e1"));
        assert!(feed.has_data());
    }

    #[tokio::test]
    async fn test_empty_employee_id_rejected() {
        let source = Arc::new(source());
        let feed = EmployeeFeed::new(source.clone());
        assert_eq!(feed.fetch_by_id("").await.unwrap_err(), CoreError::EmptyEmployeeId);
        assert!(source.employees_requested().is_empty());
    }

    #[tokio::test]
    async fn test_switching_employee_discards_data_on_issue() {
        let feed = EmployeeFeed::new(Arc::new(source()));
        feed.fetch_by_id("e1").await.unwrap();

        let ticket = feed.issue("e2").unwrap();
        assert!(!feed.has_data());
        assert!(feed.loading());

        feed.resolve(ticket).await.unwrap();
        assert_eq!(feed.state().data.map(|d| d[0].id.clone()), Some("b1".to_string()));
    }

    #[tokio::test]
    async fn test_same_employee_keeps_data_while_refetching() {
        let feed = EmployeeFeed::new(Arc::new(source()));
        feed.fetch_by_id("e1").await.unwrap();

        let ticket = feed.issue("e1").unwrap();
        assert!(feed.has_data());
        feed.resolve(ticket).await.unwrap();
    }

    #[tokio::test]
    async fn test_last_issued_wins() {
        let source = Arc::new(source());
        let release_e1 = source.gate("e1");
        let feed = Arc::new(EmployeeFeed::new(source.clone()));

        let slow = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.fetch_by_id("e1").await })
        };
        wait_until(|| source.employees_requested().len() == 1).await;

        let fast = feed.fetch_by_id("e2").await.unwrap();
        assert!(matches!(fast, FetchOutcome::Fetched(_)));

        release_e1.send(()).unwrap();
        assert!(slow.await.unwrap().unwrap().is_superseded());

        let data = feed.state().data.unwrap();
        assert!(data.iter().all(|t| t.belongs_to("e2")));
        assert!(!feed.loading());
    }

    #[tokio::test]
    async fn test_invalidate_drops_in_flight_response() {
        let source = Arc::new(source());
        let release = source.gate("e1");
        let feed = Arc::new(EmployeeFeed::new(source.clone()));

        let task = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.fetch_by_id("e1").await })
        };
        wait_until(|| source.employees_requested().len() == 1).await;

        feed.invalidate_data();
        release.send(()).unwrap();
        assert!(task.await.unwrap().unwrap().is_superseded());
        assert!(!feed.has_data());
        assert!(feed.employee_id().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_writes_nothing() {
        let source = Arc::new(source());
        source.fail_transactions(true);
        let feed = EmployeeFeed::new(source.clone());

        let err = feed.fetch_by_id("e1").await.unwrap_err();
        assert!(matches!(err, CoreError::Transport { .. }));
        assert!(!feed.loading());
        assert!(!feed.has_data());
        assert_eq!(feed.employee_id().as_deref(), Some("e1"));

        source.fail_transactions(false);
        let transactions = feed.fetch_by_id("e1").await.unwrap().fresh().unwrap();
        assert_eq!(transactions.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_cached_data() {
        let source = Arc::new(source());
        let feed = EmployeeFeed::new(source.clone());
        feed.fetch_by_id("e1").await.unwrap();

        source.fail_transactions(true);
        let mut applied = false;
        let result = feed
            .resolve_with(feed.issue("e1").unwrap(), |_| applied = true)
            .await;
        assert!(result.is_err());
        assert!(!applied);
        assert_eq!(feed.state().data.map(|d| d.len()), Some(2));
        assert!(!feed.loading());
    }
}
