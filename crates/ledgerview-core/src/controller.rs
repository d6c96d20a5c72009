//! View controller
//!
//! Receives user intents (load all, filter by employee, view more), decides
//! which feed to invalidate and which to fetch, and folds every applied
//! response into one deduplicated display sequence.
//!
//! Methods take `&self` so that a newer intent can be dispatched while an
//! older one is still awaiting its response. No lock is held across an await.
//!
//! The display only changes when a fetch succeeds. A transition that clears
//! both feeds marks the accumulation base for restart, and the restart is
//! applied together with the first successful fold after it. Failed and
//! superseded fetches leave the display untouched.

use log::{debug, info};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::by_employee::EmployeeFeed;
use crate::directory::EmployeeDirectory;
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::merge::Accumulator;
use crate::models::{Employee, Page, Transaction};
use crate::paginated::PaginatedFeed;
use crate::source::{EmployeeSourceRef, TransactionSourceRef};
use crate::types::{FeedState, FetchOutcome, FilterMode};

#[derive(Debug, Default)]
struct Session {
    filter: FilterMode,
    /// Number of `load_all_transactions` calls still running
    pending_loads: usize,
    /// Both feeds were invalidated; the next successful fold starts from empty
    restart: bool,
    accumulator: Accumulator,
}

/// Orchestrates the employee directory and both transaction feeds
///
/// The staleness check of a response and its fold into the display run under
/// the feed's lock, so an invalidation cannot slip in between them. Lock
/// order is feed, then session.
pub struct ViewController {
    directory: EmployeeDirectory,
    paginated: PaginatedFeed,
    by_employee: EmployeeFeed,
    session: Mutex<Session>,
    error_logger: Box<dyn ErrorLogger>,
}

/// Clears the aggregate loading flag on every exit path of a load
struct LoadGuard<'a> {
    controller: &'a ViewController,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.controller.session();
        session.pending_loads = session.pending_loads.saturating_sub(1);
    }
}

impl ViewController {
    pub fn new(employees: EmployeeSourceRef, transactions: TransactionSourceRef) -> Self {
        Self {
            directory: EmployeeDirectory::new(employees),
            paginated: PaginatedFeed::new(transactions.clone()),
            by_employee: EmployeeFeed::new(transactions),
            session: Mutex::new(Session::default()),
            error_logger: Box::new(DefaultErrorLogger),
        }
    }

    /// Replace the logger used for propagated failures
    pub fn with_error_logger(mut self, logger: Box<dyn ErrorLogger>) -> Self {
        self.error_logger = logger;
        self
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, error: CoreError, context: ErrorContext) -> CoreError {
        self.error_logger.log_error(&error, &context);
        error
    }

    fn feeds_cleared(&self) -> bool {
        !self.paginated.has_data() && !self.by_employee.has_data()
    }

    /// Switch mode after the invalidation step of a transition.
    ///
    /// When neither feed holds data any more, the accumulation base is marked
    /// to start over on the next successful fold.
    fn enter_mode(&self, filter: FilterMode) {
        let cleared = self.feeds_cleared();
        let mut session = self.session();
        if cleared && !session.restart {
            debug!(target: "ledgerview::controller", "Both feeds invalidated, display restarts on next fold");
            session.restart = true;
        }
        if session.filter != filter {
            info!(target: "ledgerview::controller", "Filter changed: {} -> {}", session.filter, filter);
            session.filter = filter;
        }
    }

    fn fold(&self, incoming: &[Transaction]) {
        let mut session = self.session();
        if session.restart {
            session.accumulator.reset();
            session.restart = false;
        }
        let shown = session.accumulator.fold(incoming).len();
        debug!(
            target: "ledgerview::controller",
            "Merged {} incoming transactions, {} displayed",
            incoming.len(),
            shown
        );
    }

    // ==================== Intents ====================

    /// Handle a selection from the employee picker. `None` is ignored.
    pub async fn on_employee_change(&self, selection: Option<&Employee>) -> CoreResult<()> {
        match selection {
            None => Ok(()),
            Some(employee) => self.select_employee(&employee.id).await,
        }
    }

    /// Filter by an employee; the empty id clears the filter
    pub async fn select_employee(&self, employee_id: &str) -> CoreResult<()> {
        if employee_id.is_empty() {
            self.load_all_transactions().await
        } else {
            self.load_transactions_by_employee(employee_id).await
        }
    }

    /// Load the directory if needed, then the next page of the unfiltered feed
    pub async fn load_all_transactions(&self) -> CoreResult<()> {
        self.by_employee.invalidate_data();
        self.enter_mode(FilterMode::Unfiltered);
        self.session().pending_loads += 1;
        let _guard = LoadGuard { controller: self };

        self.directory
            .fetch_all()
            .await
            .map_err(|e| self.report(e, ErrorContext::new("load_all_transactions.employees")))?;

        let outcome = self.paginated.fetch_all_with(|page| self.fold(&page.data)).await.map_err(|e| {
            self.report(
                e,
                ErrorContext::new("load_all_transactions.page")
                    .with_data("page", serde_json::json!(self.paginated.next_page())),
            )
        })?;

        match outcome {
            FetchOutcome::Fetched(_) => {}
            FetchOutcome::Cached(_) => {
                debug!(target: "ledgerview::controller", "No more pages to load");
            }
            FetchOutcome::Superseded => {
                self.error_logger.log_debug(
                    "page response superseded by a mode switch",
                    &ErrorContext::new("load_all_transactions.page"),
                );
            }
        }
        Ok(())
    }

    async fn load_transactions_by_employee(&self, employee_id: &str) -> CoreResult<()> {
        let context = || {
            ErrorContext::new("load_transactions_by_employee")
                .with_data("employee_id", serde_json::json!(employee_id))
        };

        self.paginated.invalidate_data();
        let ticket = self
            .by_employee
            .issue(employee_id)
            .map_err(|e| self.report(e, context()))?;
        self.enter_mode(FilterMode::for_employee(employee_id));

        match self
            .by_employee
            .resolve_with(ticket, |transactions| self.fold(transactions))
            .await
            .map_err(|e| self.report(e, context()))?
        {
            FetchOutcome::Fetched(_) | FetchOutcome::Cached(_) => {}
            FetchOutcome::Superseded => {
                self.error_logger
                    .log_debug("employee response superseded by a newer request", &context());
            }
        }
        Ok(())
    }

    /// Load more rows for the current mode.
    ///
    /// Unfiltered, this advances the pagination cursor. Filtered, the
    /// employee feed has a single page, so the same request is issued again
    /// and the merge absorbs the repeat.
    pub async fn view_more(&self) -> CoreResult<()> {
        let filter = self.session().filter.clone();
        match filter {
            FilterMode::Unfiltered => self.load_all_transactions().await,
            FilterMode::FilteredByEmployee(employee_id) => {
                self.load_transactions_by_employee(&employee_id).await
            }
        }
    }

    /// Startup action: load everything if the directory is absent and not loading.
    ///
    /// Returns whether a load was started.
    pub async fn bootstrap(&self) -> CoreResult<bool> {
        if self.directory.employees().is_some() || self.directory.loading() {
            return Ok(false);
        }
        self.load_all_transactions().await?;
        Ok(true)
    }

    /// Explicit full reload of the employee directory
    pub async fn reload_employees(&self) -> CoreResult<Vec<Employee>> {
        let outcome = self
            .directory
            .reload()
            .await
            .map_err(|e| self.report(e, ErrorContext::new("reload_employees")))?;
        Ok(outcome.value().unwrap_or_default())
    }

    // ==================== Observable state ====================

    /// The deduplicated display sequence, `None` if nothing has loaded
    pub fn transactions(&self) -> Option<Vec<Transaction>> {
        self.session().accumulator.current().map(<[Transaction]>::to_vec)
    }

    /// Aggregate loading flag of the unfiltered load sequence
    pub fn is_loading(&self) -> bool {
        self.session().pending_loads > 0
    }

    pub fn current_filter(&self) -> FilterMode {
        self.session().filter.clone()
    }

    pub fn employees(&self) -> Option<Vec<Employee>> {
        self.directory.employees()
    }

    pub fn employees_loading(&self) -> bool {
        self.directory.loading()
    }

    /// Selectable entries: the "All Employees" entry followed by the directory
    pub fn employee_options(&self) -> Vec<Employee> {
        match self.directory.employees() {
            None => Vec::new(),
            Some(employees) => std::iter::once(Employee::empty()).chain(employees).collect(),
        }
    }

    /// "View more" is shown once something has loaded
    pub fn view_more_visible(&self) -> bool {
        self.session().accumulator.current().is_some()
    }

    /// "View more" is disabled while a page request is running
    pub fn view_more_enabled(&self) -> bool {
        !self.paginated.loading()
    }

    pub fn paginated_state(&self) -> FeedState<Page> {
        self.paginated.state()
    }

    pub fn employee_feed_state(&self) -> FeedState<Vec<Transaction>> {
        self.by_employee.state()
    }
}
