//! Transaction feed orchestration and view state
//!
//! Two independent transaction feeds (the paginated "all transactions" feed
//! and the per-employee feed) plus a cached employee directory, folded into
//! a single deduplicated display sequence by the [`ViewController`].

pub mod by_employee;
pub mod controller;
pub mod directory;
pub mod error;
pub mod merge;
pub mod models;
pub mod paginated;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use by_employee::{EmployeeFeed, RequestTicket};
pub use controller::ViewController;
pub use directory::EmployeeDirectory;
pub use error::{CoreError, CoreResult, ErrorSeverity};
pub use merge::{merge, Accumulator};
pub use models::{Employee, Page, PaginatedResponse, Transaction};
pub use paginated::{PaginatedFeed, FIRST_PAGE};
pub use source::{EmployeeSource, EmployeeSourceRef, TransactionSource, TransactionSourceRef};
pub use types::{FeedState, FetchOutcome, FilterMode};
