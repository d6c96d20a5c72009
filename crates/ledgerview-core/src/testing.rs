//! Scripted in-memory sources for unit tests

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::error::{CoreError, CoreResult};
use crate::models::{Employee, Page, PaginatedResponse, Transaction};
use crate::source::{EmployeeSource, TransactionSource};

pub fn employee(id: &str) -> Employee {
    Employee {
        id: id.to_string(),
        first_name: format!("First{}", id),
        last_name: format!("Last{}", id),
    }
}

pub fn tx(id: &str, employee_id: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount: Decimal::new(1000, 2),
        employee: employee(employee_id),
        merchant: "Merchant".to_string(),
        date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        approved: false,
    }
}

/// Source answering from fixed scripts, counting every request.
///
/// A response can be held open with [`ScriptedSource::gate`] until the
/// returned sender fires.
#[derive(Default)]
pub struct ScriptedSource {
    employees: Vec<Employee>,
    pages: HashMap<u32, Page>,
    by_employee: HashMap<String, Vec<Transaction>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    fail_employees: AtomicBool,
    fail_transactions: AtomicBool,
    pub employee_calls: AtomicUsize,
    pub page_calls: Mutex<Vec<u32>>,
    pub by_employee_calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(mut self, employees: Vec<Employee>) -> Self {
        self.employees = employees;
        self
    }

    pub fn with_page(mut self, index: u32, data: Vec<Transaction>, next_page: Option<u32>) -> Self {
        self.pages.insert(index, PaginatedResponse { data, next_page });
        self
    }

    pub fn with_employee_transactions(mut self, employee_id: &str, data: Vec<Transaction>) -> Self {
        self.by_employee.insert(employee_id.to_string(), data);
        self
    }

    /// Hold the next request for `key` ("page:N" or an employee id) until released
    pub fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    pub fn fail_employees(&self, fail: bool) {
        self.fail_employees.store(fail, Ordering::SeqCst);
    }

    pub fn fail_transactions(&self, fail: bool) {
        self.fail_transactions.store(fail, Ordering::SeqCst);
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn employees_requested(&self) -> Vec<String> {
        self.by_employee_calls.lock().unwrap().clone()
    }

    async fn wait_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().remove(key);
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }
}

#[async_trait]
impl TransactionSource for ScriptedSource {
    async fn get_page(&self, page: u32) -> CoreResult<Page> {
        self.page_calls.lock().unwrap().push(page);
        self.wait_gate(&format!("page:{}", page)).await;
        if self.fail_transactions.load(Ordering::SeqCst) {
            return Err(CoreError::transport("page request failed"));
        }
        self.pages
            .get(&page)
            .cloned()
            .ok_or(CoreError::InvalidPage { page })
    }

    async fn get_by_employee(&self, employee_id: &str) -> CoreResult<Vec<Transaction>> {
        self.by_employee_calls.lock().unwrap().push(employee_id.to_string());
        self.wait_gate(employee_id).await;
        if self.fail_transactions.load(Ordering::SeqCst) {
            return Err(CoreError::transport("employee request failed"));
        }
        Ok(self.by_employee.get(employee_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl EmployeeSource for ScriptedSource {
    async fn get_all_employees(&self) -> CoreResult<Vec<Employee>> {
        self.employee_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate("employees").await;
        if self.fail_employees.load(Ordering::SeqCst) {
            return Err(CoreError::transport("directory request failed"));
        }
        Ok(self.employees.clone())
    }
}

/// Yield until `condition` holds, so a spawned request is known to be in flight
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
