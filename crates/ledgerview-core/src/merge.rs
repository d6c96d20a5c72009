//! Merge/dedup accumulator
//!
//! Pages and re-fetches may return records that were already shown, for
//! example when server-side pagination drifts. Folding a page into the
//! accumulated sequence keeps the first occurrence of every id in the order
//! ids were first seen.

use std::collections::HashSet;

use crate::models::Transaction;

/// Merge `incoming` into `previous`, dropping later duplicates by id.
///
/// A `None` base starts from `incoming` alone. The result never contains two
/// transactions with the same id. Runs in linear time.
pub fn merge(previous: Option<&[Transaction]>, incoming: &[Transaction]) -> Vec<Transaction> {
    let previous = previous.unwrap_or_default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(previous.len() + incoming.len());

    previous
        .iter()
        .chain(incoming)
        .filter(|tx| seen.insert(tx.id.as_str()))
        .cloned()
        .collect()
}

/// The accumulation base: the display sequence the next merge builds on
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    base: Option<Vec<Transaction>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a newly arrived batch into the base and return the new sequence
    pub fn fold(&mut self, incoming: &[Transaction]) -> &[Transaction] {
        let merged = merge(self.base.as_deref(), incoming);
        self.base.insert(merged).as_slice()
    }

    /// Start over from an empty base
    pub fn reset(&mut self) {
        self.base = None;
    }

    /// Current display sequence, `None` if nothing has been folded since the last reset
    pub fn current(&self) -> Option<&[Transaction]> {
        self.base.as_deref()
    }
}
