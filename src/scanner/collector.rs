//! Concurrency-safe result sink.

use crate::scanner::ScanResult;
use std::sync::Mutex;

/// Append-only sink shared by all workers of one scan invocation.
///
/// Appends are lossless and never duplicated under concurrent writers;
/// `snapshot()` returns a consistent copy of everything collected so far.
#[derive(Debug, Default)]
pub struct ResultCollector {
    results: Mutex<Vec<ScanResult>>,
}

impl ResultCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one result.
    pub fn push(&self, result: ScanResult) {
        if let Ok(mut results) = self.results.lock() {
            results.push(result);
        }
    }

    /// Append a batch, preserving its internal order.
    pub fn extend(&self, batch: Vec<ScanResult>) {
        if batch.is_empty() {
            return;
        }
        if let Ok(mut results) = self.results.lock() {
            results.extend(batch);
        }
    }

    /// Copy out everything collected so far.
    pub fn snapshot(&self) -> Vec<ScanResult> {
        self.results
            .lock()
            .map(|results| results.clone())
            .unwrap_or_default()
    }

    /// Number of collected results.
    pub fn len(&self) -> usize {
        self.results.lock().map(|results| results.len()).unwrap_or(0)
    }

    /// Check if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
