//! Top-level scan engine: target fan-out.

use crate::cancel::Cancellation;
use crate::scanner::{drain_pool, HostPortScanner, ResultCollector, ScanResult};
use crate::timing::TimingPolicy;
use crate::types::{Port, ScanTarget};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, trace, warn};

/// Scans multiple targets concurrently.
///
/// Mirrors [`HostPortScanner`] one tier up: one task per target on a pool
/// sized by the policy, each task running a fresh per-host scanner. The
/// engine owns overall cancellation; once cancelled it stops submitting
/// targets, aborts unretrieved target tasks, and returns whatever has been
/// collected. Worst-case concurrent connections are bounded by
/// `target_pool_size * port_pool_size`, a deliberate trade-off.
pub struct PortScanner {
    timing: TimingPolicy,
    cancel: Arc<Cancellation>,
}

impl PortScanner {
    /// Create an engine running under the given policy.
    pub fn new(timing: TimingPolicy) -> Self {
        let cancel = Arc::new(Cancellation::with_cleanup(|| {
            info!("scan cancellation requested, tearing down target pool");
        }));
        Self { timing, cancel }
    }

    /// Request cancellation. Safe from any thread; the caller's signal
    /// handler invokes this on interrupt.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check whether the scan was cancelled. Distinguishes "interrupted,
    /// partial results" from "complete" for the caller.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The timing policy this engine runs under.
    pub fn timing(&self) -> &TimingPolicy {
        &self.timing
    }

    /// Scan all `ports` on all `targets`.
    ///
    /// Returns a flat list: each target's port-ordered block, in target
    /// submission order. Empty targets or ports return an empty list with
    /// no work spawned. Network-level failures never bubble out of this
    /// call; they are classified into states on the results.
    pub async fn scan(&self, targets: &[ScanTarget], ports: &[Port]) -> Vec<ScanResult> {
        if targets.is_empty() || ports.is_empty() {
            return Vec::new();
        }

        info!(
            targets = targets.len(),
            ports = ports.len(),
            policy = %self.timing,
            "starting scan"
        );

        // Collector lives for this call only and is discarded after the
        // snapshot is extracted
        let collector = ResultCollector::new();
        let pool = Arc::new(Semaphore::new(self.timing.target_pool_size()));
        let mut handles = Vec::with_capacity(targets.len());

        for target in targets {
            if self.cancel.is_cancelled() {
                warn!("scan cancelled, stopping target submission");
                break;
            }
            let pool = Arc::clone(&pool);
            let timing = self.timing.clone();
            let ports = ports.to_vec();
            let ip = target.ip;
            handles.push(tokio::spawn(async move {
                let _permit = match pool.acquire_owned().await {
                    Ok(permit) => permit,
                    // Pool closed during teardown; contribute nothing
                    Err(_) => return Vec::new(),
                };
                let host_scanner = HostPortScanner::new(timing);
                host_scanner.scan_ports(ip, &ports).await
            }));
        }

        // Harvest per-target result blocks in submission order
        let mut aborted = Vec::new();
        for mut handle in handles {
            if self.cancel.is_cancelled() {
                handle.abort();
                aborted.push(handle);
                continue;
            }
            tokio::select! {
                joined = &mut handle => match joined {
                    Ok(results) => collector.extend(results),
                    Err(join_error) if join_error.is_cancelled() => {
                        trace!("target scan aborted");
                    }
                    Err(join_error) => {
                        error!(error = %join_error, "target scan task failed");
                    }
                },
                _ = self.cancel.cancelled() => {
                    handle.abort();
                    aborted.push(handle);
                }
            }
        }

        pool.close();
        drain_pool(aborted, self.timing.shutdown_grace()).await;

        collector.snapshot()
    }
}
