//! Per-target port fan-out.

use crate::cancel::Cancellation;
use crate::scanner::probe::{Probe, TcpProbe};
use crate::scanner::{drain_pool, ResultCollector, ScanResult};
use crate::timing::TimingPolicy;
use crate::types::Port;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, trace};

/// Grace granted to in-flight probes when the port pool is torn down.
const DRAIN_GRACE: Duration = Duration::from_secs(10);

/// Scans the requested ports of a single target concurrently.
///
/// One probe task per port, bounded by the policy's port pool size. Results
/// are collected in submission order; once cancellation is observed, no
/// further ports are submitted and unretrieved probes are aborted rather
/// than awaited. Already-collected results are always preserved.
pub struct HostPortScanner {
    timing: TimingPolicy,
    cancel: Arc<Cancellation>,
}

impl HostPortScanner {
    /// Create a scanner for one target under the given policy.
    pub fn new(timing: TimingPolicy) -> Self {
        // Pool teardown is scoped around each scan call, so cancellation
        // itself only needs to log here.
        let cancel = Arc::new(Cancellation::with_cleanup(|| {
            debug!("host scanner cancelled");
        }));
        Self { timing, cancel }
    }

    /// Request cancellation of this scan.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check whether this scan was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Shared handle to this scanner's cancellation.
    pub fn cancellation(&self) -> Arc<Cancellation> {
        Arc::clone(&self.cancel)
    }

    /// Scan `ports` on `target` with a TCP connect probe.
    ///
    /// Returns at most one result per port; ports never submitted because
    /// of mid-run cancellation are simply absent.
    pub async fn scan_ports(&self, target: IpAddr, ports: &[Port]) -> Vec<ScanResult> {
        let probe: Arc<dyn Probe> = Arc::new(TcpProbe::new(target, self.timing.timeout()));
        self.scan_ports_with(probe, ports).await
    }

    /// Scan with a caller-supplied probe. Lets tests drive the fan-out
    /// machinery with a scripted probe.
    pub async fn scan_ports_with(&self, probe: Arc<dyn Probe>, ports: &[Port]) -> Vec<ScanResult> {
        if ports.is_empty() {
            return Vec::new();
        }

        // Collector lives for this call only and is discarded after the
        // snapshot is extracted
        let collector = ResultCollector::new();
        let pool = Arc::new(Semaphore::new(self.timing.port_pool_size()));
        let mut handles = Vec::with_capacity(ports.len());

        for &port in ports {
            if self.cancel.is_cancelled() {
                debug!(host = %probe.target(), "cancelled - stopping port submission");
                break;
            }
            let probe = Arc::clone(&probe);
            let pool = Arc::clone(&pool);
            handles.push(tokio::spawn(async move {
                let _permit = match pool.acquire_owned().await {
                    Ok(permit) => permit,
                    // Pool closed during teardown; contribute nothing
                    Err(_) => return None,
                };
                Some(probe.probe(port).await)
            }));
        }

        // Harvest in submission order. A probe that finishes out of order
        // waits here for its turn; execution itself is unaffected.
        let mut aborted = Vec::new();
        for mut handle in handles {
            if self.cancel.is_cancelled() {
                handle.abort();
                aborted.push(handle);
                continue;
            }
            tokio::select! {
                joined = &mut handle => match joined {
                    Ok(Some(result)) => collector.push(result),
                    Ok(None) => {}
                    Err(join_error) if join_error.is_cancelled() => {
                        trace!("port probe aborted");
                    }
                    Err(join_error) => {
                        // A panicked probe loses its result, never the scan
                        error!(error = %join_error, "probe task failed");
                    }
                },
                _ = self.cancel.cancelled() => {
                    handle.abort();
                    aborted.push(handle);
                }
            }
        }

        // Teardown happens exactly once per call regardless of outcome
        pool.close();
        drain_pool(aborted, DRAIN_GRACE).await;

        collector.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::PortState;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    fn ports(list: &[u16]) -> Vec<Port> {
        list.iter().map(|&p| Port::new(p).unwrap()).collect()
    }

    /// Probe that reports every port closed and counts invocations.
    struct CountingProbe {
        target: IpAddr,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingProbe {
        fn new(delay: Duration) -> Self {
            Self {
                target: localhost(),
                calls: AtomicUsize::new(0),
                delay,
            }
        }
    }

    #[async_trait]
    impl Probe for CountingProbe {
        async fn probe(&self, port: Port) -> ScanResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            ScanResult::new(self.target, port, PortState::Closed)
                .with_reason("Connection refused (RST received)")
        }

        fn target(&self) -> IpAddr {
            self.target
        }
    }

    #[tokio::test]
    async fn test_empty_ports_yield_empty_results() {
        let scanner = HostPortScanner::new(TimingPolicy::normal());
        let results = scanner.scan_ports(localhost(), &[]).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_one_result_per_port_in_submission_order() {
        let scanner = HostPortScanner::new(TimingPolicy::normal());
        let probe = Arc::new(CountingProbe::new(Duration::ZERO));
        let requested = ports(&[80, 22, 443, 8080]);

        let results = scanner
            .scan_ports_with(Arc::clone(&probe) as Arc<dyn Probe>, &requested)
            .await;

        assert_eq!(results.len(), 4);
        let seen: Vec<u16> = results.iter().map(|r| r.port.as_u16()).collect();
        assert_eq!(seen, vec![80, 22, 443, 8080]);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_cancel_before_scan_spawns_no_probes() {
        let scanner = HostPortScanner::new(TimingPolicy::normal());
        scanner.cancel();

        let probe = Arc::new(CountingProbe::new(Duration::ZERO));
        let results = scanner
            .scan_ports_with(Arc::clone(&probe) as Arc<dyn Probe>, &ports(&[1, 2, 3]))
            .await;

        assert!(results.is_empty());
        assert!(scanner.is_cancelled());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_mid_harvest_keeps_collected_results() {
        // Small pool so later probes queue behind earlier ones
        let timing = TimingPolicy::custom("test")
            .port_pool_size(1)
            .build()
            .unwrap();
        let scanner = HostPortScanner::new(timing);
        let cancel = scanner.cancellation();

        // First probe returns quickly, the rest are slow enough that the
        // cancel lands while they are still in flight
        let probe = Arc::new(CountingProbe::new(Duration::from_millis(100)));
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            cancel.cancel();
        });

        let results = scanner
            .scan_ports_with(
                Arc::clone(&probe) as Arc<dyn Probe>,
                &ports(&[1, 2, 3, 4, 5, 6, 7, 8]),
            )
            .await;
        canceller.await.unwrap();

        assert!(scanner.is_cancelled());
        // Partial results: something was harvested, nothing was lost,
        // never more than one result per port
        assert!(!results.is_empty());
        assert!(results.len() < 8);
        let mut seen: Vec<u16> = results.iter().map(|r| r.port.as_u16()).collect();
        seen.dedup();
        assert_eq!(seen.len(), results.len());
    }

    #[tokio::test]
    async fn test_repeated_scans_do_not_accumulate() {
        let scanner = HostPortScanner::new(TimingPolicy::normal());
        let probe = Arc::new(CountingProbe::new(Duration::ZERO));
        let requested = ports(&[80, 443]);

        let first = scanner
            .scan_ports_with(Arc::clone(&probe) as Arc<dyn Probe>, &requested)
            .await;
        let second = scanner
            .scan_ports_with(Arc::clone(&probe) as Arc<dyn Probe>, &requested)
            .await;

        // Each call gets a fresh collector; nothing carries over
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn test_scan_against_live_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();

        let scanner = HostPortScanner::new(TimingPolicy::normal());
        let results = scanner
            .scan_ports(localhost(), &ports(&[open_port]))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state, PortState::Open);
        assert!(results[0].reason.contains("established"));
    }
}
