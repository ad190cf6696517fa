//! Scanning engine.
//!
//! Two bounded tiers of fan-out: the [`PortScanner`] engine runs one task
//! per target on a target-level pool, and each of those tasks runs a fresh
//! [`HostPortScanner`] that fans out one task per port on its own pool.
//! Results flow up through a [`ResultCollector`] at each tier and come back
//! as a single flat list.

pub mod collector;
pub mod engine;
pub mod host;
pub mod probe;
pub mod result;

pub use collector::ResultCollector;
pub use engine::PortScanner;
pub use host::HostPortScanner;
pub use probe::{fault_of, Probe, ProbeFault, TcpProbe};
pub use result::{PortState, ScanResult};

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

/// Drain a pool's leftover task handles within a bounded grace period.
///
/// Called exactly once at the end of each tier's scan call. Handles here
/// have already been aborted; waiting lets them unwind before the pool is
/// considered down. If the grace elapses the remaining handles are dropped,
/// which detaches them — aborted tasks terminate on their own.
pub(crate) async fn drain_pool<T>(handles: Vec<JoinHandle<T>>, grace: Duration) {
    if handles.is_empty() {
        return;
    }
    let count = handles.len();
    let drain = async {
        for handle in handles {
            let _ = handle.await;
        }
    };
    if tokio::time::timeout(grace, drain).await.is_err() {
        warn!(tasks = count, "pool did not drain within the grace period");
    }
}
