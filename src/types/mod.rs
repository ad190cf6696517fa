//! Core type definitions.

mod port;
mod target;

pub use port::{Port, PortError, PortSpec};
pub use target::{expand_targets, ScanTarget, TargetError, TargetSpec};
