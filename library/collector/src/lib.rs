//! Coordination layer for collecting reference cycles in a multi-threaded,
//! reference-counted runtime.
//!
//! Worker threads register with a [`CycleCollector`] when they start, call
//! [`CycleCollector::rendezvous`] at their safepoints, and deregister when they
//! stop. Most rendezvous calls only bump a counter; once the [`Scheduler`]
//! decides a scan is due, the next rendezvous becomes a barrier which parks
//! every worker while the heap's cycle detector runs and the reference counts
//! of its candidates are captured in a [`RootSnapshot`]. A later collection
//! pass reclaims those candidates whose counts have not changed since.
//!
//! The [`global`] module exposes the same operations over a single
//! process-wide collector.

mod collector;
mod config;
mod flags;
pub mod global;
mod scheduler;
mod snapshot;
mod worker;

pub use cyclic_alloc::{CycleHeap, ObjectRef};

pub use self::collector::{CollectorStats, CycleCollector};
pub use self::config::{CollectorConfig, ConfigError};
pub use self::flags::CollectorFlags;
pub use self::scheduler::Scheduler;
pub use self::snapshot::{RootSnapshot, TrialDeletion};
pub use self::worker::WorkerId;
