//! The process-wide collector.
//!
//! The runtime calls [`init`] once at startup, before any worker exists, and
//! [`deinit`] once at shutdown, after every worker has deregistered. In between,
//! the remaining functions forward to the single [`CycleCollector`] instance.
//!
//! Calling `init` twice, `deinit` without `init`, or any other function outside
//! of the `init`/`deinit` window is an integration bug and panics.
use std::sync::Arc;

use log::debug;

use cyclic_alloc::CycleHeap;
use cyclic_system::sync::{const_rwlock, RwLock};

use crate::{CollectorConfig, CollectorStats, CycleCollector, WorkerId};

static COLLECTOR: RwLock<Option<Arc<CycleCollector>>> = const_rwlock(None);

/// Creates the process-wide collector
pub fn init(heap: Arc<dyn CycleHeap>, config: CollectorConfig) {
    let mut collector = COLLECTOR.write();
    assert!(
        collector.is_none(),
        "the cycle collector must not be initialized twice"
    );
    *collector = Some(Arc::new(CycleCollector::new(heap, config)));
    debug!(target: "cycles", "global cycle collector initialized");
}

/// Destroys the process-wide collector.
///
/// The caller must guarantee that no worker is still registered or calling into it.
pub fn deinit() {
    let collector = COLLECTOR.write().take();
    let Some(collector) = collector else {
        panic!("the cycle collector must be initialized before it is deinitialized");
    };
    debug_assert_eq!(
        collector.alive_workers(),
        0,
        "the cycle collector was deinitialized with workers still registered"
    );
    debug!(target: "cycles", "global cycle collector deinitialized, {:?}", collector.stats());
}

/// Returns true between [`init`] and [`deinit`]
pub fn is_initialized() -> bool {
    COLLECTOR.read().is_some()
}

/// Returns the process-wide collector
pub fn get() -> Arc<CycleCollector> {
    match COLLECTOR.read().as_ref() {
        Some(collector) => collector.clone(),
        None => panic!("the cycle collector must be initialized"),
    }
}

#[inline]
pub fn add_worker(worker: WorkerId) {
    get().add_worker(worker)
}

#[inline]
pub fn remove_worker(worker: WorkerId) {
    get().remove_worker(worker)
}

#[inline]
pub fn rendezvous(worker: WorkerId) {
    // The collector is cloned out of the lock, as this may block for a while
    get().rendezvous(worker)
}

#[inline]
pub fn schedule_collection() {
    get().schedule_collection()
}

#[inline]
pub fn collect() -> usize {
    get().collect()
}

#[inline]
pub fn stats() -> CollectorStats {
    get().stats()
}
