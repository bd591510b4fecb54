use std::sync::Arc;

use log::{debug, log_enabled, trace};

use cyclic_alloc::CycleHeap;
use cyclic_system::sync::{Condvar, Mutex};
use cyclic_system::time::MonotonicTime;

use crate::scheduler::Scheduler;
use crate::snapshot::RootSnapshot;
use crate::worker::WorkerRegistry;
use crate::{CollectorConfig, CollectorFlags, WorkerId};

/// Counters describing the work a collector has done since it was created
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CollectorStats {
    /// Rendezvous episodes in which every worker was brought to the barrier
    pub episodes: u64,
    /// Times the cycle detector was run
    pub scans: u64,
    /// Scans which found nothing to snapshot
    pub empty_scans: u64,
    /// Collection passes which consumed a snapshot
    pub collections: u64,
    /// Objects reclaimed by collection passes
    pub reclaimed: u64,
    /// Snapshot candidates left alone because their count changed
    pub disqualified: u64,
}

struct CollectorState {
    workers: WorkerRegistry,
    at_rendezvous: usize,
    flags: CollectorFlags,
    scheduler: Scheduler,
    roots: Option<RootSnapshot>,
    stats: CollectorStats,
}

/// Coordinates cycle scans and collection across all registered workers.
///
/// All state lives behind a single lock. The only place a caller can block is
/// [`CycleCollector::rendezvous`], and only while a scan or collection has been
/// requested: every alive worker must then reach a rendezvous (or deregister)
/// before any of them is released. A worker which stops calling `rendezvous`
/// without deregistering will stall the others.
pub struct CycleCollector {
    state: Mutex<CollectorState>,
    cond: Condvar,
    heap: Arc<dyn CycleHeap>,
    config: CollectorConfig,
}
impl CycleCollector {
    pub fn new(heap: Arc<dyn CycleHeap>, config: CollectorConfig) -> Self {
        debug!(target: "cycles", "creating cycle collector with {:?}", &config);
        let scheduler = Scheduler::new(&config, MonotonicTime::now());
        Self {
            state: Mutex::new(CollectorState {
                workers: WorkerRegistry::new(),
                at_rendezvous: 0,
                flags: CollectorFlags::empty(),
                scheduler,
                roots: None,
                stats: CollectorStats::default(),
            }),
            cond: Condvar::new(),
            heap,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    #[inline]
    pub fn heap(&self) -> &Arc<dyn CycleHeap> {
        &self.heap
    }

    pub fn stats(&self) -> CollectorStats {
        self.state.lock().stats
    }

    pub fn flags(&self) -> CollectorFlags {
        self.state.lock().flags
    }

    pub fn alive_workers(&self) -> usize {
        self.state.lock().workers.alive()
    }

    pub fn first_worker(&self) -> Option<WorkerId> {
        self.state.lock().workers.first()
    }

    /// Returns true if a scan has produced a snapshot which has not been collected yet
    pub fn has_snapshot(&self) -> bool {
        self.state.lock().roots.is_some()
    }

    /// Registers a worker. Must be called once per worker, before its first rendezvous.
    pub fn add_worker(&self, worker: WorkerId) {
        let mut state = self.state.lock();
        state.workers.add(worker);
        trace!(target: "cycles", "added {}, {} alive", worker, state.workers.alive());
    }

    /// Deregisters a worker, first applying any pending snapshot.
    pub fn remove_worker(&self, worker: WorkerId) {
        let mut state = self.state.lock();
        self.collect_locked(&mut state);
        state.workers.remove(worker);
        trace!(target: "cycles", "removed {}, {} alive", worker, state.workers.alive());
        // The barrier may have been waiting on this worker
        self.cond.notify_all();
    }

    /// Requests that the next rendezvous brings all workers to the barrier,
    /// either to scan for cycles or, if a snapshot is already pending, to collect it.
    pub fn schedule_collection(&self) {
        let mut state = self.state.lock();
        state.flags.insert(CollectorFlags::NEED_RENDEZVOUS);
        if state.roots.is_none() {
            state.flags.insert(CollectorFlags::NEED_ROOT_SCAN);
        } else {
            state.flags.insert(CollectorFlags::NEED_COLLECTION);
        }
        debug!(target: "cycles", "collection scheduled: {:?}", state.flags);
    }

    /// Applies the pending snapshot, if any, returning the number of objects reclaimed
    pub fn collect(&self) -> usize {
        let mut state = self.state.lock();
        self.collect_locked(&mut state)
    }

    /// Called by `worker` at each of its safepoints.
    ///
    /// Usually returns immediately. When a rendezvous has been requested, blocks
    /// until every alive worker has arrived; the last to arrive runs the rendezvous
    /// handler, and nobody returns before it has finished.
    pub fn rendezvous(&self, worker: WorkerId) {
        let mut state = self.state.lock();
        state.at_rendezvous += 1;
        debug_assert!(
            state.at_rendezvous <= state.workers.alive(),
            "{} reached a rendezvous without being registered",
            worker
        );

        if state.scheduler.should_trigger_scan(MonotonicTime::now) {
            trace!(target: "cycles", "scan due at tick {}", state.scheduler.tick());
            state
                .flags
                .insert(CollectorFlags::NEED_ROOT_SCAN | CollectorFlags::NEED_RENDEZVOUS);
        }

        if state.flags.contains(CollectorFlags::NEED_COLLECTION)
            && !state.flags.contains(CollectorFlags::NEED_RENDEZVOUS)
        {
            if self.config.spare_first_worker && state.workers.is_first(worker) {
                trace!(target: "cycles", "leaving pending collection to a worker other than {}", worker);
            } else {
                self.collect_locked(&mut state);
            }
        }

        if state.flags.contains(CollectorFlags::NEED_RENDEZVOUS) {
            while state.at_rendezvous < state.workers.alive()
                && state.flags.contains(CollectorFlags::NEED_RENDEZVOUS)
            {
                trace!(target: "cycles", "{} waiting at rendezvous ({}/{})", worker, state.at_rendezvous, state.workers.alive());
                self.cond.wait(&mut state);
            }
            // Whoever finds the flag still set once everyone has arrived runs the handler
            if state.flags.contains(CollectorFlags::NEED_RENDEZVOUS) {
                self.rendezvous_handler(&mut state);
                state.flags.remove(CollectorFlags::NEED_RENDEZVOUS);
                self.cond.notify_all();
            }
        }

        state.at_rendezvous -= 1;
    }

    // Runs while every alive worker is parked at the rendezvous, so it must stay short
    fn rendezvous_handler(&self, state: &mut CollectorState) {
        state.stats.episodes += 1;
        debug!(target: "cycles", "rendezvous of {} worker(s), pending {:?}", state.workers.alive(), state.flags);

        if state.flags.contains(CollectorFlags::NEED_COLLECTION) {
            self.collect_locked(state);
        }

        if state.flags.contains(CollectorFlags::NEED_ROOT_SCAN) && state.roots.is_none() {
            state.flags.remove(CollectorFlags::NEED_ROOT_SCAN);
            state.stats.scans += 1;
            let snapshot = self
                .heap
                .detect_cycles()
                .and_then(|candidates| RootSnapshot::capture(&*self.heap, candidates));
            match snapshot {
                Some(snapshot) => {
                    debug!(target: "cycles", "captured {} cycle candidate(s)", snapshot.len());
                    state.roots = Some(snapshot);
                    state.flags.insert(CollectorFlags::NEED_COLLECTION);
                }
                None => {
                    debug!(target: "cycles", "scan found no cycle candidates");
                    state.stats.empty_scans += 1;
                }
            }
        }
    }

    fn collect_locked(&self, state: &mut CollectorState) -> usize {
        let Some(roots) = state.roots.take() else {
            return 0;
        };

        let trial = roots.trial_delete(&*self.heap);
        if log_enabled!(target: "cycles", log::Level::Trace) {
            for object in trial.disqualified.iter() {
                trace!(target: "cycles", "{} changed since the scan, keeping it", object);
            }
        }
        let reclaimed = if trial.confirmed.is_empty() {
            0
        } else {
            self.heap.release_group(&trial.confirmed)
        };
        state.flags.remove(CollectorFlags::NEED_COLLECTION);

        state.stats.collections += 1;
        state.stats.reclaimed += reclaimed as u64;
        state.stats.disqualified += trial.disqualified.len() as u64;
        debug!(
            target: "cycles",
            "collected {} candidate(s): {} confirmed, {} disqualified, {} object(s) reclaimed",
            roots.len(),
            trial.confirmed.len(),
            trial.disqualified.len(),
            reclaimed
        );
        reclaimed
    }
}
