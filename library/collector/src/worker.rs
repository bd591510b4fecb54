use core::fmt;
use core::num::NonZeroUsize;

use log::trace;

/// The identity of a worker thread, as supplied by the runtime.
///
/// The collector never dereferences it; it is only counted and compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct WorkerId(NonZeroUsize);
impl WorkerId {
    #[inline]
    pub const fn new(raw: NonZeroUsize) -> Self {
        Self(raw)
    }

    /// Returns `None` if `raw` is the null value
    #[inline]
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0.get()
    }
}
impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "worker<{:#x}>", self.0.get())
    }
}

/// Tracks how many workers are alive, and which one registered first
#[derive(Debug, Default)]
pub(crate) struct WorkerRegistry {
    alive: usize,
    first: Option<WorkerId>,
}
impl WorkerRegistry {
    pub const fn new() -> Self {
        Self {
            alive: 0,
            first: None,
        }
    }

    #[inline]
    pub fn alive(&self) -> usize {
        self.alive
    }

    #[inline]
    pub fn first(&self) -> Option<WorkerId> {
        self.first
    }

    #[inline]
    pub fn is_first(&self, worker: WorkerId) -> bool {
        self.first == Some(worker)
    }

    pub fn add(&mut self, worker: WorkerId) {
        // The first worker is assumed to be the main (UI) thread
        if self.first.is_none() {
            trace!(target: "cycles", "{} is the first worker", worker);
            self.first = Some(worker);
        }
        self.alive += 1;
    }

    pub fn remove(&mut self, worker: WorkerId) {
        assert!(
            self.alive > 0,
            "attempted to remove {} when no workers are registered",
            worker
        );
        self.alive -= 1;
    }
}
