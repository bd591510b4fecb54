use crate::ObjectRef;

/// The interface the cycle collector consumes from the memory manager.
///
/// Every method is invoked with the collector lock held, and `detect_cycles` is
/// additionally only invoked while all registered workers are parked at a
/// rendezvous, so implementations may assume the graph is not being mutated by
/// any registered worker for its duration. Implementations must never call back
/// into the collector.
pub trait CycleHeap: Send + Sync {
    /// Returns the objects which are candidate members of garbage cycles.
    ///
    /// Returning `None` and returning an empty vector mean the same thing.
    fn detect_cycles(&self) -> Option<Vec<ObjectRef>>;

    /// Returns the current reference count of `object`, or `None` if it no longer exists
    fn ref_count(&self, object: ObjectRef) -> Option<usize>;

    /// Releases `group` as a single unit of garbage.
    ///
    /// References between members of the group must be broken before any member's
    /// storage is freed. Returns the number of objects actually reclaimed, which
    /// may include objects outside the group whose last reference was held by it.
    fn release_group(&self, group: &[ObjectRef]) -> usize;
}
