mod cycles;

use core::num::NonZeroUsize;

use log::trace;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use cyclic_system::sync::Mutex;

use crate::{CycleHeap, HeapError, ObjectRef};

/// A single reference-counted object.
///
/// `ref_count` counts every reference to the object: those held by mutators
/// (see [`RcHeap::retain`]) as well as those held by other objects
/// (see [`RcHeap::add_edge`]).
#[derive(Debug, Default)]
pub(crate) struct Object {
    pub(crate) ref_count: usize,
    pub(crate) edges: SmallVec<[ObjectRef; 4]>,
}

pub(crate) type ObjectMap = FxHashMap<ObjectRef, Object>;

struct HeapInner {
    objects: ObjectMap,
    // Identities are never reused, so a stale reference can always be told apart
    next_id: usize,
}

/// A thread-safe, reference-counted object graph.
///
/// Objects are freed eagerly when their count reaches zero, releasing the
/// references they hold in turn. Objects which keep each other alive through a
/// cycle are never freed this way; they are found by the detector in
/// [`CycleHeap::detect_cycles`] and reclaimed by [`CycleHeap::release_group`].
pub struct RcHeap {
    inner: Mutex<HeapInner>,
}
impl Default for RcHeap {
    fn default() -> Self {
        Self::new()
    }
}
impl RcHeap {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HeapInner {
                objects: ObjectMap::default(),
                next_id: 1,
            }),
        }
    }

    /// Allocates a new object with a reference count of one, owned by the caller
    pub fn allocate(&self) -> ObjectRef {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let object = ObjectRef::new(NonZeroUsize::new(id).unwrap());
        inner.objects.insert(
            object,
            Object {
                ref_count: 1,
                edges: SmallVec::new(),
            },
        );
        trace!(target: "heap", "allocated {}", object);
        object
    }

    /// Returns true if `object` has not been freed
    pub fn contains(&self, object: ObjectRef) -> bool {
        self.inner.lock().objects.contains_key(&object)
    }

    /// Returns the number of live objects
    pub fn len(&self) -> usize {
        self.inner.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the objects referenced by `object`, in the order the references were added
    pub fn references(&self, object: ObjectRef) -> Result<Vec<ObjectRef>, HeapError> {
        let inner = self.inner.lock();
        let obj = inner.objects.get(&object).ok_or(HeapError::Freed(object))?;
        Ok(obj.edges.to_vec())
    }

    /// Acquires an additional mutator-held reference to `object`
    pub fn retain(&self, object: ObjectRef) -> Result<(), HeapError> {
        let mut inner = self.inner.lock();
        let obj = inner
            .objects
            .get_mut(&object)
            .ok_or(HeapError::Freed(object))?;
        obj.ref_count += 1;
        Ok(())
    }

    /// Drops a mutator-held reference to `object`.
    ///
    /// Returns the number of objects freed as a result, which is zero unless this was
    /// the last reference.
    pub fn release(&self, object: ObjectRef) -> Result<usize, HeapError> {
        let mut inner = self.inner.lock();
        let obj = inner
            .objects
            .get_mut(&object)
            .ok_or(HeapError::Freed(object))?;
        obj.ref_count -= 1;
        if obj.ref_count > 0 {
            return Ok(0);
        }
        Ok(free_cascade(&mut inner.objects, vec![object]))
    }

    /// Records that `from` holds a reference to `to`
    pub fn add_edge(&self, from: ObjectRef, to: ObjectRef) -> Result<(), HeapError> {
        let mut inner = self.inner.lock();
        if !inner.objects.contains_key(&from) {
            return Err(HeapError::Freed(from));
        }
        let target = inner.objects.get_mut(&to).ok_or(HeapError::Freed(to))?;
        target.ref_count += 1;
        inner.objects.get_mut(&from).unwrap().edges.push(to);
        Ok(())
    }

    /// Drops one reference held by `from` to `to`.
    ///
    /// Returns the number of objects freed as a result.
    pub fn remove_edge(&self, from: ObjectRef, to: ObjectRef) -> Result<usize, HeapError> {
        let mut inner = self.inner.lock();
        let source = inner
            .objects
            .get_mut(&from)
            .ok_or(HeapError::Freed(from))?;
        let index = source
            .edges
            .iter()
            .position(|edge| *edge == to)
            .ok_or(HeapError::MissingEdge { from, to })?;
        source.edges.remove(index);

        // The target is alive, `from` held a counted reference to it
        let target = inner.objects.get_mut(&to).unwrap();
        target.ref_count -= 1;
        if target.ref_count > 0 {
            return Ok(0);
        }
        Ok(free_cascade(&mut inner.objects, vec![to]))
    }
}

impl CycleHeap for RcHeap {
    fn detect_cycles(&self) -> Option<Vec<ObjectRef>> {
        let inner = self.inner.lock();
        let candidates = cycles::unreachable(&inner.objects);
        trace!(target: "heap", "detector found {} candidate(s) among {} object(s)", candidates.len(), inner.objects.len());
        if candidates.is_empty() {
            None
        } else {
            Some(candidates)
        }
    }

    fn ref_count(&self, object: ObjectRef) -> Option<usize> {
        self.inner
            .lock()
            .objects
            .get(&object)
            .map(|obj| obj.ref_count)
    }

    fn release_group(&self, group: &[ObjectRef]) -> usize {
        let mut inner = self.inner.lock();
        cycles::release_group(&mut inner.objects, group)
    }
}

/// Frees every object in `dead`, all of which must have a zero count, along with
/// anything whose last reference was held by one of them.
pub(crate) fn free_cascade(objects: &mut ObjectMap, mut dead: Vec<ObjectRef>) -> usize {
    let mut freed = 0;
    while let Some(object) = dead.pop() {
        let Some(obj) = objects.remove(&object) else {
            continue;
        };
        debug_assert_eq!(obj.ref_count, 0);
        freed += 1;
        trace!(target: "heap", "freed {}", object);
        for edge in obj.edges {
            if let Some(target) = objects.get_mut(&edge) {
                target.ref_count -= 1;
                if target.ref_count == 0 {
                    dead.push(edge);
                }
            }
        }
    }
    freed
}
