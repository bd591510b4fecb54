//! Trial deletion over the reference heap.
//!
//! Both routines below use the same trick: subtract from each object's count
//! the references it receives from inside some set of objects. Whatever count
//! remains must be held from outside the set, so those objects, and everything
//! reachable from them, are still live.
use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ObjectRef;

use super::{free_cascade, ObjectMap};

/// Returns every object which cannot be reached from a reference held outside
/// of the heap, in ascending order.
pub(super) fn unreachable(objects: &ObjectMap) -> Vec<ObjectRef> {
    let members = objects.keys().copied().collect::<FxHashSet<_>>();
    let mut garbage = unreferenced_subset(objects, &members)
        .into_iter()
        .collect::<Vec<_>>();
    garbage.sort_unstable();
    garbage
}

/// Reclaims the largest subset of `group` which is referenced only from inside
/// itself. Returns the total number of objects freed.
pub(super) fn release_group(objects: &mut ObjectMap, group: &[ObjectRef]) -> usize {
    let members = group
        .iter()
        .copied()
        .filter(|object| objects.contains_key(object))
        .collect::<FxHashSet<_>>();
    let closed = unreferenced_subset(objects, &members);
    if closed.len() < members.len() {
        trace!(target: "heap", "{} group member(s) are still referenced from outside the group", members.len() - closed.len());
    }
    if closed.is_empty() {
        return 0;
    }

    // Break internal references first, then drop the references leaving the group
    let mut dead = Vec::new();
    let mut freed = 0;
    for object in closed.iter() {
        let obj = objects.remove(object).unwrap();
        freed += 1;
        trace!(target: "heap", "freed cyclic {}", object);
        for edge in obj.edges {
            if closed.contains(&edge) {
                continue;
            }
            if let Some(target) = objects.get_mut(&edge) {
                target.ref_count -= 1;
                if target.ref_count == 0 {
                    dead.push(edge);
                }
            }
        }
    }

    freed + free_cascade(objects, dead)
}

/// Returns the members of `members` which are not reachable from any reference
/// originating outside of `members`.
fn unreferenced_subset(objects: &ObjectMap, members: &FxHashSet<ObjectRef>) -> FxHashSet<ObjectRef> {
    let mut residual = members
        .iter()
        .map(|object| (*object, objects[object].ref_count))
        .collect::<FxHashMap<_, _>>();
    for object in members.iter() {
        for edge in objects[object].edges.iter() {
            if let Some(count) = residual.get_mut(edge) {
                *count = count.saturating_sub(1);
            }
        }
    }

    let mut live = FxHashSet::default();
    let mut worklist = residual
        .iter()
        .filter_map(|(object, count)| if *count > 0 { Some(*object) } else { None })
        .collect::<Vec<_>>();
    while let Some(object) = worklist.pop() {
        if !live.insert(object) {
            continue;
        }
        for edge in objects[&object].edges.iter() {
            if members.contains(edge) && !live.contains(edge) {
                worklist.push(*edge);
            }
        }
    }

    members.difference(&live).copied().collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{CycleHeap, RcHeap};

    #[test]
    fn detects_nothing_in_acyclic_heap() {
        let heap = RcHeap::new();
        let a = heap.allocate();
        let b = heap.allocate();
        heap.add_edge(a, b).unwrap();
        assert_eq!(heap.detect_cycles(), None);
    }

    #[test]
    fn detects_orphaned_cycles_only() {
        let heap = RcHeap::new();
        let a = heap.allocate();
        let b = heap.allocate();
        heap.add_edge(a, b).unwrap();
        heap.add_edge(b, a).unwrap();
        heap.release(a).unwrap();
        heap.release(b).unwrap();

        // A second cycle which is still held by a mutator
        let c = heap.allocate();
        let d = heap.allocate();
        heap.add_edge(c, d).unwrap();
        heap.add_edge(d, c).unwrap();
        heap.release(d).unwrap();

        assert_eq!(heap.detect_cycles(), Some(vec![a, b]));
    }

    #[test]
    fn objects_hanging_off_garbage_are_candidates() {
        let heap = RcHeap::new();
        let a = heap.allocate();
        let b = heap.allocate();
        let leaf = heap.allocate();
        heap.add_edge(a, b).unwrap();
        heap.add_edge(b, a).unwrap();
        heap.add_edge(b, leaf).unwrap();
        heap.release(a).unwrap();
        heap.release(b).unwrap();
        heap.release(leaf).unwrap();

        assert_eq!(heap.detect_cycles(), Some(vec![a, b, leaf]));
        assert_eq!(heap.release_group(&[a, b, leaf]), 3);
        assert!(heap.is_empty());
    }

    #[test]
    fn release_group_keeps_externally_referenced_members() {
        let heap = RcHeap::new();
        let a = heap.allocate();
        let b = heap.allocate();
        heap.add_edge(a, b).unwrap();
        heap.add_edge(b, a).unwrap();
        heap.release(b).unwrap();

        // `a` is still held, so `b` is reachable through it
        assert_eq!(heap.release_group(&[a, b]), 0);
        assert!(heap.contains(a));
        assert!(heap.contains(b));

        // A group of only `b` is not closed either
        assert_eq!(heap.release_group(&[b]), 0);
        assert!(heap.contains(b));
    }

    #[test]
    fn release_group_drops_references_leaving_the_group() {
        let heap = RcHeap::new();
        let a = heap.allocate();
        let b = heap.allocate();
        let shared = heap.allocate();
        heap.add_edge(a, b).unwrap();
        heap.add_edge(b, a).unwrap();
        heap.add_edge(a, shared).unwrap();
        heap.release(a).unwrap();
        heap.release(b).unwrap();

        assert_eq!(heap.ref_count(shared), Some(2));
        assert_eq!(heap.release_group(&[a, b]), 2);
        assert_eq!(heap.ref_count(shared), Some(1));
        assert_eq!(heap.release(shared).unwrap(), 1);
    }

    #[test]
    fn release_group_ignores_freed_members() {
        let heap = RcHeap::new();
        let a = heap.allocate();
        heap.release(a).unwrap();
        assert_eq!(heap.release_group(&[a]), 0);
    }
}
