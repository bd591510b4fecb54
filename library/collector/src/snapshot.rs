use cyclic_alloc::{CycleHeap, ObjectRef};

/// The frozen result of a cycle scan: the candidate roots, and the reference
/// count each of them had while every worker was parked at the rendezvous.
///
/// A snapshot is never modified after capture. It is consumed whole by a
/// collection pass and then dropped.
#[derive(Debug)]
pub struct RootSnapshot {
    roots: Box<[ObjectRef]>,
    ref_counts: Box<[usize]>,
}

/// The outcome of comparing a [`RootSnapshot`] against the live heap
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TrialDeletion {
    /// Candidates whose count is unchanged since the snapshot was taken
    pub confirmed: Vec<ObjectRef>,
    /// Candidates whose count changed, or which were freed in the meantime
    pub disqualified: Vec<ObjectRef>,
}

impl RootSnapshot {
    /// Records the current reference count of every candidate.
    ///
    /// Candidates the heap no longer knows about are skipped. Returns `None` if
    /// nothing is left to snapshot.
    pub fn capture(heap: &dyn CycleHeap, candidates: Vec<ObjectRef>) -> Option<Self> {
        let (roots, ref_counts): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .filter_map(|object| heap.ref_count(object).map(|count| (object, count)))
            .unzip();
        if roots.is_empty() {
            return None;
        }
        Some(Self {
            roots: roots.into_boxed_slice(),
            ref_counts: ref_counts.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    #[inline]
    pub fn roots(&self) -> &[ObjectRef] {
        &self.roots
    }

    #[inline]
    pub fn ref_counts(&self) -> &[usize] {
        &self.ref_counts
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectRef, usize)> + '_ {
        self.roots
            .iter()
            .copied()
            .zip(self.ref_counts.iter().copied())
    }

    /// Splits the candidates into those which may be reclaimed and those which must not.
    ///
    /// An unchanged count means no reference to the candidate has been created
    /// since the scan, so every reference to it still comes from inside the
    /// garbage found by the detector. Any change proves an outside reference
    /// arrived (or left), and the candidate is left alone for this pass.
    pub fn trial_delete(&self, heap: &dyn CycleHeap) -> TrialDeletion {
        let mut result = TrialDeletion::default();
        for (object, captured) in self.iter() {
            if heap.ref_count(object) == Some(captured) {
                result.confirmed.push(object);
            } else {
                result.disqualified.push(object);
            }
        }
        result
    }
}
