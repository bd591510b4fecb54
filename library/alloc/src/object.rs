use core::fmt;
use core::num::NonZeroUsize;

use static_assertions::assert_eq_size;

/// An opaque, pointer-sized reference to a heap object.
///
/// The collector only ever copies, compares and hands these back to the heap
/// which minted them; what the bits mean is up to the heap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ObjectRef(NonZeroUsize);

assert_eq_size!(ObjectRef, usize);
assert_eq_size!(Option<ObjectRef>, usize);

impl ObjectRef {
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
impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#obj<{:#x}>", self.0.get())
    }
}
