use thiserror::Error;

use crate::ObjectRef;

/// Errors produced by mutator operations on an [`RcHeap`](crate::RcHeap)
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum HeapError {
    /// The object has already been reclaimed, either by its count reaching zero
    /// or by the cycle collector
    #[error("object {0} has been freed")]
    Freed(ObjectRef),
    /// An attempt was made to remove a reference which does not exist
    #[error("object {from} holds no reference to {to}")]
    MissingEdge { from: ObjectRef, to: ObjectRef },
}
