//! Memory-side collaborators of the cycle collector.
//!
//! The collector itself never looks inside objects. Everything it needs from
//! the memory manager is expressed by the [`CycleHeap`] trait: find cycle
//! candidates in a quiesced graph, read a live reference count, and release a
//! confirmed group of garbage together.
//!
//! [`RcHeap`] is a small thread-safe reference-counted object graph which
//! implements that trait, suitable for embedders without a heap of their own
//! and for exercising the collector in tests.

mod error;
pub mod heap;
mod object;
pub mod rc;

pub use self::error::HeapError;
pub use self::heap::CycleHeap;
pub use self::object::ObjectRef;
pub use self::rc::RcHeap;
