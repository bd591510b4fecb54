//! Low-level system primitives shared by the collector crates.
//!
//! Everything that touches the platform (locks, condition variables, clocks)
//! goes through this crate, so the rest of the workspace never names
//! `parking_lot` or `std::time` directly.

pub mod sync;
pub mod time;
