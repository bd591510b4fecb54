// Mutex is used in place of the libstd Mutex, Condvar pairs with it for blocking waits.
// Neither poisons on panic.
pub use parking_lot::{const_mutex, Condvar, Mutex, MutexGuard, WaitTimeoutResult};

// RwLock is used for read-heavy scenarios where locking is required
pub use parking_lot::{const_rwlock, RwLock, RwLockReadGuard, RwLockWriteGuard};
