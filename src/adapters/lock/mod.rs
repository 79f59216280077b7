pub mod file;

use crate::types::errors::Result;

/// Held for the duration of a critical section; releases the lock on drop.
pub trait LockGuard: Send {}

pub trait LockManager: Send + Sync {
    /// Acquire an exclusive process lock with the specified timeout.
    /// # Errors
    /// Returns an error if the lock cannot be acquired within the timeout period.
    fn acquire_process_lock(&self, timeout_ms: u64) -> Result<Box<dyn LockGuard>>;

    /// Short label recorded in facts (`file`, `test`, ...).
    fn backend(&self) -> &'static str {
        "custom"
    }
}
