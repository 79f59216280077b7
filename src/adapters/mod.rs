pub mod client;
pub mod lock;

pub use client::{HttpPolicyClient, PolicyClient, TransportError};
pub use lock::file::FileLockManager;
pub use lock::{LockGuard, LockManager};
