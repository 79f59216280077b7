pub mod atomic;
pub mod paths;

pub use atomic::{atomic_write, fsync_parent_dir, open_dir};
pub use paths::{default_log_path, lock_path_for};
