#![forbid(unsafe_code)]
//! policy-undelete: restore deleted policies from a persisted undo log.
//!
//! Safety model highlights:
//! - Every deletion is recorded as an undo record holding the exact policy documents it removed.
//! - Log mutations run load → mutate → persist under one exclusive file lock and replace the document atomically (temp file → fsync → renameat → fsync(parent)).
//! - A record leaves the log only after its replay succeeded, so a failed restore can always be retried.
//! - This crate forbids `unsafe` and uses `rustix` for syscalls.

pub mod constants;
pub mod adapters;
pub mod api;
pub mod config;
pub mod fs;
pub mod logging;
pub mod types;
pub mod undo;

pub use api::*;
