//! Background Tasks Module
//!
//! # Tasks
//! - Store Cleanup: Purges expired entries from the in-process store

mod cleanup;

pub use cleanup::spawn_cleanup_task;
