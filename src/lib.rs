//! Process Clearances for a Capability-Based Kernel
//!
//! Every process carries a small set of named boolean clearances
//! (`sword`, `midnight`, `clamp`).
//!
//! # Operations
//! - Assign: a fully privileged process replaces its own clearances
//! - Query-Self: any process reads its own clearances
//! - Query-Other: a process holding a clearance asks whether another
//!   process holds it too
//! - Propagate-Up: a process holding a clearance grants it to a bounded
//!   number of its ancestors
//!
//! # Security Properties
//! - Clearances are only ever replaced by their owner (with privilege) or
//!   added by a descendant that already holds them
//! - A caller can only probe or propagate clearances it holds, and the
//!   check happens before any target lookup
//! - Every bitmask mutation is one atomic read-modify-write
//! - Ancestor walks go through liveness-checked lookups and stop at the
//!   first exited or reused parent
//!
//! # Layout
//! - `clearance`: flag set, selectors and the per-process atomic store
//! - `process`: process records, the directory trait and the process table
//! - `privilege`: the privilege oracle
//! - `engine`: the clearance operations
//! - `syscall`: register-level syscall entry points

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod clearance;
pub mod config;
pub mod engine;
pub mod error;
pub mod privilege;
pub mod process;
pub mod syscall;
pub mod system;

pub use clearance::{Clearance, ClearanceCell, Flag, Levels};
pub use config::{Config, OrphanPolicy};
pub use engine::ClearanceEngine;
pub use error::{ClearanceError, DirectoryError};
pub use privilege::{PrivilegeOracle, RootOracle};
pub use process::{
    Credentials, ProcessDirectory, ProcessHandle, ProcessId, ProcessRecord, ProcessTable,
};
pub use system::System;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
