//! System Call Interface
//!
//! Exposes the clearance operations to user mode.
//!
//! # Security Model
//! - Whitelist approach: only explicitly implemented syscalls are allowed
//! - All parameters are validated before use
//! - Invalid inputs return negative errno values, never panic
//!
//! # Current Syscalls
//! - 0: exit(status) - terminate the calling process
//! - 1: hello() - log a greeting
//! - 2: set_sec(sword, midnight, clamp) - replace own clearances (root only)
//! - 3: get_sec(selector) - query own clearance
//! - 4: check_sec(pid, selector) - query another process's clearance
//! - 5: set_sec_branch(height, selector) - grant a clearance to ancestors

mod handler;
mod validate;

pub use handler::{dispatch, numbers, SyscallFrame};
