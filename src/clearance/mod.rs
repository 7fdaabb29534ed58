//! Process Clearances
//!
//! A clearance is a named boolean capability held by a process.
//!
//! # Design
//! - Each process record embeds one `ClearanceCell`
//! - Assignment replaces the whole set; propagation only adds bits
//! - The bit layout (`sword`, `midnight`, `clamp`) is part of the syscall ABI

pub mod flags;
pub mod store;

pub use flags::{Clearance, Flag, Levels};
pub use store::ClearanceCell;
