//! Clearance Store
//!
//! The per-process clearance bitmask, embedded in every process record.
//!
//! # Design
//! - One `AtomicU32` per process, zero at creation
//! - Every mutation is a single atomic read-modify-write:
//!   `replace` swaps the whole set, `insert` ORs one flag in
//! - No separate read-then-write, so a concurrent assign and propagation
//!   on the same process can never lose an update
//! - Mutators are crate-private; only the engine changes a set

use core::sync::atomic::{AtomicU32, Ordering};

use super::flags::{Clearance, Flag};

/// Atomic storage for a process's clearance set.
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct ClearanceCell(AtomicU32);

impl ClearanceCell {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Create a cell holding the given set.
    pub const fn with(initial: Clearance) -> Self {
        Self(AtomicU32::new(initial.bits()))
    }

    /// Snapshot of the current set.
    #[inline]
    pub fn load(&self) -> Clearance {
        Clearance::from_bits_truncate(self.0.load(Ordering::Acquire))
    }

    /// Check whether a flag is currently held.
    #[inline]
    pub fn has(&self, flag: Flag) -> bool {
        self.load().has(flag)
    }

    /// Replace the whole set. Returns the previous set.
    #[inline]
    pub(crate) fn replace(&self, set: Clearance) -> Clearance {
        Clearance::from_bits_truncate(self.0.swap(set.bits(), Ordering::AcqRel))
    }

    /// Add a flag. Returns `true` if the flag was not held before.
    #[inline]
    pub(crate) fn insert(&self, flag: Flag) -> bool {
        let bit = flag.bit().bits();
        self.0.fetch_or(bit, Ordering::AcqRel) & bit == 0
    }
}
