//! System Call Input Validation
//!
//! Decodes raw argument registers into typed clearance arguments.
//!
//! # Security Principles
//! - Validate ALL inputs before use
//! - Fail-secure: unknown selectors are rejected, never defaulted
//! - Registers are reinterpreted at their C width (`int`, `char`, `pid_t`)

use crate::clearance::{Flag, Levels};
use crate::error::ClearanceError;
use crate::process::ProcessId;

/// Reinterpret a register as a C `int`.
#[inline]
fn as_int(reg: u64) -> i32 {
    reg as u32 as i32
}

/// Decode the three assign levels.
///
/// Negative levels are kept as-is; the engine rejects them after the
/// privilege check.
pub fn levels(sword: u64, midnight: u64, clamp: u64) -> Levels {
    Levels::new(as_int(sword), as_int(midnight), as_int(clamp))
}

/// Decode a clearance selector (`'s'`, `'m'` or `'c'`).
///
/// Anything above the low byte makes the register invalid rather than
/// being truncated into a valid selector.
pub fn flag(reg: u64) -> Result<Flag, ClearanceError> {
    let selector = u8::try_from(reg).map_err(|_| ClearanceError::InvalidArgument)?;
    Flag::from_selector(selector)
}

/// Decode a propagation height; must be positive.
pub fn height(reg: u64) -> Result<u32, ClearanceError> {
    match as_int(reg) {
        h if h > 0 => Ok(h as u32),
        _ => Err(ClearanceError::InvalidArgument),
    }
}

/// Decode a target pid. Negative or zero values map to the reserved pid,
/// which never resolves.
pub fn pid(reg: u64) -> ProcessId {
    ProcessId::from_raw(as_int(reg) as i64)
}

/// Decode an exit status.
pub fn status(reg: u64) -> i32 {
    as_int(reg)
}
