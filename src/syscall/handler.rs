//! System Call Handler
//!
//! Dispatches system calls and implements individual syscall handlers.
//!
//! # Security Considerations
//! - All syscall numbers are validated against the whitelist
//! - Unknown syscalls return ENOSYS
//! - Parameters are validated before use
//! - The calling process is resolved once on entry and passed explicitly

use crate::error::{errno, ClearanceError};
use crate::privilege::PrivilegeOracle;
use crate::process::{ProcessDirectory, ProcessId, ProcessRecord};
use crate::system::System;

use super::validate;

/// System call numbers
pub mod numbers {
    pub const SYS_EXIT: usize = 0;
    pub const SYS_HELLO: usize = 1;
    pub const SYS_SET_SEC: usize = 2;
    pub const SYS_GET_SEC: usize = 3;
    pub const SYS_CHECK_SEC: usize = 4;
    pub const SYS_SET_SEC_BRANCH: usize = 5;
}

/// Raw register image of one system call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyscallFrame {
    /// System call number
    pub number: usize,
    /// Argument registers
    pub args: [u64; 6],
}

impl SyscallFrame {
    pub const fn new(number: usize, args: [u64; 6]) -> Self {
        Self { number, args }
    }
}

/// Dispatch a system call made by `caller`.
///
/// # Returns
/// Result value for the caller's return register: non-negative on success,
/// negative errno on failure.
///
/// # Security
/// - Unknown syscall numbers are rejected with ENOSYS
/// - A caller that is no longer alive gets ESRCH
/// - Each handler validates its own arguments
pub fn dispatch<P: PrivilegeOracle>(
    system: &System<P>,
    caller: ProcessId,
    frame: &SyscallFrame,
) -> i64 {
    let Some(current) = system.table().resolve(caller) else {
        log::debug!("[SYSCALL] caller pid {} is gone", caller);
        return -errno::ESRCH;
    };

    let [a0, a1, a2, ..] = frame.args;
    let result = match frame.number {
        numbers::SYS_EXIT => sys_exit(system, &current, validate::status(a0)),
        numbers::SYS_HELLO => sys_hello(&current),
        numbers::SYS_SET_SEC => sys_set_sec(system, &current, a0, a1, a2),
        numbers::SYS_GET_SEC => sys_get_sec(system, &current, a0),
        numbers::SYS_CHECK_SEC => sys_check_sec(system, &current, a0, a1),
        numbers::SYS_SET_SEC_BRANCH => sys_set_sec_branch(system, &current, a0, a1),
        _ => {
            log::warn!("[SYSCALL] Unknown syscall: {}", frame.number);
            return -errno::ENOSYS;
        }
    };

    match result {
        Ok(value) => value,
        Err(e) => {
            log::debug!(
                "[SYSCALL] {} from pid {} failed: {}",
                frame.number,
                caller,
                e
            );
            -e.errno()
        }
    }
}

/// Exit system call
///
/// Terminates the calling process with the given status code.
fn sys_exit<P: PrivilegeOracle>(
    system: &System<P>,
    current: &ProcessRecord,
    status: i32,
) -> Result<i64, ClearanceError> {
    system.table().exit(current.pid(), status)?;
    Ok(0)
}

/// Hello system call
fn sys_hello(current: &ProcessRecord) -> Result<i64, ClearanceError> {
    log::info!("[SYSCALL] Hello, World! (pid {})", current.pid());
    Ok(0)
}

/// Set-clearance system call
///
/// Replaces the caller's clearances. Root only.
///
/// # Returns
/// 0 on success, -EPERM if not privileged, -EINVAL on a negative level
fn sys_set_sec<P: PrivilegeOracle>(
    system: &System<P>,
    current: &ProcessRecord,
    sword: u64,
    midnight: u64,
    clamp: u64,
) -> Result<i64, ClearanceError> {
    let levels = validate::levels(sword, midnight, clamp);
    system.engine().assign(current, levels)?;
    Ok(0)
}

/// Get-clearance system call
///
/// # Returns
/// 1 if the caller holds the clearance, 0 if not, -EINVAL on a bad selector
fn sys_get_sec<P: PrivilegeOracle>(
    system: &System<P>,
    current: &ProcessRecord,
    selector: u64,
) -> Result<i64, ClearanceError> {
    let flag = validate::flag(selector)?;
    Ok(system.engine().query_own_clearance(current, flag) as i64)
}

/// Check-clearance system call
///
/// # Returns
/// 1 or 0 for the target's clearance; -EINVAL on a bad selector, -EPERM if
/// the caller lacks the clearance, -ESRCH if the target is not alive.
///
/// # Security
/// The caller's clearance is checked before the target is looked up, so a
/// caller without it cannot probe for process existence.
fn sys_check_sec<P: PrivilegeOracle>(
    system: &System<P>,
    current: &ProcessRecord,
    target: u64,
    selector: u64,
) -> Result<i64, ClearanceError> {
    let flag = validate::flag(selector)?;
    let target = validate::pid(target);
    let held = system
        .engine()
        .query_other_clearance(current, target, flag)?;
    Ok(held as i64)
}

/// Set-clearance-on-branch system call
///
/// # Returns
/// Number of ancestors updated; -EINVAL on a bad height or selector, -EPERM
/// if the caller lacks the clearance.
fn sys_set_sec_branch<P: PrivilegeOracle>(
    system: &System<P>,
    current: &ProcessRecord,
    height: u64,
    selector: u64,
) -> Result<i64, ClearanceError> {
    let height = validate::height(height)?;
    let flag = validate::flag(selector)?;
    let updated = system
        .engine()
        .propagate_clearance(current, height, flag)?;
    Ok(updated as i64)
}
