//! Privilege Oracle
//!
//! Answers whether a calling process holds full privilege. Only the assign
//! operation asks; every other gate is a clearance the caller already holds.

use crate::process::ProcessRecord;

/// Decides whether a caller is fully privileged.
pub trait PrivilegeOracle {
    fn is_privileged(&self, caller: &ProcessRecord) -> bool;
}

/// Privileged iff the caller's effective uid is the configured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootOracle {
    privileged_uid: u32,
}

impl RootOracle {
    pub const fn new(privileged_uid: u32) -> Self {
        Self { privileged_uid }
    }

    pub const fn privileged_uid(&self) -> u32 {
        self.privileged_uid
    }
}

impl Default for RootOracle {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PrivilegeOracle for RootOracle {
    fn is_privileged(&self, caller: &ProcessRecord) -> bool {
        caller.credentials().euid == self.privileged_uid
    }
}

impl<F> PrivilegeOracle for F
where
    F: Fn(&ProcessRecord) -> bool,
{
    fn is_privileged(&self, caller: &ProcessRecord) -> bool {
        self(caller)
    }
}
