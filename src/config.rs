//! Kernel Configuration
//!
//! Static knobs for the process table and the privilege oracle.

use crate::process::ProcessId;

/// What happens to the children of a process when it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Children keep a dangling parent link that never resolves again.
    #[default]
    Detach,

    /// Children are re-parented to the given reaper process, if it is alive.
    /// Falls back to `Detach` when the reaper is gone or is the exiting process.
    ReparentTo(ProcessId),
}

/// Configuration for a [`System`](crate::System).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Effective uid that counts as fully privileged.
    pub privileged_uid: u32,

    /// Orphan handling on process exit.
    pub orphan_policy: OrphanPolicy,
}

impl Config {
    /// Default configuration: root is privileged, orphans are detached.
    pub const fn new() -> Self {
        Self {
            privileged_uid: 0,
            orphan_policy: OrphanPolicy::Detach,
        }
    }

    /// Set the privileged uid.
    pub const fn with_privileged_uid(mut self, uid: u32) -> Self {
        self.privileged_uid = uid;
        self
    }

    /// Set the orphan policy.
    pub const fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
