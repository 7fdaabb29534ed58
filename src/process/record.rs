//! Process Records
//!
//! A record is the directory's view of one process: identity, credentials,
//! a lookup-only parent link, lifecycle status and the clearance cell.
//!
//! # Structure
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     ProcessRecord                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  pid: ProcessId          - May be reused after exit      │
//! │  epoch: u64              - Never reused                  │
//! │  credentials             - uid / euid                    │
//! │  parent: ParentLink      - (pid, epoch), lookup only     │
//! │  status: RwLock<..>      - Running / Exited              │
//! │  clearance: ClearanceCell                                │
//! └──────────────────────────────────────────────────────────┘
//! ```

use alloc::string::String;
use alloc::sync::Arc;

use spin::RwLock;

use crate::clearance::ClearanceCell;

/// Process identifier.
///
/// Pid 0 is reserved and never names a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ProcessId(u32);

impl ProcessId {
    /// The reserved pid; never resolves.
    pub const RESERVED: Self = Self(0);

    /// Create a pid from its raw value.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Map a signed syscall argument to a pid.
    ///
    /// Values outside the pid range map to the reserved pid.
    pub fn from_raw(raw: i64) -> Self {
        u32::try_from(raw).map(Self).unwrap_or(Self::RESERVED)
    }

    /// Raw value.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Check for the reserved pid.
    #[inline]
    pub const fn is_reserved(self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identity of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Credentials {
    /// Real uid.
    pub uid: u32,
    /// Effective uid; the one privilege checks look at.
    pub euid: u32,
}

impl Credentials {
    /// Root credentials.
    pub const ROOT: Self = Self { uid: 0, euid: 0 };

    /// Credentials with equal real and effective uid.
    pub const fn user(uid: u32) -> Self {
        Self { uid, euid: uid }
    }
}

/// Lifecycle status of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Exited(i32),
}

/// Weak parent relation: names the parent, never owns it.
///
/// The epoch pins the link to one specific record, so a pid reused by a
/// later process does not satisfy it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub pid: ProcessId,
    pub epoch: u64,
}

/// Shared handle to a process record.
///
/// Holding a handle keeps the record's memory valid, not the process alive;
/// check [`ProcessRecord::is_alive`] or use [`ProcessRecord::with_live`].
pub type ProcessHandle = Arc<ProcessRecord>;

/// The directory's record of one process.
#[derive(Debug)]
pub struct ProcessRecord {
    pid: ProcessId,
    epoch: u64,
    credentials: Credentials,
    parent: RwLock<Option<ParentLink>>,
    status: RwLock<ProcessStatus>,
    clearance: ClearanceCell,
    debug_name: String,
}

impl ProcessRecord {
    /// Create a running record with an empty clearance set.
    pub fn new(
        pid: ProcessId,
        epoch: u64,
        parent: Option<ParentLink>,
        credentials: Credentials,
        debug_name: String,
    ) -> Self {
        Self {
            pid,
            epoch,
            credentials,
            parent: RwLock::new(parent),
            status: RwLock::new(ProcessStatus::Running),
            clearance: ClearanceCell::new(),
            debug_name,
        }
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    /// The link to use when making this record someone's parent.
    pub fn link(&self) -> ParentLink {
        ParentLink {
            pid: self.pid,
            epoch: self.epoch,
        }
    }

    /// Current parent link, if any.
    pub fn parent_link(&self) -> Option<ParentLink> {
        *self.parent.read()
    }

    pub(crate) fn set_parent_link(&self, link: Option<ParentLink>) {
        *self.parent.write() = link;
    }

    pub fn status(&self) -> ProcessStatus {
        *self.status.read()
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.status(), ProcessStatus::Running)
    }

    /// The clearance store of this process.
    pub fn clearance(&self) -> &ClearanceCell {
        &self.clearance
    }

    /// Run `f` while the process is guaranteed to stay alive.
    ///
    /// Returns `None` without calling `f` if the process has exited. The
    /// status lock is held for the duration of `f`, so `f` must be short.
    pub fn with_live<R>(&self, f: impl FnOnce(&Self) -> R) -> Option<R> {
        let status = self.status.read();
        match *status {
            ProcessStatus::Running => Some(f(self)),
            ProcessStatus::Exited(_) => None,
        }
    }

    /// Mark the process exited. Returns `false` if it had already exited.
    ///
    /// Waits for any in-flight `with_live` section on this record.
    pub(crate) fn mark_exited(&self, code: i32) -> bool {
        let mut status = self.status.write();
        match *status {
            ProcessStatus::Running => {
                *status = ProcessStatus::Exited(code);
                true
            }
            ProcessStatus::Exited(_) => false,
        }
    }
}
