//! Process Table
//!
//! Arena of process records indexed by pid. Parent relations are stored as
//! `ParentLink`s (pid + epoch) and resolved through the index, never as
//! owning pointers.
//!
//! # Locking
//! - `processes` index: `spin::RwLock`, held only for map access
//! - Structural changes (spawn, exit, reparent) take the index write lock
//!   for their whole duration, so they are serialized against each other
//! - Record status is flipped to `Exited` under the record's own lock, which
//!   waits out any in-flight clearance mutation on that record

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use spin::RwLock;

use super::directory::ProcessDirectory;
use super::record::{Credentials, ParentLink, ProcessHandle, ProcessId, ProcessRecord};
use crate::config::OrphanPolicy;
use crate::error::DirectoryError;

/// The global process tree.
#[derive(Debug)]
pub struct ProcessTable {
    processes: RwLock<BTreeMap<ProcessId, ProcessHandle>>,
    orphan_policy: OrphanPolicy,
    next_pid: AtomicU32,
    next_epoch: AtomicU64,
}

impl ProcessTable {
    /// Create an empty table.
    pub const fn new(orphan_policy: OrphanPolicy) -> Self {
        Self {
            processes: RwLock::new(BTreeMap::new()),
            orphan_policy,
            next_pid: AtomicU32::new(1),
            next_epoch: AtomicU64::new(1),
        }
    }

    /// Number of live processes.
    pub fn len(&self) -> usize {
        self.processes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pids of all live processes, in ascending order.
    pub fn pids(&self) -> Vec<ProcessId> {
        self.processes.read().keys().copied().collect()
    }

    /// Create a process with no parent.
    pub fn spawn_root(&self, debug_name: &str, credentials: Credentials) -> ProcessHandle {
        let mut processes = self.processes.write();
        let pid = self.alloc_pid(&processes);
        self.insert(&mut processes, pid, None, debug_name, credentials)
    }

    /// Create a child of `parent`.
    pub fn spawn(
        &self,
        parent: ProcessId,
        debug_name: &str,
        credentials: Credentials,
    ) -> Result<ProcessHandle, DirectoryError> {
        let mut processes = self.processes.write();
        let link = Self::live_link(&processes, parent)?;
        let pid = self.alloc_pid(&processes);
        Ok(self.insert(&mut processes, pid, Some(link), debug_name, credentials))
    }

    /// Create a process with an explicit pid, e.g. one freed by an exited
    /// process.
    pub fn spawn_with_pid(
        &self,
        pid: ProcessId,
        parent: Option<ProcessId>,
        debug_name: &str,
        credentials: Credentials,
    ) -> Result<ProcessHandle, DirectoryError> {
        if pid.is_reserved() {
            return Err(DirectoryError::InvalidPid);
        }

        let mut processes = self.processes.write();
        if processes.contains_key(&pid) {
            return Err(DirectoryError::PidInUse);
        }
        let link = match parent {
            Some(parent) => Some(Self::live_link(&processes, parent)?),
            None => None,
        };
        Ok(self.insert(&mut processes, pid, link, debug_name, credentials))
    }

    /// Terminate a process.
    ///
    /// The record is removed from the index and marked exited; handles held
    /// elsewhere stay valid but no longer pass liveness checks. Children are
    /// handled per the table's orphan policy.
    pub fn exit(&self, pid: ProcessId, code: i32) -> Result<ProcessHandle, DirectoryError> {
        let mut processes = self.processes.write();
        let record = processes
            .remove(&pid)
            .ok_or(DirectoryError::NoSuchProcess)?;
        record.mark_exited(code);

        let adopted = match self.orphan_policy {
            OrphanPolicy::ReparentTo(reaper) if reaper != pid => {
                processes.get(&reaper).map(|r| r.link())
            }
            _ => None,
        };

        if let Some(reaper) = adopted {
            let link = record.link();
            for child in processes.values() {
                if child.parent_link() == Some(link) {
                    child.set_parent_link(Some(reaper));
                    log::debug!("[PROCESS] pid {} reparented to {}", child.pid(), reaper.pid);
                }
            }
        }

        log::info!("[PROCESS] pid {} exited with status {}", pid, code);
        Ok(record)
    }

    /// Move `pid` under `new_parent`.
    ///
    /// Fails with `WouldCycle` if `pid` is `new_parent` or one of its
    /// ancestors.
    pub fn reparent(&self, pid: ProcessId, new_parent: ProcessId) -> Result<(), DirectoryError> {
        let processes = self.processes.write();
        let child = processes.get(&pid).ok_or(DirectoryError::NoSuchProcess)?;
        let link = Self::live_link(&processes, new_parent)?;

        // Walk up from the new parent; meeting `pid` means a cycle.
        let mut cursor = Some(link);
        let mut steps = 0;
        while let Some(current) = cursor {
            if current.pid == pid {
                return Err(DirectoryError::WouldCycle);
            }
            steps += 1;
            if steps > processes.len() {
                break;
            }
            cursor = processes
                .get(&current.pid)
                .filter(|rec| rec.epoch() == current.epoch)
                .and_then(|rec| rec.parent_link());
        }

        child.set_parent_link(Some(link));
        log::debug!("[PROCESS] pid {} reparented to {}", pid, new_parent);
        Ok(())
    }

    fn live_link(
        processes: &BTreeMap<ProcessId, ProcessHandle>,
        pid: ProcessId,
    ) -> Result<ParentLink, DirectoryError> {
        processes
            .get(&pid)
            .map(|rec| rec.link())
            .ok_or(DirectoryError::NoSuchProcess)
    }

    fn alloc_pid(&self, processes: &BTreeMap<ProcessId, ProcessHandle>) -> ProcessId {
        loop {
            let pid = ProcessId::new(self.next_pid.fetch_add(1, Ordering::Relaxed));
            if !pid.is_reserved() && !processes.contains_key(&pid) {
                return pid;
            }
        }
    }

    fn insert(
        &self,
        processes: &mut BTreeMap<ProcessId, ProcessHandle>,
        pid: ProcessId,
        parent: Option<ParentLink>,
        debug_name: &str,
        credentials: Credentials,
    ) -> ProcessHandle {
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        let record = Arc::new(ProcessRecord::new(
            pid,
            epoch,
            parent,
            credentials,
            String::from(debug_name),
        ));
        processes.insert(pid, record.clone());
        log::debug!(
            "[PROCESS] spawned pid {} ({}) parent {:?}",
            pid,
            debug_name,
            parent.map(|p| p.pid.as_u32())
        );
        record
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new(OrphanPolicy::Detach)
    }
}

impl ProcessDirectory for ProcessTable {
    fn resolve(&self, pid: ProcessId) -> Option<ProcessHandle> {
        self.processes
            .read()
            .get(&pid)
            .filter(|rec| rec.is_alive())
            .cloned()
    }
}
