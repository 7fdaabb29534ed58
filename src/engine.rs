//! Clearance Engine
//!
//! The four clearance operations. Each validates its arguments, applies its
//! gate, and reads or mutates clearance cells through the process directory.
//!
//! # Gates
//! - Assign: caller must be fully privileged (privilege oracle)
//! - Query-Self: none
//! - Query-Other, Propagate-Up: caller must already hold the flag it asks
//!   about (delegation rule), checked before any target lookup
//!
//! # Mutation Rules
//! - Assign replaces the caller's own set in one atomic swap
//! - Propagate-Up ORs one bit into each visited ancestor, under that
//!   ancestor's liveness guard; nothing is ever cleared

use crate::clearance::{Clearance, Flag, Levels};
use crate::error::ClearanceError;
use crate::privilege::PrivilegeOracle;
use crate::process::{ProcessDirectory, ProcessId, ProcessRecord};

/// Clearance operations over a process directory.
///
/// The caller is always passed explicitly; there is no implicit
/// "current process".
#[derive(Debug)]
pub struct ClearanceEngine<'a, D, P> {
    directory: &'a D,
    oracle: &'a P,
}

impl<'a, D, P> ClearanceEngine<'a, D, P>
where
    D: ProcessDirectory,
    P: PrivilegeOracle,
{
    pub const fn new(directory: &'a D, oracle: &'a P) -> Self {
        Self { directory, oracle }
    }

    /// Replace the caller's clearance set.
    ///
    /// # Errors
    /// - `PermissionDenied` if the caller is not fully privileged
    /// - `InvalidArgument` if any level is negative
    ///
    /// Neither failure touches the caller's set.
    pub fn assign(&self, caller: &ProcessRecord, levels: Levels) -> Result<(), ClearanceError> {
        if !self.oracle.is_privileged(caller) {
            log::debug!("[CLEARANCE] assign: pid {} not privileged", caller.pid());
            return Err(ClearanceError::PermissionDenied);
        }

        let set = levels.normalize().map_err(|e| {
            log::debug!("[CLEARANCE] assign: pid {} bad levels {:?}", caller.pid(), levels);
            e
        })?;

        let old = caller.clearance().replace(set);
        log::debug!(
            "[CLEARANCE] assign: pid {} {:#05b} -> {:#05b}",
            caller.pid(),
            old.bits(),
            set.bits()
        );
        Ok(())
    }

    /// [`assign`](Self::assign) with already-normalized flags.
    pub fn assign_clearance(
        &self,
        caller: &ProcessRecord,
        sword: bool,
        midnight: bool,
        clamp: bool,
    ) -> Result<(), ClearanceError> {
        self.assign(caller, Levels::from(Clearance::from_bools(sword, midnight, clamp)))
    }

    /// Whether the caller holds `flag`.
    pub fn query_own_clearance(&self, caller: &ProcessRecord, flag: Flag) -> bool {
        caller.clearance().has(flag)
    }

    /// Whether `target` holds `flag`, asked by a caller that holds it.
    ///
    /// # Errors
    /// - `PermissionDenied` if the caller lacks `flag`, whether or not the
    ///   target exists
    /// - `NoSuchProcess` if the target is not a live process
    pub fn query_other_clearance(
        &self,
        caller: &ProcessRecord,
        target: ProcessId,
        flag: Flag,
    ) -> Result<bool, ClearanceError> {
        self.require(caller, flag)?;

        let target = self.directory.resolve(target).ok_or_else(|| {
            log::debug!("[CLEARANCE] check: pid {} not found", target);
            ClearanceError::NoSuchProcess
        })?;

        target
            .with_live(|t| t.clearance().has(flag))
            .ok_or(ClearanceError::NoSuchProcess)
    }

    /// Grant `flag` to up to `height` ancestors of the caller.
    ///
    /// Returns the number of ancestors that did not hold `flag` before.
    /// The walk stops early when the chain runs out or an ancestor exits;
    /// neither is an error.
    ///
    /// # Errors
    /// - `InvalidArgument` if `height` is zero
    /// - `PermissionDenied` if the caller lacks `flag`
    pub fn propagate_clearance(
        &self,
        caller: &ProcessRecord,
        height: u32,
        flag: Flag,
    ) -> Result<u32, ClearanceError> {
        if height == 0 {
            return Err(ClearanceError::InvalidArgument);
        }
        self.require(caller, flag)?;

        let mut updated = 0;
        let mut visited = 0;
        for ancestor in self.directory.ancestors(caller, height) {
            match ancestor.with_live(|a| a.clearance().insert(flag)) {
                Some(true) => updated += 1,
                Some(false) => {}
                None => {
                    log::debug!(
                        "[CLEARANCE] propagate: ancestor {} exited mid-walk",
                        ancestor.pid()
                    );
                    break;
                }
            }
            visited += 1;
        }

        log::debug!(
            "[CLEARANCE] propagate: pid {} {} height {}: visited {}, updated {}",
            caller.pid(),
            flag,
            height,
            visited,
            updated
        );
        Ok(updated)
    }

    /// Delegation gate: the caller must hold `flag` itself.
    fn require(&self, caller: &ProcessRecord, flag: Flag) -> Result<(), ClearanceError> {
        if caller.clearance().has(flag) {
            Ok(())
        } else {
            log::debug!("[CLEARANCE] pid {} lacks {}", caller.pid(), flag);
            Err(ClearanceError::PermissionDenied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privilege::RootOracle;
    use crate::process::{Credentials, ProcessHandle, ProcessTable};
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    const ORACLE: RootOracle = RootOracle::new(0);

    /// g3 -> g2 -> g1 -> p, with p running as root.
    struct Tree {
        table: ProcessTable,
        g3: ProcessHandle,
        g2: ProcessHandle,
        g1: ProcessHandle,
        p: ProcessHandle,
    }

    fn tree() -> Tree {
        let table = ProcessTable::default();
        let g3 = table.spawn_root("g3", Credentials::user(1000));
        let g2 = table.spawn(g3.pid(), "g2", Credentials::user(1000)).unwrap();
        let g1 = table.spawn(g2.pid(), "g1", Credentials::user(1000)).unwrap();
        let p = table.spawn(g1.pid(), "p", Credentials::ROOT).unwrap();
        Tree {
            table,
            g3,
            g2,
            g1,
            p,
        }
    }

    #[test]
    fn test_assign_then_query_self() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        engine.assign(&t.p, Levels::new(1, 0, 1)).unwrap();
        assert!(engine.query_own_clearance(&t.p, Flag::Sword));
        assert!(!engine.query_own_clearance(&t.p, Flag::Midnight));
        assert!(engine.query_own_clearance(&t.p, Flag::Clamp));
    }

    #[test]
    fn test_assign_normalizes_and_replaces() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        engine.assign(&t.p, Levels::new(2, 9, 0)).unwrap();
        assert_eq!(t.p.clearance().load(), Clearance::SWORD | Clearance::MIDNIGHT);

        engine.assign_clearance(&t.p, false, false, true).unwrap();
        assert_eq!(t.p.clearance().load(), Clearance::CLAMP);
    }

    #[test]
    fn test_assign_is_idempotent() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        engine.assign(&t.p, Levels::new(0, 1, 1)).unwrap();
        let once = t.p.clearance().load();
        engine.assign(&t.p, Levels::new(0, 1, 1)).unwrap();
        assert_eq!(t.p.clearance().load(), once);
    }

    #[test]
    fn test_failed_assign_does_not_mutate() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        engine.assign(&t.p, Levels::new(1, 1, 0)).unwrap();
        assert_eq!(
            engine.assign(&t.p, Levels::new(0, -1, 1)),
            Err(ClearanceError::InvalidArgument)
        );
        assert_eq!(t.p.clearance().load(), Clearance::SWORD | Clearance::MIDNIGHT);
    }

    #[test]
    fn test_unprivileged_assign_denied() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        t.g1.clearance().replace(Clearance::MIDNIGHT);
        assert_eq!(
            engine.assign(&t.g1, Levels::new(1, 1, 1)),
            Err(ClearanceError::PermissionDenied)
        );
        // privilege is checked before the arguments
        assert_eq!(
            engine.assign(&t.g1, Levels::new(-1, 0, 0)),
            Err(ClearanceError::PermissionDenied)
        );
        assert_eq!(t.g1.clearance().load(), Clearance::MIDNIGHT);
    }

    #[test]
    fn test_query_other_requires_own_clearance() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        t.g2.clearance().replace(Clearance::SWORD);
        assert_eq!(
            engine.query_other_clearance(&t.p, t.g2.pid(), Flag::Sword),
            Err(ClearanceError::PermissionDenied)
        );
        // no existence leak for callers without the clearance
        assert_eq!(
            engine.query_other_clearance(&t.p, ProcessId::new(4242), Flag::Sword),
            Err(ClearanceError::PermissionDenied)
        );

        engine.assign(&t.p, Levels::new(1, 0, 0)).unwrap();
        assert_eq!(
            engine.query_other_clearance(&t.p, t.g2.pid(), Flag::Sword),
            Ok(true)
        );
        assert_eq!(
            engine.query_other_clearance(&t.p, t.g1.pid(), Flag::Sword),
            Ok(false)
        );
        assert_eq!(
            engine.query_other_clearance(&t.p, ProcessId::new(4242), Flag::Sword),
            Err(ClearanceError::NoSuchProcess)
        );
    }

    #[test]
    fn test_query_other_on_exited_target() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        engine.assign(&t.p, Levels::new(0, 0, 1)).unwrap();
        t.table.exit(t.g3.pid(), 0).unwrap();
        assert_eq!(
            engine.query_other_clearance(&t.p, t.g3.pid(), Flag::Clamp),
            Err(ClearanceError::NoSuchProcess)
        );
    }

    #[test]
    fn test_propagate_stops_at_chain_end() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        engine.assign(&t.p, Levels::new(1, 0, 1)).unwrap();
        assert!(engine.query_own_clearance(&t.p, Flag::Sword));
        assert!(!engine.query_own_clearance(&t.p, Flag::Midnight));

        assert_eq!(engine.propagate_clearance(&t.p, 5, Flag::Clamp), Ok(3));
        for ancestor in [&t.g1, &t.g2, &t.g3] {
            assert!(ancestor.clearance().has(Flag::Clamp));
        }
    }

    #[test]
    fn test_propagate_respects_height() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        engine.assign(&t.p, Levels::new(0, 1, 0)).unwrap();
        assert_eq!(engine.propagate_clearance(&t.p, 2, Flag::Midnight), Ok(2));
        assert!(t.g1.clearance().has(Flag::Midnight));
        assert!(t.g2.clearance().has(Flag::Midnight));
        assert!(!t.g3.clearance().has(Flag::Midnight));
    }

    #[test]
    fn test_propagate_is_monotonic_and_counts_flips() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        t.g1.clearance().replace(Clearance::SWORD | Clearance::CLAMP);
        t.g2.clearance().replace(Clearance::MIDNIGHT);
        engine.assign(&t.p, Levels::new(1, 0, 0)).unwrap();

        assert_eq!(engine.propagate_clearance(&t.p, 3, Flag::Sword), Ok(2));
        assert_eq!(t.g1.clearance().load(), Clearance::SWORD | Clearance::CLAMP);
        assert_eq!(t.g2.clearance().load(), Clearance::SWORD | Clearance::MIDNIGHT);
        assert_eq!(t.g3.clearance().load(), Clearance::SWORD);

        // second run finds nothing to do
        assert_eq!(engine.propagate_clearance(&t.p, 3, Flag::Sword), Ok(0));
    }

    #[test]
    fn test_propagate_gates() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        assert_eq!(
            engine.propagate_clearance(&t.p, 1, Flag::Clamp),
            Err(ClearanceError::PermissionDenied)
        );
        assert_eq!(
            engine.propagate_clearance(&t.p, 0, Flag::Clamp),
            Err(ClearanceError::InvalidArgument)
        );
        assert!(!t.g1.clearance().has(Flag::Clamp));
    }

    #[test]
    fn test_propagate_without_ancestors() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        t.g3.clearance().replace(Clearance::CLAMP);
        assert_eq!(engine.propagate_clearance(&t.g3, 4, Flag::Clamp), Ok(0));
    }

    #[test]
    fn test_propagate_stops_at_exited_ancestor() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        engine.assign(&t.p, Levels::new(1, 0, 0)).unwrap();
        t.table.exit(t.g2.pid(), 0).unwrap();
        assert_eq!(engine.propagate_clearance(&t.p, 5, Flag::Sword), Ok(1));
        assert!(t.g1.clearance().has(Flag::Sword));
        assert!(!t.g2.clearance().has(Flag::Sword));
        assert!(!t.g3.clearance().has(Flag::Sword));
    }

    #[test]
    fn test_propagate_ignores_reused_parent_pid() {
        let t = tree();
        let engine = ClearanceEngine::new(&t.table, &ORACLE);

        engine.assign(&t.p, Levels::new(0, 0, 1)).unwrap();
        let parent_pid = t.g1.pid();
        t.table.exit(parent_pid, 0).unwrap();
        let impostor = t
            .table
            .spawn_with_pid(parent_pid, None, "impostor", Credentials::user(1000))
            .unwrap();

        assert_eq!(engine.propagate_clearance(&t.p, 5, Flag::Clamp), Ok(0));
        assert!(!impostor.clearance().has(Flag::Clamp));
    }

    /// A directory whose parent links loop: 1 -> 2 -> 3 -> 2.
    struct LoopingDirectory {
        records: BTreeMap<ProcessId, ProcessHandle>,
        parents: BTreeMap<ProcessId, ProcessId>,
    }

    impl ProcessDirectory for LoopingDirectory {
        fn resolve(&self, pid: ProcessId) -> Option<ProcessHandle> {
            self.records.get(&pid).cloned()
        }

        fn parent(&self, child: &ProcessRecord) -> Option<ProcessHandle> {
            self.parents.get(&child.pid()).and_then(|p| self.resolve(*p))
        }
    }

    #[test]
    fn test_propagate_visits_each_ancestor_once_on_cycle() {
        let records: BTreeMap<_, _> = (1..=3)
            .map(|i| {
                let pid = ProcessId::new(i);
                let rec = ProcessRecord::new(pid, i as u64, None, Credentials::ROOT, String::new());
                (pid, Arc::new(rec))
            })
            .collect();
        let parents = [(1, 2), (2, 3), (3, 2)]
            .into_iter()
            .map(|(c, p)| (ProcessId::new(c), ProcessId::new(p)))
            .collect();
        let dir = LoopingDirectory { records, parents };
        let engine = ClearanceEngine::new(&dir, &ORACLE);

        let caller = dir.resolve(ProcessId::new(1)).unwrap();
        engine.assign(&caller, Levels::new(1, 0, 0)).unwrap();
        assert_eq!(engine.propagate_clearance(&caller, 10, Flag::Sword), Ok(2));

        let walked: Vec<_> = dir.ancestors(&caller, 10).map(|p| p.pid().as_u32()).collect();
        assert_eq!(walked, [2u32, 3]);
    }

    #[test]
    fn test_concurrent_assign_and_propagate_lose_nothing() {
        use std::thread;

        for _ in 0..50 {
            let t = tree();
            t.g1.clearance().replace(Clearance::NONE);
            // g1 is root-privileged for this test: run assign on it while
            // p propagates clamp into it.
            let oracle = |_: &ProcessRecord| true;
            t.p.clearance().replace(Clearance::CLAMP);

            thread::scope(|s| {
                s.spawn(|| {
                    let engine = ClearanceEngine::new(&t.table, &oracle);
                    engine.propagate_clearance(&t.p, 1, Flag::Clamp).unwrap()
                });
                s.spawn(|| {
                    let engine = ClearanceEngine::new(&t.table, &oracle);
                    engine.assign(&t.g1, Levels::new(1, 0, 0)).unwrap()
                });
            });

            // Either order leaves sword set; clamp is set unless assign
            // replaced the set after propagation. No mixed state is possible.
            let set = t.g1.clearance().load();
            assert!(set == Clearance::SWORD || set == Clearance::SWORD | Clearance::CLAMP);
        }
    }
}
