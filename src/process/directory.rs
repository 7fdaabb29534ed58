//! Process Directory Interface
//!
//! The clearance engine never touches the process tree directly. It goes
//! through a `ProcessDirectory`, which resolves pids to live records and
//! walks parent links.
//!
//! # Walk Safety
//! - Every step resolves the parent link through `parent()`, which only
//!   returns live records whose epoch matches the link
//! - Handles are `Arc`s, so a record yielded by the walk stays valid memory
//!   even if the process exits on another thread
//! - A failed lookup ends the walk; it is never an error

use alloc::collections::BTreeSet;

use super::record::{ProcessHandle, ProcessId, ProcessRecord};

/// Lookup interface over the process tree.
pub trait ProcessDirectory {
    /// Resolve a pid to a live process.
    fn resolve(&self, pid: ProcessId) -> Option<ProcessHandle>;

    /// Resolve the parent of a process.
    ///
    /// Returns `None` if there is no parent, the parent has exited, or the
    /// parent's pid now names a different process.
    fn parent(&self, child: &ProcessRecord) -> Option<ProcessHandle> {
        let link = child.parent_link()?;
        self.resolve(link.pid)
            .filter(|parent| parent.epoch() == link.epoch && parent.is_alive())
    }

    /// Walk up to `height` ancestors of `origin`, starting at its parent.
    fn ancestors<'a>(&'a self, origin: &'a ProcessRecord, height: u32) -> Ancestors<'a, Self>
    where
        Self: Sized,
    {
        Ancestors::new(self, origin, height)
    }
}

/// Bounded iterator over the ancestor chain of a process.
///
/// Yields at most `height` records and never yields the same record twice.
/// A repeated record means the directory's tree is corrupt; the walk logs it
/// and stops as if the chain were exhausted.
pub struct Ancestors<'a, D: ProcessDirectory> {
    directory: &'a D,
    origin: Option<&'a ProcessRecord>,
    last: Option<ProcessHandle>,
    remaining: u32,
    seen: BTreeSet<(ProcessId, u64)>,
}

impl<'a, D: ProcessDirectory> Ancestors<'a, D> {
    pub fn new(directory: &'a D, origin: &'a ProcessRecord, height: u32) -> Self {
        let mut seen = BTreeSet::new();
        seen.insert((origin.pid(), origin.epoch()));
        Self {
            directory,
            origin: Some(origin),
            last: None,
            remaining: height,
            seen,
        }
    }

    /// Number of further ancestors the walk may still visit.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl<D: ProcessDirectory> Iterator for Ancestors<'_, D> {
    type Item = ProcessHandle;

    fn next(&mut self) -> Option<ProcessHandle> {
        if self.remaining == 0 {
            return None;
        }

        let parent = match (self.last.take(), self.origin.take()) {
            (Some(last), _) => self.directory.parent(&last),
            (None, Some(origin)) => self.directory.parent(origin),
            (None, None) => None,
        }?;

        if !self.seen.insert((parent.pid(), parent.epoch())) {
            log::warn!(
                "[PROCESS] ancestor chain revisits pid {}; truncating walk",
                parent.pid()
            );
            self.remaining = 0;
            return None;
        }

        self.remaining -= 1;
        self.last = Some(parent.clone());
        Some(parent)
    }
}

impl<D: ProcessDirectory> core::iter::FusedIterator for Ancestors<'_, D> {}
