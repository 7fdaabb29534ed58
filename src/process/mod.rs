//! Process Tree
//!
//! The process directory the clearance engine runs against.
//!
//! # Design
//! - Records live in an arena (`ProcessTable`) addressed by pid
//! - Parent relations are weak: a `(pid, epoch)` link resolved on demand
//! - Callers see records through `Arc` handles and liveness checks

pub mod directory;
pub mod record;
pub mod table;

pub use directory::{Ancestors, ProcessDirectory};
pub use record::{
    Credentials, ParentLink, ProcessHandle, ProcessId, ProcessRecord, ProcessStatus,
};
pub use table::ProcessTable;
