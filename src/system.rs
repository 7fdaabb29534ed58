//! System State
//!
//! Bundles the process table, the privilege oracle and the configuration:
//! the state a syscall dispatches against.

use crate::config::Config;
use crate::engine::ClearanceEngine;
use crate::privilege::{PrivilegeOracle, RootOracle};
use crate::process::ProcessTable;

/// Process table plus privilege oracle.
#[derive(Debug)]
pub struct System<P = RootOracle> {
    config: Config,
    table: ProcessTable,
    oracle: P,
}

impl System<RootOracle> {
    /// Create a system whose oracle trusts `config.privileged_uid`.
    pub const fn new(config: Config) -> Self {
        Self::with_oracle(config, RootOracle::new(config.privileged_uid))
    }
}

impl<P: PrivilegeOracle> System<P> {
    /// Create a system with a custom privilege oracle.
    pub const fn with_oracle(config: Config, oracle: P) -> Self {
        Self {
            config,
            table: ProcessTable::new(config.orphan_policy),
            oracle,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn oracle(&self) -> &P {
        &self.oracle
    }

    /// Clearance operations over this system's process table.
    pub fn engine(&self) -> ClearanceEngine<'_, ProcessTable, P> {
        ClearanceEngine::new(&self.table, &self.oracle)
    }
}

impl Default for System<RootOracle> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
