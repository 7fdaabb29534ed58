//! Error Types
//!
//! Failures are returned as values; nothing here panics on caller input.

/// Errno values used on the syscall boundary.
pub mod errno {
    /// Operation not permitted
    pub const EPERM: i64 = 1;
    /// No such process
    pub const ESRCH: i64 = 3;
    /// Invalid argument
    pub const EINVAL: i64 = 22;
    /// Function not implemented
    pub const ENOSYS: i64 = 38;
}

/// Error type for clearance operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearanceError {
    /// Malformed flag selector, negative level or non-positive height.
    InvalidArgument,
    /// The caller lacks full privilege or the delegated clearance.
    PermissionDenied,
    /// The target does not resolve to a live process.
    NoSuchProcess,
}

impl ClearanceError {
    /// The positive errno value for this error.
    pub const fn errno(self) -> i64 {
        match self {
            Self::InvalidArgument => errno::EINVAL,
            Self::PermissionDenied => errno::EPERM,
            Self::NoSuchProcess => errno::ESRCH,
        }
    }
}

impl core::fmt::Display for ClearanceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::NoSuchProcess => write!(f, "no such process"),
        }
    }
}

/// Error type for process table administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryError {
    /// The pid does not name a live process.
    NoSuchProcess,
    /// The pid is already taken by a live process.
    PidInUse,
    /// The pid is reserved and can never name a process.
    InvalidPid,
    /// The requested parent link would make a process its own ancestor.
    WouldCycle,
}

impl core::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoSuchProcess => write!(f, "no such process"),
            Self::PidInUse => write!(f, "pid already in use"),
            Self::InvalidPid => write!(f, "reserved pid"),
            Self::WouldCycle => write!(f, "parent link would create a cycle"),
        }
    }
}

impl From<DirectoryError> for ClearanceError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NoSuchProcess => Self::NoSuchProcess,
            _ => Self::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(ClearanceError::InvalidArgument.errno(), 22);
        assert_eq!(ClearanceError::PermissionDenied.errno(), 1);
        assert_eq!(ClearanceError::NoSuchProcess.errno(), 3);
    }

    #[test]
    fn test_directory_error_conversion() {
        assert_eq!(
            ClearanceError::from(DirectoryError::NoSuchProcess),
            ClearanceError::NoSuchProcess
        );
        assert_eq!(
            ClearanceError::from(DirectoryError::PidInUse),
            ClearanceError::InvalidArgument
        );
    }
}
