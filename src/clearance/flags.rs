//! Clearance Flags and Selectors
//!
//! Defines the fixed set of named clearances a process can hold.
//!
//! # Bit Layout
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Clearance (u32)              │
//! ├──────────────────────────────────────────────┤
//! │  bit 0: SWORD                                │
//! │  bit 1: MIDNIGHT                             │
//! │  bit 2: CLAMP                                │
//! │  bits 3..31: reserved, always zero           │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The layout is part of the syscall ABI and must not change.

use bitflags::bitflags;

use crate::error::ClearanceError;

bitflags! {
    /// The set of clearances held by one process.
    ///
    /// Only the three named bits can ever be present: every constructor
    /// used by this crate truncates unknown bits.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
    #[repr(transparent)]
    pub struct Clearance: u32 {
        /// Sword clearance.
        const SWORD = 1 << 0;

        /// Midnight clearance.
        const MIDNIGHT = 1 << 1;

        /// Clamp clearance.
        const CLAMP = 1 << 2;
    }
}

impl Clearance {
    /// No clearances.
    pub const NONE: Self = Self::empty();

    /// Check whether the given flag is held.
    #[inline]
    pub const fn has(self, flag: Flag) -> bool {
        self.contains(flag.bit())
    }

    /// Build a set from three booleans, in wire order.
    #[inline]
    pub const fn from_bools(sword: bool, midnight: bool, clamp: bool) -> Self {
        Self::from_bits_truncate(
            (sword as u32) | ((midnight as u32) << 1) | ((clamp as u32) << 2),
        )
    }
}

/// Wire selector bytes for [`Flag`].
pub mod selectors {
    pub const SWORD: u8 = b's';
    pub const MIDNIGHT: u8 = b'm';
    pub const CLAMP: u8 = b'c';
}

/// Selects exactly one clearance.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum Flag {
    /// Sword clearance (bit 0).
    Sword = 0,

    /// Midnight clearance (bit 1).
    Midnight = 1,

    /// Clamp clearance (bit 2).
    Clamp = 2,
}

impl Flag {
    /// All flags in bit order.
    pub const ALL: [Flag; 3] = [Flag::Sword, Flag::Midnight, Flag::Clamp];

    /// The single-bit clearance set for this flag.
    #[inline]
    pub const fn bit(self) -> Clearance {
        Clearance::from_bits_truncate(1 << self as u32)
    }

    /// Parse a wire selector byte.
    ///
    /// Unknown selectors are rejected, never mapped to a default.
    pub const fn from_selector(selector: u8) -> Result<Self, ClearanceError> {
        match selector {
            selectors::SWORD => Ok(Flag::Sword),
            selectors::MIDNIGHT => Ok(Flag::Midnight),
            selectors::CLAMP => Ok(Flag::Clamp),
            _ => Err(ClearanceError::InvalidArgument),
        }
    }

    /// The wire selector byte for this flag.
    #[inline]
    pub const fn selector(self) -> u8 {
        match self {
            Flag::Sword => selectors::SWORD,
            Flag::Midnight => selectors::MIDNIGHT,
            Flag::Clamp => selectors::CLAMP,
        }
    }

    /// Lowercase name, used in log output.
    pub const fn name(self) -> &'static str {
        match self {
            Flag::Sword => "sword",
            Flag::Midnight => "midnight",
            Flag::Clamp => "clamp",
        }
    }
}

impl TryFrom<u8> for Flag {
    type Error = ClearanceError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        Self::from_selector(selector)
    }
}

impl core::fmt::Display for Flag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw per-flag levels as passed to the assign operation.
///
/// Zero clears a flag, any positive value sets it, and any negative value
/// makes the whole request invalid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Levels {
    pub sword: i32,
    pub midnight: i32,
    pub clamp: i32,
}

impl Levels {
    /// Create levels from raw values.
    #[inline]
    pub const fn new(sword: i32, midnight: i32, clamp: i32) -> Self {
        Self {
            sword,
            midnight,
            clamp,
        }
    }

    /// Validate and pack the levels into a clearance set.
    ///
    /// Fails without producing a partial set if any level is negative.
    pub const fn normalize(self) -> Result<Clearance, ClearanceError> {
        if self.sword < 0 || self.midnight < 0 || self.clamp < 0 {
            return Err(ClearanceError::InvalidArgument);
        }
        Ok(Clearance::from_bools(
            self.sword != 0,
            self.midnight != 0,
            self.clamp != 0,
        ))
    }
}

impl From<Clearance> for Levels {
    fn from(set: Clearance) -> Self {
        Self {
            sword: set.contains(Clearance::SWORD) as i32,
            midnight: set.contains(Clearance::MIDNIGHT) as i32,
            clamp: set.contains(Clearance::CLAMP) as i32,
        }
    }
}
