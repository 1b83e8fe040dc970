//! Homebrew (NRO) launch targets.
//!
//! The loader receives its target as a fixed 0x606-byte record: the NRO path,
//! its argument string and a flags word. The argument string starts with the
//! program path by convention, so an empty argv defaults to the path.

use alloc::string::{String, ToString};

use bitflags::bitflags;
use static_assertions::const_assert_eq;
use ul_ipc::FixedString;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned, little_endian::U32};

/// Capacity of every path buffer, terminator included.
pub const PATH_LEN: usize = 0x301;

/// NUL-padded path buffer.
pub type PathBuf = FixedString<PATH_LEN>;

bitflags! {
    /// Options attached to a homebrew launch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct LaunchFlags: u32 {
        /// Launch once, then fall back to the regular takeover target.
        const TARGET_ONCE = 1 << 0;
    }
}

/// Wire layout of a homebrew launch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RawHomebrewTarget {
    pub nro_path: PathBuf,
    pub nro_argv: PathBuf,
    pub flags: U32,
}

const_assert_eq!(size_of::<RawHomebrewTarget>(), 0x606);

impl RawHomebrewTarget {
    /// An all-zero target (no homebrew).
    pub const EMPTY: Self = Self {
        nro_path: PathBuf::empty(),
        nro_argv: PathBuf::empty(),
        flags: U32::ZERO,
    };

    /// Returns true if no NRO path is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nro_path.is_empty()
    }

    /// Returns the launch flags. Unknown bits are kept.
    #[inline]
    pub fn flags(&self) -> LaunchFlags {
        LaunchFlags::from_bits_retain(self.flags.get())
    }
}

impl Default for RawHomebrewTarget {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Typed homebrew launch target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HomebrewTarget {
    path: String,
    argv: String,
    flags: LaunchFlags,
}

impl HomebrewTarget {
    /// Creates a target for `path`. An empty `argv` is replaced by the path.
    pub fn new(path: impl Into<String>, argv: impl Into<String>, flags: LaunchFlags) -> Self {
        let path = path.into();
        let mut argv = argv.into();
        if argv.is_empty() {
            argv = path.clone();
        }
        Self { path, argv, flags }
    }

    /// NRO path on the SD card.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Argument string passed to the NRO.
    #[inline]
    pub fn argv(&self) -> &str {
        &self.argv
    }

    #[inline]
    pub fn flags(&self) -> LaunchFlags {
        self.flags
    }

    /// Returns true if both targets point at the same NRO.
    #[inline]
    pub fn same_nro(&self, other: &Self) -> bool {
        self.path == other.path
    }

    /// Encodes the target into its wire layout.
    pub fn to_raw(&self) -> Result<RawHomebrewTarget, TargetError> {
        let nro_path = PathBuf::new(&self.path).ok_or(TargetError::PathTooLong {
            len: self.path.len(),
        })?;
        let nro_argv = PathBuf::new(&self.argv).ok_or(TargetError::ArgvTooLong {
            len: self.argv.len(),
        })?;

        Ok(RawHomebrewTarget {
            nro_path,
            nro_argv,
            flags: U32::new(self.flags.bits()),
        })
    }

    /// Decodes a target from its wire layout.
    pub fn from_raw(raw: &RawHomebrewTarget) -> Result<Self, TargetError> {
        if raw.is_empty() {
            return Err(TargetError::EmptyPath);
        }
        let path = raw.nro_path.to_str().map_err(|_| TargetError::InvalidUtf8)?;
        let argv = raw.nro_argv.to_str().map_err(|_| TargetError::InvalidUtf8)?;

        Ok(Self::new(path.to_string(), argv.to_string(), raw.flags()))
    }
}

/// Error converting a launch target to or from its wire layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// The path does not fit in a path buffer.
    #[error("NRO path is too long ({len} bytes)")]
    PathTooLong { len: usize },
    /// The argument string does not fit in a path buffer.
    #[error("NRO argv is too long ({len} bytes)")]
    ArgvTooLong { len: usize },
    /// The record carries no path.
    #[error("NRO path is empty")]
    EmptyPath,
    /// A buffer is not valid UTF-8.
    #[error("NRO path or argv is not valid UTF-8")]
    InvalidUtf8,
    /// The application is not installed in a launchable state.
    #[error("application {application_id:#018x} is not launchable")]
    NotLaunchable { application_id: u64 },
}

impl From<TargetError> for ul_rc::Error {
    fn from(_: TargetError) -> Self {
        ul_rc::ul::INVALID_ARGUMENT
    }
}
