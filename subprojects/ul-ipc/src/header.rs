//! Command envelope shared by every uLaunch channel.
//!
//! # Wire Format
//!
//! ```text
//! offset  size  field
//! 0x0     4     magic   (channel family + protocol version, LE)
//! 0x4     4     val     (opcode on requests, result code on replies, LE)
//! 0x8     ...   payload (shape implied by the opcode)
//! ```
//!
//! There is no length field: every catalog fixes the payload shape of each
//! opcode, and the whole envelope must fit in [`COMMAND_STORAGE_SIZE`] bytes.
//!
//! [`COMMAND_STORAGE_SIZE`]: crate::storage::COMMAND_STORAGE_SIZE

use static_assertions::const_assert_eq;
use ul_rc::ResultCode;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned, little_endian::U32};

use crate::storage::COMMAND_STORAGE_SIZE;

/// Envelope header preceding every request and reply payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct CommandHeader {
    /// Channel magic
    pub magic: U32,
    /// Opcode or result code
    pub val: U32,
}

const_assert_eq!(size_of::<CommandHeader>(), 0x8);

impl CommandHeader {
    /// Creates a header from native values.
    #[inline]
    pub fn new(magic: u32, val: u32) -> Self {
        Self {
            magic: U32::new(magic),
            val: U32::new(val),
        }
    }

    /// Creates a reply header carrying `result`.
    #[inline]
    pub fn reply(magic: u32, result: ResultCode) -> Self {
        Self::new(magic, result.to_raw())
    }

    /// Returns the magic.
    #[inline]
    pub fn magic(&self) -> u32 {
        self.magic.get()
    }

    /// Returns the opcode or result code.
    #[inline]
    pub fn val(&self) -> u32 {
        self.val.get()
    }

    /// Interprets `val` as a reply result code.
    #[inline]
    pub fn result_code(&self) -> ResultCode {
        ResultCode::from_raw(self.val.get())
    }
}

/// Message-type enumeration of one channel family.
///
/// Implemented by each catalog's opcode enum; the magic identifies the
/// family on the wire.
pub trait Message: Copy + core::fmt::Debug {
    /// Magic written in every envelope of this family.
    const MAGIC: u32;

    /// Capacity of the exchange buffer used for each direction.
    const STORAGE_SIZE: usize = COMMAND_STORAGE_SIZE;

    /// Creates a message from its opcode.
    ///
    /// Returns `None` if the opcode is not part of the catalog.
    fn from_raw(raw: u32) -> Option<Self>;

    /// Returns the opcode.
    fn to_raw(self) -> u32;
}
