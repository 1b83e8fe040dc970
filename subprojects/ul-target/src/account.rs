use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned, little_endian::U64};

/// User account identifier, as used by the account service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned,
)]
#[repr(C)]
pub struct AccountUid {
    pub uid: [U64; 2],
}

const_assert_eq!(size_of::<AccountUid>(), 0x10);

impl AccountUid {
    /// The "no user selected" value.
    pub const INVALID: Self = Self {
        uid: [U64::ZERO, U64::ZERO],
    };

    /// Creates an account id from its two halves.
    #[inline]
    pub const fn new(lo: u64, hi: u64) -> Self {
        Self {
            uid: [U64::from_bytes(lo.to_le_bytes()), U64::from_bytes(hi.to_le_bytes())],
        }
    }

    /// Returns true if any bit of the id is set.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.uid[0].get() != 0 || self.uid[1].get() != 0
    }
}
