//! Fixed-capacity, NUL-padded string buffers.
//!
//! Paths, URLs and version strings travel as raw `char[N]` arrays: the text is
//! followed by at least one NUL byte and the rest of the array is zero. The
//! capacity is part of the wire contract, so it is part of the type.

use core::str::Utf8Error;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// NUL-padded string stored in exactly `N` bytes.
///
/// At most `N - 1` bytes of text fit, leaving room for the terminator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(transparent)]
pub struct FixedString<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedString<N> {
    /// Largest text length that fits.
    pub const MAX_LEN: usize = N.saturating_sub(1);

    /// Creates an empty (all-zero) buffer.
    #[inline]
    pub const fn empty() -> Self {
        Self { bytes: [0; N] }
    }

    /// Creates a buffer holding `text`.
    ///
    /// Returns `None` if the text does not fit or contains a NUL byte.
    pub fn new(text: &str) -> Option<Self> {
        let src = text.as_bytes();
        if src.len() > Self::MAX_LEN || src.contains(&0) {
            return None;
        }

        let mut bytes = [0u8; N];
        bytes[..src.len()].copy_from_slice(src);
        Some(Self { bytes })
    }

    /// Creates a buffer holding `text`, cut at the last character boundary that fits.
    pub fn new_truncate(text: &str) -> Self {
        let text = text.split('\0').next().unwrap_or_default();
        let mut len = text.len().min(Self::MAX_LEN);
        while !text.is_char_boundary(len) {
            len -= 1;
        }

        let mut bytes = [0u8; N];
        bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
        Self { bytes }
    }

    /// Wraps a raw array received from the wire.
    #[inline]
    pub const fn from_raw(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// Returns the full raw array, padding included.
    #[inline]
    pub const fn as_raw(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Returns the text bytes, up to the first NUL.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.bytes.iter().position(|&b| b == 0).unwrap_or(N);
        &self.bytes[..len]
    }

    /// Returns the text length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if the buffer holds no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.first().is_none_or(|&b| b == 0)
    }

    /// Returns the text as a `&str`.
    #[inline]
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        core::str::from_utf8(self.as_bytes())
    }
}

impl<const N: usize> Default for FixedString<N> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> core::fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_str() {
            Ok(text) => write!(f, "{text:?}"),
            Err(_) => write!(f, "{:?}", self.as_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FixedString;

    #[test]
    fn text_must_leave_room_for_terminator() {
        assert!(FixedString::<4>::new("abc").is_some());
        assert!(FixedString::<4>::new("abcd").is_none());
        assert!(FixedString::<8>::new("a\0b").is_none());
    }

    #[test]
    fn stops_at_first_nul() {
        let s = FixedString::<8>::from_raw(*b"sd:/\0xyz");

        assert_eq!(s.to_str(), Ok("sd:/"));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn unterminated_raw_array_uses_full_width() {
        let s = FixedString::<4>::from_raw(*b"abcd");

        assert_eq!(s.as_bytes(), b"abcd");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // "é" is two bytes; only one byte of room is left after "ab".
        let s = FixedString::<4>::new_truncate("abé");

        assert_eq!(s.to_str(), Ok("ab"));
    }

    #[test]
    fn empty_buffer() {
        let s = FixedString::<16>::default();

        assert!(s.is_empty());
        assert_eq!(s.to_str(), Ok(""));
        assert!(FixedString::<0>::empty().is_empty());
    }
}
