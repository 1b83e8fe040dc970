//! Service name type for uLaunch IPC endpoints.
//!
//! Horizon OS service names are up to 8 ASCII characters, zero padded, so the
//! whole name fits in a single `u64` register.

use static_assertions::const_assert_eq;

/// Fixed-capacity ASCII string for service names (max 8 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct ServiceName {
    name: [u8; 8],
}

const_assert_eq!(size_of::<ServiceName>(), size_of::<u64>());

impl ServiceName {
    /// Maximum length of a service name (8 characters).
    pub const MAX_LEN: usize = 8;

    /// Creates a service name from a string slice.
    ///
    /// Returns `None` if the name exceeds 8 characters or is not ASCII.
    #[inline]
    pub const fn new(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() > Self::MAX_LEN {
            return None;
        }

        let mut result = [0u8; 8];
        let mut c = 0;
        while c < bytes.len() {
            if !bytes[c].is_ascii() {
                return None;
            }
            result[c] = bytes[c];
            c += 1;
        }
        Some(Self { name: result })
    }

    /// Creates a service name, keeping only the first 8 characters.
    ///
    /// # Panics
    ///
    /// Panics if a kept character is not ASCII. Meant for constants.
    pub const fn new_truncate(name: &str) -> Self {
        let bytes = name.as_bytes();
        let len = if bytes.len() > Self::MAX_LEN {
            Self::MAX_LEN
        } else {
            bytes.len()
        };

        let mut result = [0u8; 8];
        let mut c = 0;
        while c < len {
            assert!(bytes[c].is_ascii(), "service name must be ASCII");
            result[c] = bytes[c];
            c += 1;
        }
        Self { name: result }
    }

    /// Returns the name as a string slice, without padding.
    pub fn as_str(&self) -> &str {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(Self::MAX_LEN);
        // Only ASCII bytes are ever stored.
        core::str::from_utf8(&self.name[..len]).unwrap_or_default()
    }

    /// Returns the name packed into a `u64`, as passed to the service manager.
    #[inline]
    pub const fn to_u64(self) -> u64 {
        u64::from_le_bytes(self.name)
    }
}

impl core::fmt::Display for ServiceName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceName;

    #[test]
    fn short_names_are_zero_padded() {
        let name = ServiceName::new("ulsf:p").unwrap();

        assert_eq!(name.as_str(), "ulsf:p");
        assert_eq!(name.to_u64(), u64::from_le_bytes(*b"ulsf:p\0\0"));
    }

    #[test]
    fn long_or_non_ascii_names_are_rejected() {
        assert!(ServiceName::new("too-long-name").is_none());
        assert!(ServiceName::new("ülsf").is_none());
    }

    #[test]
    fn truncating_constructor_keeps_eight_chars() {
        const NAME: ServiceName = ServiceName::new_truncate("too-long-name");

        assert_eq!(NAME.as_str(), "too-long");
    }
}
