//! Persisted launcher options.
//!
//! The storage format belongs to the configuration layer; this module only
//! defines the entry catalog, the typed values and the [`ConfigSource`]
//! collaborator the daemon reads and writes through.

use alloc::{string::String, vec::Vec};

/// Identifier of a configuration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConfigEntryId {
    /// Program id of the library applet replaced by the menu.
    MenuTakeoverProgramId = 0,
    /// Program id of the library applet used to run homebrew as an applet.
    HomebrewAppletTakeoverProgramId = 1,
    /// Application id used to run homebrew as an application (0 if unset).
    HomebrewApplicationTakeoverApplicationId = 2,
    /// Whether the USB screen viewer is enabled.
    ViewerUsbEnabled = 3,
    /// Base name of the active theme (empty for the default theme).
    ActiveThemeName = 4,
}

/// Value type of a configuration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConfigEntryType {
    Bool = 0,
    U64 = 1,
    String = 2,
}

/// Shop applet
pub const DEFAULT_MENU_TAKEOVER_PROGRAM_ID: u64 = 0x010000000000100B;
/// Photo viewer applet
pub const DEFAULT_HOMEBREW_APPLET_TAKEOVER_PROGRAM_ID: u64 = 0x010000000000100D;

impl ConfigEntryId {
    /// All entries, in id order.
    pub const ALL: [Self; 5] = [
        Self::MenuTakeoverProgramId,
        Self::HomebrewAppletTakeoverProgramId,
        Self::HomebrewApplicationTakeoverApplicationId,
        Self::ViewerUsbEnabled,
        Self::ActiveThemeName,
    ];

    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::MenuTakeoverProgramId),
            1 => Some(Self::HomebrewAppletTakeoverProgramId),
            2 => Some(Self::HomebrewApplicationTakeoverApplicationId),
            3 => Some(Self::ViewerUsbEnabled),
            4 => Some(Self::ActiveThemeName),
            _ => None,
        }
    }

    /// Returns the type every value of this entry must have.
    pub const fn entry_type(self) -> ConfigEntryType {
        match self {
            Self::MenuTakeoverProgramId
            | Self::HomebrewAppletTakeoverProgramId
            | Self::HomebrewApplicationTakeoverApplicationId => ConfigEntryType::U64,
            Self::ViewerUsbEnabled => ConfigEntryType::Bool,
            Self::ActiveThemeName => ConfigEntryType::String,
        }
    }

    /// Returns the value used when the entry has never been written.
    pub fn default_value(self) -> ConfigValue {
        match self {
            Self::MenuTakeoverProgramId => ConfigValue::U64(DEFAULT_MENU_TAKEOVER_PROGRAM_ID),
            Self::HomebrewAppletTakeoverProgramId => {
                ConfigValue::U64(DEFAULT_HOMEBREW_APPLET_TAKEOVER_PROGRAM_ID)
            }
            Self::HomebrewApplicationTakeoverApplicationId => ConfigValue::U64(0),
            Self::ViewerUsbEnabled => ConfigValue::Bool(false),
            Self::ActiveThemeName => ConfigValue::String(String::new()),
        }
    }
}

/// A configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigValue {
    Bool(bool),
    U64(u64),
    String(String),
}

impl ConfigValue {
    pub const fn entry_type(&self) -> ConfigEntryType {
        match self {
            Self::Bool(_) => ConfigEntryType::Bool,
            Self::U64(_) => ConfigEntryType::U64,
            Self::String(_) => ConfigEntryType::String,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Error returned when writing a configuration entry.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The value does not have the entry's type.
    #[error("{id:?} holds {expected:?} values, got {found:?}")]
    TypeMismatch {
        id: ConfigEntryId,
        expected: ConfigEntryType,
        found: ConfigEntryType,
    },
    /// The backing store rejected the write.
    #[error("failed to persist configuration")]
    Persist(#[source] ul_rc::Error),
}

impl From<ConfigError> for ul_rc::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::TypeMismatch { .. } => ul_rc::ul::INVALID_ARGUMENT,
            ConfigError::Persist(rc) => rc,
        }
    }
}

/// Read/write access to the launcher configuration.
pub trait ConfigSource {
    /// Returns the stored value of `id`, if any.
    fn read_option(&self, id: ConfigEntryId) -> Option<ConfigValue>;

    /// Stores `value` for `id`.
    fn write_option(&mut self, id: ConfigEntryId, value: ConfigValue) -> Result<(), ConfigError>;

    /// Reads a `u64` entry, falling back to its default.
    fn read_u64(&self, id: ConfigEntryId) -> u64 {
        self.read_option(id)
            .and_then(|value| value.as_u64())
            .or_else(|| id.default_value().as_u64())
            .unwrap_or_default()
    }

    /// Reads a `bool` entry, falling back to its default.
    fn read_bool(&self, id: ConfigEntryId) -> bool {
        self.read_option(id)
            .and_then(|value| value.as_bool())
            .or_else(|| id.default_value().as_bool())
            .unwrap_or_default()
    }

    /// Reads a string entry, falling back to its default.
    fn read_string(&self, id: ConfigEntryId) -> String {
        match self.read_option(id) {
            Some(ConfigValue::String(value)) => value,
            _ => match id.default_value() {
                ConfigValue::String(value) => value,
                _ => String::new(),
            },
        }
    }
}

/// Configuration kept in memory, with type-checked writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    entries: Vec<(ConfigEntryId, ConfigValue)>,
}

impl MemoryConfig {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of entries that have been written.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConfigSource for MemoryConfig {
    fn read_option(&self, id: ConfigEntryId) -> Option<ConfigValue> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, value)| value.clone())
    }

    fn write_option(&mut self, id: ConfigEntryId, value: ConfigValue) -> Result<(), ConfigError> {
        if value.entry_type() != id.entry_type() {
            return Err(ConfigError::TypeMismatch {
                id,
                expected: id.entry_type(),
                found: value.entry_type(),
            });
        }

        match self.entries.iter_mut().find(|(entry, _)| *entry == id) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((id, value)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn unwritten_entries_read_as_defaults() {
        let config = MemoryConfig::new();

        assert_eq!(
            config.read_u64(ConfigEntryId::MenuTakeoverProgramId),
            0x010000000000100B
        );
        assert_eq!(
            config.read_u64(ConfigEntryId::HomebrewAppletTakeoverProgramId),
            0x010000000000100D
        );
        assert_eq!(
            config.read_u64(ConfigEntryId::HomebrewApplicationTakeoverApplicationId),
            0
        );
        assert!(!config.read_bool(ConfigEntryId::ViewerUsbEnabled));
        assert_eq!(config.read_string(ConfigEntryId::ActiveThemeName), "");
    }

    #[test]
    fn writes_replace_previous_value() {
        let mut config = MemoryConfig::new();
        let id = ConfigEntryId::HomebrewApplicationTakeoverApplicationId;

        config.write_option(id, ConfigValue::U64(1)).unwrap();
        config.write_option(id, ConfigValue::U64(2)).unwrap();

        assert_eq!(config.read_u64(id), 2);
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn mistyped_write_is_rejected() {
        let mut config = MemoryConfig::new();

        let err = config
            .write_option(
                ConfigEntryId::ViewerUsbEnabled,
                ConfigValue::String("yes".to_string()),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::TypeMismatch {
                expected: ConfigEntryType::Bool,
                found: ConfigEntryType::String,
                ..
            }
        ));
        assert!(config.is_empty());
    }

    #[test]
    fn raw_ids_follow_declaration_order() {
        for (raw, id) in ConfigEntryId::ALL.iter().enumerate() {
            assert_eq!(ConfigEntryId::from_raw(raw as u8), Some(*id));
            assert_eq!(*id as u8, raw as u8);
        }
        assert_eq!(ConfigEntryId::from_raw(5), None);
    }
}
