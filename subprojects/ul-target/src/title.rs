use crate::homebrew::{HomebrewTarget, RawHomebrewTarget, TargetError};

/// Installed application record, as reported by the NS service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApplicationInfo {
    pub application_id: u64,
    pub record_type: u8,
}

impl ApplicationInfo {
    /// Record type of a freshly installed application.
    pub const RECORD_TYPE_INSTALLED_NEW: u8 = 0x03;
    /// Record type of an installed application.
    pub const RECORD_TYPE_INSTALLED: u8 = 0x10;

    #[inline]
    pub const fn new(application_id: u64, record_type: u8) -> Self {
        Self {
            application_id,
            record_type,
        }
    }

    #[inline]
    pub const fn is_installed(&self) -> bool {
        self.record_type == Self::RECORD_TYPE_INSTALLED
    }

    #[inline]
    pub const fn is_installed_new(&self) -> bool {
        self.record_type == Self::RECORD_TYPE_INSTALLED_NEW
    }

    /// Returns true if the application can be launched as is.
    #[inline]
    pub const fn is_launchable(&self) -> bool {
        self.is_installed() || self.is_installed_new()
    }
}

/// An entry of the menu: either an installed application or a homebrew NRO.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Title {
    Application(ApplicationInfo),
    Homebrew(HomebrewTarget),
}

/// What the daemon needs to launch a [`Title`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTarget {
    Application(u64),
    Homebrew(RawHomebrewTarget),
}

impl Title {
    /// Returns true if both titles launch the same thing.
    ///
    /// Applications compare by id, homebrew by NRO path.
    pub fn is_same_target(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Application(a), Self::Application(b)) => a.application_id == b.application_id,
            (Self::Homebrew(a), Self::Homebrew(b)) => a.same_nro(b),
            _ => false,
        }
    }

    /// Resolves the title into its launch target.
    pub fn launch_target(&self) -> Result<LaunchTarget, TargetError> {
        match self {
            Self::Application(info) if info.is_launchable() => {
                Ok(LaunchTarget::Application(info.application_id))
            }
            Self::Application(info) => Err(TargetError::NotLaunchable {
                application_id: info.application_id,
            }),
            Self::Homebrew(target) => target.to_raw().map(LaunchTarget::Homebrew),
        }
    }
}
