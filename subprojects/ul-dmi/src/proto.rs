//! Protocol constants and types for the daemon↔menu channel.

use static_assertions::const_assert_eq;
use ul_ipc::{CommandHeader, FixedString, Message, ServiceName};
use ul_target::{AccountUid, PathBuf, RawHomebrewTarget};
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    little_endian::{U32, U64},
};

/// Magic of every daemon↔menu envelope (`"DMI0"`).
pub const MAGIC: u32 = 0x444D4930;

/// Private daemon service, used by the menu.
pub const PRIVATE_SERVICE_NAME: ServiceName = ServiceName::new_truncate("ulsf:p");

/// Public daemon service. Declared, not served.
pub const PUBLIC_SERVICE_NAME: ServiceName = ServiceName::new_truncate("ulsf:u");

/// Capacity of a web page URL, terminator included.
pub const URL_LEN: usize = 500;

/// Capacity of the firmware version string, terminator included.
pub const FW_VERSION_LEN: usize = 0x18;

/// NUL-padded web page URL.
pub type Url = FixedString<URL_LEN>;

/// Commands the menu sends to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DaemonMessage {
    Invalid = 0,
    SetSelectedUser = 1,
    LaunchApplication = 2,
    ResumeApplication = 3,
    TerminateApplication = 4,
    LaunchHomebrewLibraryApplet = 5,
    LaunchHomebrewApplication = 6,
    OpenWebPage = 7,
    OpenAlbum = 8,
    RestartMenu = 9,
    SetHomebrewTakeoverApplication = 10,
    UpdateMenuPath = 11,
    UpdateMenuIndex = 12,
    GetStatus = 13,
}

impl DaemonMessage {
    /// All messages, in opcode order.
    pub const ALL: [Self; 14] = [
        Self::Invalid,
        Self::SetSelectedUser,
        Self::LaunchApplication,
        Self::ResumeApplication,
        Self::TerminateApplication,
        Self::LaunchHomebrewLibraryApplet,
        Self::LaunchHomebrewApplication,
        Self::OpenWebPage,
        Self::OpenAlbum,
        Self::RestartMenu,
        Self::SetHomebrewTakeoverApplication,
        Self::UpdateMenuPath,
        Self::UpdateMenuIndex,
        Self::GetStatus,
    ];
}

impl Message for DaemonMessage {
    const MAGIC: u32 = MAGIC;

    fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    fn to_raw(self) -> u32 {
        self as u32
    }
}

/// Why the menu is being started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum MenuStartMode {
    #[default]
    Invalid = 0,
    /// First boot: show the user selection screen.
    StartupScreen = 1,
    /// Regular menu.
    Menu = 2,
    /// Menu over a suspended application.
    MenuApplicationSuspended = 3,
    /// Menu after a launch it requested failed.
    MenuLaunchFailure = 4,
}

impl MenuStartMode {
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Invalid),
            1 => Some(Self::StartupScreen),
            2 => Some(Self::Menu),
            3 => Some(Self::MenuApplicationSuspended),
            4 => Some(Self::MenuLaunchFailure),
            _ => None,
        }
    }
}

/// Initial input of the menu applet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct MenuStartInput {
    pub mode: U32,
    /// Selected entry within the current folder
    pub menu_index: U32,
    /// Current menu folder
    pub menu_path: PathBuf,
}

const_assert_eq!(size_of::<MenuStartInput>(), 0x309);

impl MenuStartInput {
    pub fn new(mode: MenuStartMode, menu_index: u32, menu_path: PathBuf) -> Self {
        Self {
            mode: U32::new(mode as u32),
            menu_index: U32::new(menu_index),
            menu_path,
        }
    }

    /// Returns the start mode, `None` if the value is unknown.
    #[inline]
    pub fn mode(&self) -> Option<MenuStartMode> {
        MenuStartMode::from_raw(self.mode.get())
    }
}

/// Daemon state reported to the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct DaemonStatus {
    pub selected_user: AccountUid,
    /// Suspended homebrew application, zeroed if none
    pub params: RawHomebrewTarget,
    /// Suspended application, 0 if none
    pub app_id: U64,
    /// System version, including custom firmware details
    pub fw_version: FixedString<FW_VERSION_LEN>,
}

const_assert_eq!(size_of::<DaemonStatus>(), 0x10 + 0x606 + 0x8 + 0x18);

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            selected_user: AccountUid::INVALID,
            params: RawHomebrewTarget::EMPTY,
            app_id: U64::ZERO,
            fw_version: FixedString::empty(),
        }
    }
}

/// Notifications the daemon pushes into the running menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MenuMessage {
    Invalid = 0,
    /// The HOME button was pressed while the menu was in the foreground.
    HomeRequest = 1,
}

impl MenuMessage {
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Invalid),
            1 => Some(Self::HomeRequest),
            _ => None,
        }
    }

    /// Returns the envelope carrying this message.
    #[inline]
    pub fn envelope(self) -> CommandHeader {
        CommandHeader::new(MAGIC, self as u32)
    }

    /// Extracts the message from an envelope, `None` if it is foreign or unknown.
    pub fn from_envelope(header: &CommandHeader) -> Option<Self> {
        if header.magic() != MAGIC {
            return None;
        }
        Self::from_raw(header.val())
    }
}

#[cfg(test)]
mod tests {
    use zerocopy::IntoBytes;

    use super::*;

    #[test]
    fn opcodes_follow_declaration_order() {
        for (raw, message) in DaemonMessage::ALL.iter().enumerate() {
            assert_eq!(DaemonMessage::from_raw(raw as u32), Some(*message));
            assert_eq!(message.to_raw(), raw as u32);
        }
        assert_eq!(DaemonMessage::from_raw(14), None);
    }

    #[test]
    fn service_names() {
        assert_eq!(PRIVATE_SERVICE_NAME.as_str(), "ulsf:p");
        assert_eq!(PUBLIC_SERVICE_NAME.as_str(), "ulsf:u");
    }

    #[test]
    fn home_request_envelope() {
        let header = MenuMessage::HomeRequest.envelope();

        assert_eq!(header.as_bytes(), &[0x30, 0x49, 0x4D, 0x44, 1, 0, 0, 0]);
        assert_eq!(MenuMessage::from_envelope(&header), Some(MenuMessage::HomeRequest));
        assert_eq!(
            MenuMessage::from_envelope(&CommandHeader::new(0x534D4930, 1)),
            None
        );
    }

    #[test]
    fn start_input_layout() {
        let input = MenuStartInput::new(
            MenuStartMode::MenuApplicationSuspended,
            4,
            PathBuf::new("sdmc:/folder").unwrap(),
        );
        let bytes = input.as_bytes();

        assert_eq!(&bytes[0..4], &3u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &4u32.to_le_bytes());
        assert_eq!(&bytes[8..20], b"sdmc:/folder");
        assert_eq!(input.mode(), Some(MenuStartMode::MenuApplicationSuspended));
    }
}
