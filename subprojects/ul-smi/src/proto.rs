//! Protocol constants for the menu↔system channel.

use ul_ipc::{FixedString, Message};

/// Magic of every menu↔system envelope (`"SMI0"`).
pub const MAGIC: u32 = 0x534D4930;

/// Capacity of a web page URL, terminator included.
pub const URL_LEN: usize = 500;

/// NUL-padded web page URL.
pub type Url = FixedString<URL_LEN>;

/// Commands the menu sends to the system process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SystemMessage {
    Invalid = 0,
    SetSelectedUser = 1,
    LaunchApplication = 2,
    ResumeApplication = 3,
    TerminateApplication = 4,
    LaunchHomebrewLibraryApplet = 5,
    LaunchHomebrewApplication = 6,
    ChooseHomebrew = 7,
    OpenWebPage = 8,
    OpenAlbum = 9,
    RestartMenu = 10,
    SetHomebrewTakeoverApplication = 11,
    UpdateMenuPath = 12,
    UpdateMenuIndex = 13,
}

impl SystemMessage {
    /// All messages, in opcode order.
    pub const ALL: [Self; 14] = [
        Self::Invalid,
        Self::SetSelectedUser,
        Self::LaunchApplication,
        Self::ResumeApplication,
        Self::TerminateApplication,
        Self::LaunchHomebrewLibraryApplet,
        Self::LaunchHomebrewApplication,
        Self::ChooseHomebrew,
        Self::OpenWebPage,
        Self::OpenAlbum,
        Self::RestartMenu,
        Self::SetHomebrewTakeoverApplication,
        Self::UpdateMenuPath,
        Self::UpdateMenuIndex,
    ];
}

impl Message for SystemMessage {
    const MAGIC: u32 = MAGIC;

    fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    fn to_raw(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_follow_declaration_order() {
        for (raw, message) in SystemMessage::ALL.iter().enumerate() {
            assert_eq!(SystemMessage::from_raw(raw as u32), Some(*message));
            assert_eq!(message.to_raw(), raw as u32);
        }
        assert_eq!(SystemMessage::from_raw(14), None);
    }

    #[test]
    fn magic_differs_from_daemon_channel() {
        assert_ne!(MAGIC, 0x444D4930);
        assert_eq!(&MAGIC.to_be_bytes(), b"SMI0");
    }
}
