//! Typed menu↔system commands.
//!
//! Payloads mirror the daemon↔menu catalog; `ChooseHomebrew` carries nothing,
//! and no reply carries a payload.

use ul_ipc::{ScopedStorageReader, ScopedStorageWriter, Storage, StorageChannel, StorageError};
use ul_target::{AccountUid, PathBuf, RawHomebrewTarget};
use zerocopy::little_endian::{U32, U64};

use crate::proto::{SystemMessage, Url};

/// A decoded menu↔system request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCommand {
    SetSelectedUser(AccountUid),
    LaunchApplication(u64),
    ResumeApplication,
    TerminateApplication,
    LaunchHomebrewLibraryApplet(RawHomebrewTarget),
    LaunchHomebrewApplication(RawHomebrewTarget),
    /// Open the homebrew picker to choose an NRO.
    ChooseHomebrew,
    OpenWebPage(Url),
    OpenAlbum,
    RestartMenu,
    SetHomebrewTakeoverApplication(u64),
    UpdateMenuPath(PathBuf),
    UpdateMenuIndex(u32),
}

impl SystemCommand {
    pub fn message(&self) -> SystemMessage {
        match self {
            Self::SetSelectedUser(_) => SystemMessage::SetSelectedUser,
            Self::LaunchApplication(_) => SystemMessage::LaunchApplication,
            Self::ResumeApplication => SystemMessage::ResumeApplication,
            Self::TerminateApplication => SystemMessage::TerminateApplication,
            Self::LaunchHomebrewLibraryApplet(_) => SystemMessage::LaunchHomebrewLibraryApplet,
            Self::LaunchHomebrewApplication(_) => SystemMessage::LaunchHomebrewApplication,
            Self::ChooseHomebrew => SystemMessage::ChooseHomebrew,
            Self::OpenWebPage(_) => SystemMessage::OpenWebPage,
            Self::OpenAlbum => SystemMessage::OpenAlbum,
            Self::RestartMenu => SystemMessage::RestartMenu,
            Self::SetHomebrewTakeoverApplication(_) => {
                SystemMessage::SetHomebrewTakeoverApplication
            }
            Self::UpdateMenuPath(_) => SystemMessage::UpdateMenuPath,
            Self::UpdateMenuIndex(_) => SystemMessage::UpdateMenuIndex,
        }
    }

    pub fn encode<C: StorageChannel>(
        &self,
        writer: &mut ScopedStorageWriter<'_, C>,
    ) -> Result<(), StorageError> {
        match self {
            Self::SetSelectedUser(uid) => writer.push(uid),
            Self::LaunchApplication(app_id) | Self::SetHomebrewTakeoverApplication(app_id) => {
                writer.push(&U64::new(*app_id))
            }
            Self::LaunchHomebrewLibraryApplet(target) | Self::LaunchHomebrewApplication(target) => {
                writer.push(target)
            }
            Self::OpenWebPage(url) => writer.push(url),
            Self::UpdateMenuPath(path) => writer.push(path),
            Self::UpdateMenuIndex(index) => writer.push(&U32::new(*index)),
            Self::ResumeApplication
            | Self::TerminateApplication
            | Self::ChooseHomebrew
            | Self::OpenAlbum
            | Self::RestartMenu => Ok(()),
        }
    }

    pub fn decode<S: Storage>(
        message: SystemMessage,
        reader: &mut ScopedStorageReader<S>,
    ) -> Result<Self, DecodeError> {
        Ok(match message {
            SystemMessage::Invalid => return Err(DecodeError::InvalidMessage),
            SystemMessage::SetSelectedUser => Self::SetSelectedUser(reader.pop()?),
            SystemMessage::LaunchApplication => Self::LaunchApplication(reader.pop::<U64>()?.get()),
            SystemMessage::ResumeApplication => Self::ResumeApplication,
            SystemMessage::TerminateApplication => Self::TerminateApplication,
            SystemMessage::LaunchHomebrewLibraryApplet => {
                Self::LaunchHomebrewLibraryApplet(reader.pop()?)
            }
            SystemMessage::LaunchHomebrewApplication => {
                Self::LaunchHomebrewApplication(reader.pop()?)
            }
            SystemMessage::ChooseHomebrew => Self::ChooseHomebrew,
            SystemMessage::OpenWebPage => Self::OpenWebPage(reader.pop()?),
            SystemMessage::OpenAlbum => Self::OpenAlbum,
            SystemMessage::RestartMenu => Self::RestartMenu,
            SystemMessage::SetHomebrewTakeoverApplication => {
                Self::SetHomebrewTakeoverApplication(reader.pop::<U64>()?.get())
            }
            SystemMessage::UpdateMenuPath => Self::UpdateMenuPath(reader.pop()?),
            SystemMessage::UpdateMenuIndex => Self::UpdateMenuIndex(reader.pop::<U32>()?.get()),
        })
    }
}

/// Error decoding a request.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("message carries no command")]
    InvalidMessage,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DecodeError> for ul_rc::Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidMessage => ul_rc::ul::INVALID_MESSAGE,
            DecodeError::Storage(err) => err.into(),
        }
    }
}
