//! Typed daemon↔menu commands and replies.
//!
//! Each [`DaemonMessage`] has a fixed request payload, written right after the
//! envelope header:
//!
//! | Message | Request payload | Reply payload |
//! |---------|-----------------|---------------|
//! | `SetSelectedUser` | [`AccountUid`] | |
//! | `LaunchApplication` | application id (`u64`) | |
//! | `LaunchHomebrewLibraryApplet` | [`RawHomebrewTarget`] | |
//! | `LaunchHomebrewApplication` | [`RawHomebrewTarget`] | |
//! | `OpenWebPage` | [`Url`] (500 bytes) | |
//! | `SetHomebrewTakeoverApplication` | application id (`u64`) | |
//! | `UpdateMenuPath` | [`PathBuf`] (0x301 bytes) | |
//! | `UpdateMenuIndex` | index (`u32`) | |
//! | `GetStatus` | | [`DaemonStatus`] |
//!
//! Every other message carries nothing in either direction.

use ul_ipc::{ScopedStorageReader, ScopedStorageWriter, Storage, StorageChannel, StorageError};
use ul_target::{AccountUid, PathBuf, RawHomebrewTarget};
use zerocopy::little_endian::{U32, U64};

use crate::proto::{DaemonMessage, DaemonStatus, Url};

/// A decoded daemon↔menu request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonCommand {
    SetSelectedUser(AccountUid),
    LaunchApplication(u64),
    ResumeApplication,
    TerminateApplication,
    LaunchHomebrewLibraryApplet(RawHomebrewTarget),
    LaunchHomebrewApplication(RawHomebrewTarget),
    OpenWebPage(Url),
    OpenAlbum,
    RestartMenu,
    SetHomebrewTakeoverApplication(u64),
    UpdateMenuPath(PathBuf),
    UpdateMenuIndex(u32),
    GetStatus,
}

impl DaemonCommand {
    /// Returns the opcode of this command.
    pub fn message(&self) -> DaemonMessage {
        match self {
            Self::SetSelectedUser(_) => DaemonMessage::SetSelectedUser,
            Self::LaunchApplication(_) => DaemonMessage::LaunchApplication,
            Self::ResumeApplication => DaemonMessage::ResumeApplication,
            Self::TerminateApplication => DaemonMessage::TerminateApplication,
            Self::LaunchHomebrewLibraryApplet(_) => DaemonMessage::LaunchHomebrewLibraryApplet,
            Self::LaunchHomebrewApplication(_) => DaemonMessage::LaunchHomebrewApplication,
            Self::OpenWebPage(_) => DaemonMessage::OpenWebPage,
            Self::OpenAlbum => DaemonMessage::OpenAlbum,
            Self::RestartMenu => DaemonMessage::RestartMenu,
            Self::SetHomebrewTakeoverApplication(_) => {
                DaemonMessage::SetHomebrewTakeoverApplication
            }
            Self::UpdateMenuPath(_) => DaemonMessage::UpdateMenuPath,
            Self::UpdateMenuIndex(_) => DaemonMessage::UpdateMenuIndex,
            Self::GetStatus => DaemonMessage::GetStatus,
        }
    }

    /// Writes the request payload.
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
            | Self::OpenAlbum
            | Self::RestartMenu
            | Self::GetStatus => Ok(()),
        }
    }

    /// Reads the request payload of `message`.
    pub fn decode<S: Storage>(
        message: DaemonMessage,
        reader: &mut ScopedStorageReader<S>,
    ) -> Result<Self, DecodeError> {
        let command = match message {
            DaemonMessage::Invalid => return Err(DecodeError::InvalidMessage),
            DaemonMessage::SetSelectedUser => Self::SetSelectedUser(reader.pop()?),
            DaemonMessage::LaunchApplication => {
                Self::LaunchApplication(reader.pop::<U64>()?.get())
            }
            DaemonMessage::ResumeApplication => Self::ResumeApplication,
            DaemonMessage::TerminateApplication => Self::TerminateApplication,
            DaemonMessage::LaunchHomebrewLibraryApplet => {
                Self::LaunchHomebrewLibraryApplet(reader.pop()?)
            }
            DaemonMessage::LaunchHomebrewApplication => {
                Self::LaunchHomebrewApplication(reader.pop()?)
            }
            DaemonMessage::OpenWebPage => Self::OpenWebPage(reader.pop()?),
            DaemonMessage::OpenAlbum => Self::OpenAlbum,
            DaemonMessage::RestartMenu => Self::RestartMenu,
            DaemonMessage::SetHomebrewTakeoverApplication => {
                Self::SetHomebrewTakeoverApplication(reader.pop::<U64>()?.get())
            }
            DaemonMessage::UpdateMenuPath => Self::UpdateMenuPath(reader.pop()?),
            DaemonMessage::UpdateMenuIndex => Self::UpdateMenuIndex(reader.pop::<U32>()?.get()),
            DaemonMessage::GetStatus => Self::GetStatus,
        };
        Ok(command)
    }
}

/// A daemon↔menu reply payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DaemonReply {
    /// No payload.
    #[default]
    Empty,
    Status(DaemonStatus),
}

impl DaemonReply {
    /// Writes the reply payload.
    pub fn encode<C: StorageChannel>(
        &self,
        writer: &mut ScopedStorageWriter<'_, C>,
    ) -> Result<(), StorageError> {
        match self {
            Self::Empty => Ok(()),
            Self::Status(status) => writer.push(status),
        }
    }

    /// Reads the reply payload of `message`.
    pub fn decode<S: Storage>(
        message: DaemonMessage,
        reader: &mut ScopedStorageReader<S>,
    ) -> Result<Self, StorageError> {
        match message {
            DaemonMessage::GetStatus => Ok(Self::Status(reader.pop()?)),
            _ => Ok(Self::Empty),
        }
    }
}

/// Error decoding a request.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The opcode has no command (`Invalid`).
    #[error("message carries no command")]
    InvalidMessage,
    /// The payload could not be read.
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
