//! Menu side of the daemon↔menu channel.

use ul_ipc::{
    CommandError, CommandHeader, Direction, Initiator, ScopedStorageReader, StorageChannel,
};
use ul_target::{AccountUid, LaunchTarget, PathBuf, RawHomebrewTarget, TargetError, Title};

use crate::{
    command::{DaemonCommand, DaemonReply},
    proto::{DaemonMessage, DaemonStatus, MAGIC, MenuMessage, Url},
};

/// Sends commands to the daemon and waits for each reply.
pub struct MenuClient<C> {
    initiator: Initiator<DaemonMessage, C>,
}

impl<C: StorageChannel> MenuClient<C> {
    pub const fn new(channel: C) -> Self {
        Self {
            initiator: Initiator::new(channel),
        }
    }

    #[inline]
    pub fn channel_mut(&mut self) -> &mut C {
        self.initiator.channel_mut()
    }

    #[inline]
    pub fn into_inner(self) -> C {
        self.initiator.into_inner()
    }

    /// Sends `command` and returns the decoded reply.
    pub fn send(&mut self, command: &DaemonCommand) -> Result<DaemonReply, CommandError> {
        let message = command.message();
        self.initiator.send(
            message,
            |writer| Ok(command.encode(writer)?),
            |reader| Ok(DaemonReply::decode(message, reader)?),
        )
    }

    fn send_empty(&mut self, command: DaemonCommand) -> Result<(), CommandError> {
        self.send(&command).map(|_| ())
    }

    pub fn set_selected_user(&mut self, uid: AccountUid) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::SetSelectedUser(uid))
    }

    pub fn launch_application(&mut self, app_id: u64) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::LaunchApplication(app_id))
    }

    pub fn resume_application(&mut self) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::ResumeApplication)
    }

    pub fn terminate_application(&mut self) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::TerminateApplication)
    }

    pub fn launch_homebrew_library_applet(
        &mut self,
        target: RawHomebrewTarget,
    ) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::LaunchHomebrewLibraryApplet(target))
    }

    pub fn launch_homebrew_application(
        &mut self,
        target: RawHomebrewTarget,
    ) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::LaunchHomebrewApplication(target))
    }

    pub fn open_web_page(&mut self, url: Url) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::OpenWebPage(url))
    }

    pub fn open_album(&mut self) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::OpenAlbum)
    }

    pub fn restart_menu(&mut self) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::RestartMenu)
    }

    pub fn set_homebrew_takeover_application(&mut self, app_id: u64) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::SetHomebrewTakeoverApplication(app_id))
    }

    pub fn update_menu_path(&mut self, path: PathBuf) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::UpdateMenuPath(path))
    }

    pub fn update_menu_index(&mut self, index: u32) -> Result<(), CommandError> {
        self.send_empty(DaemonCommand::UpdateMenuIndex(index))
    }

    /// Queries the daemon status.
    pub fn get_status(&mut self) -> Result<DaemonStatus, CommandError> {
        match self.send(&DaemonCommand::GetStatus)? {
            DaemonReply::Status(status) => Ok(status),
            DaemonReply::Empty => Err(CommandError::MissingReply),
        }
    }

    /// Launches a menu entry.
    ///
    /// Homebrew runs as an application (through the application takeover) if
    /// `as_application` is set, as a library applet otherwise.
    pub fn launch_title(&mut self, title: &Title, as_application: bool) -> Result<(), LaunchTitleError> {
        let command = match title.launch_target().map_err(LaunchTitleError::Target)? {
            LaunchTarget::Application(app_id) => DaemonCommand::LaunchApplication(app_id),
            LaunchTarget::Homebrew(target) if as_application => {
                DaemonCommand::LaunchHomebrewApplication(target)
            }
            LaunchTarget::Homebrew(target) => DaemonCommand::LaunchHomebrewLibraryApplet(target),
        };

        self.send_empty(command).map_err(LaunchTitleError::Command)
    }
}

/// Pops the next notification the daemon pushed into the menu.
///
/// Returns `Ok(None)` if `wait` is false and nothing is pending.
pub fn receive_menu_message<C: StorageChannel>(
    channel: &mut C,
    wait: bool,
) -> Result<Option<MenuMessage>, CommandError> {
    let Some(mut reader) =
        ScopedStorageReader::open(channel, wait, size_of::<CommandHeader>())
            .map_err(CommandError::PopStorage)?
    else {
        return Ok(None);
    };

    let header = reader.pop::<CommandHeader>()?;
    if header.magic() != MAGIC {
        return Err(CommandError::MagicMismatch {
            direction: Direction::Request,
            expected: MAGIC,
            found: header.magic(),
        });
    }

    MenuMessage::from_raw(header.val())
        .map(Some)
        .ok_or(CommandError::UnknownMessage(header.val()))
}

/// Error returned by [`MenuClient::launch_title`].
#[derive(Debug, thiserror::Error)]
pub enum LaunchTitleError {
    /// The title cannot be turned into a launch target.
    #[error("invalid launch target")]
    Target(#[source] TargetError),
    /// The daemon rejected the launch, or the exchange failed.
    #[error("failed to send launch command")]
    Command(#[source] CommandError),
}

impl From<LaunchTitleError> for ul_rc::Error {
    fn from(err: LaunchTitleError) -> Self {
        match err {
            LaunchTitleError::Target(err) => err.into(),
            LaunchTitleError::Command(err) => err.into(),
        }
    }
}
