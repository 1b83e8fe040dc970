//! Menu side of the menu↔system channel.

use ul_ipc::{CommandError, Initiator, StorageChannel};
use ul_target::{AccountUid, PathBuf, RawHomebrewTarget};

use crate::{
    command::SystemCommand,
    proto::{SystemMessage, Url},
};

/// Sends commands to the system process and waits for each reply.
pub struct SystemClient<C> {
    initiator: Initiator<SystemMessage, C>,
}

impl<C: StorageChannel> SystemClient<C> {
    pub const fn new(channel: C) -> Self {
        Self {
            initiator: Initiator::new(channel),
        }
    }

    #[inline]
    pub fn into_inner(self) -> C {
        self.initiator.into_inner()
    }

    /// Sends `command`. Replies carry no payload.
    pub fn send(&mut self, command: SystemCommand) -> Result<(), CommandError> {
        self.initiator.send(
            command.message(),
            |writer| Ok(command.encode(writer)?),
            |_| Ok(()),
        )
    }

    pub fn set_selected_user(&mut self, uid: AccountUid) -> Result<(), CommandError> {
        self.send(SystemCommand::SetSelectedUser(uid))
    }

    pub fn launch_application(&mut self, app_id: u64) -> Result<(), CommandError> {
        self.send(SystemCommand::LaunchApplication(app_id))
    }

    pub fn resume_application(&mut self) -> Result<(), CommandError> {
        self.send(SystemCommand::ResumeApplication)
    }

    pub fn terminate_application(&mut self) -> Result<(), CommandError> {
        self.send(SystemCommand::TerminateApplication)
    }

    pub fn launch_homebrew_library_applet(
        &mut self,
        target: RawHomebrewTarget,
    ) -> Result<(), CommandError> {
        self.send(SystemCommand::LaunchHomebrewLibraryApplet(target))
    }

    pub fn launch_homebrew_application(
        &mut self,
        target: RawHomebrewTarget,
    ) -> Result<(), CommandError> {
        self.send(SystemCommand::LaunchHomebrewApplication(target))
    }

    pub fn choose_homebrew(&mut self) -> Result<(), CommandError> {
        self.send(SystemCommand::ChooseHomebrew)
    }

    pub fn open_web_page(&mut self, url: Url) -> Result<(), CommandError> {
        self.send(SystemCommand::OpenWebPage(url))
    }

    pub fn open_album(&mut self) -> Result<(), CommandError> {
        self.send(SystemCommand::OpenAlbum)
    }

    pub fn restart_menu(&mut self) -> Result<(), CommandError> {
        self.send(SystemCommand::RestartMenu)
    }

    pub fn set_homebrew_takeover_application(&mut self, app_id: u64) -> Result<(), CommandError> {
        self.send(SystemCommand::SetHomebrewTakeoverApplication(app_id))
    }

    pub fn update_menu_path(&mut self, path: PathBuf) -> Result<(), CommandError> {
        self.send(SystemCommand::UpdateMenuPath(path))
    }

    pub fn update_menu_index(&mut self, index: u32) -> Result<(), CommandError> {
        self.send(SystemCommand::UpdateMenuIndex(index))
    }
}
