//! The daemon main loop.
//!
//! ```text
//!   tick()
//!     1. run the deferred hand-off (the menu already has its reply)
//!     2. notice an application that exited
//!     3. nothing in the foreground? relaunch the menu
//!     4. menu in the foreground? answer one of its commands
//! ```

use ul_applet::{LibraryAppletCreator, PushError, StartError, TerminateError};
use ul_dmi::{DaemonMessage, MenuMessage, MenuStartMode};
use ul_ipc::{CommandError, Responder, StorageChannel};
use ul_target::ConfigSource;
use zerocopy::IntoBytes;

use crate::{
    context::{DaemonContext, NewDaemonError},
    host::ApplicationHost,
};

/// Serves the menu and owns the foreground.
pub struct Daemon<A: LibraryAppletCreator, H, S, C> {
    responder: Responder<DaemonMessage, C>,
    context: DaemonContext<A, H, S>,
}

impl<A, H, S, C> Daemon<A, H, S, C>
where
    A: LibraryAppletCreator,
    H: ApplicationHost,
    S: ConfigSource,
    C: StorageChannel,
{
    /// Creates the daemon. No applet is started until the first [`tick`](Self::tick).
    pub fn new(creator: A, host: H, config: S, channel: C) -> Result<Self, NewDaemonError> {
        Ok(Self {
            responder: Responder::new(channel),
            context: DaemonContext::new(creator, host, config)?,
        })
    }

    #[inline]
    pub fn context(&self) -> &DaemonContext<A, H, S> {
        &self.context
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut DaemonContext<A, H, S> {
        &mut self.context
    }

    /// Returns the channel the menu sends its commands on.
    #[inline]
    pub fn channel_mut(&mut self) -> &mut C {
        self.responder.channel_mut()
    }

    /// Starts the menu applet in `mode`.
    #[inline]
    pub fn launch_menu(&mut self, mode: MenuStartMode) -> Result<(), StartError> {
        self.context.launch_menu(mode)
    }

    /// Receives and answers one menu command.
    ///
    /// Returns `Ok(None)` if `wait` is false and the menu sent nothing.
    pub fn process_command(&mut self, wait: bool) -> Result<Option<DaemonMessage>, CommandError> {
        let context = &mut self.context;
        ul_dmi::receive_command(&mut self.responder, wait, |command| context.handle(command))
    }

    /// Runs one iteration of the main loop.
    pub fn tick(&mut self) -> Result<(), TickError> {
        self.context.run_pending().map_err(TickError::Terminate)?;
        self.context.check_application();

        if !self.context.session().is_active() && !self.context.is_application_foreground() {
            let mode = self.context.next_menu_mode();
            self.launch_menu(mode).map_err(TickError::LaunchMenu)?;
        }

        if self.context.session_mut().is_menu() {
            self.process_command(false).map_err(TickError::Command)?;
        }
        Ok(())
    }

    /// Reacts to a press of the HOME button.
    pub fn on_home_button(&mut self) -> Result<(), HomeButtonError> {
        if self.context.is_application_foreground() {
            log::info!("suspending application");
            self.context.suspend_application();
            let mode = self.context.next_menu_mode();
            return self.launch_menu(mode).map_err(HomeButtonError::LaunchMenu);
        }

        let session = self.context.session_mut();
        if session.is_menu() {
            session
                .push(MenuMessage::HomeRequest.envelope().as_bytes())
                .map_err(HomeButtonError::Notify)
        } else if session.is_active() {
            // Back to the menu on the next tick.
            session.terminate().map_err(HomeButtonError::Terminate)
        } else {
            Ok(())
        }
    }
}

/// Error returned by [`Daemon::tick`].
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("failed to close the foreground applet")]
    Terminate(#[source] TerminateError),
    #[error("failed to launch the menu")]
    LaunchMenu(#[source] StartError),
    #[error("failed to serve menu command")]
    Command(#[source] CommandError),
}

/// Error returned by [`Daemon::on_home_button`].
#[derive(Debug, thiserror::Error)]
pub enum HomeButtonError {
    #[error("failed to launch the menu")]
    LaunchMenu(#[source] StartError),
    #[error("failed to notify the menu")]
    Notify(#[source] PushError),
    #[error("failed to close the foreground applet")]
    Terminate(#[source] TerminateError),
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use ul_applet::AppletId;
    use ul_dmi::{DaemonStatus, MAGIC, MenuStartInput};
    use ul_ipc::{
        COMMAND_STORAGE_SIZE, CommandHeader,
        memory::{MemoryChannel, MemoryStorage},
    };
    use ul_target::{AccountUid, MemoryConfig, PathBuf};
    use zerocopy::{FromBytes, little_endian::U64};

    use super::*;
    use crate::testing::{Call, FakeCreator, FakeHost, Host};

    type TestDaemon = Daemon<FakeCreator, FakeHost, MemoryConfig, MemoryChannel>;

    const USER: AccountUid = AccountUid::new(0x11, 0x22);

    fn daemon() -> (TestDaemon, Host) {
        let host = Host::default();
        let daemon = Daemon::new(
            FakeCreator(host.clone()),
            FakeHost(host.clone()),
            MemoryConfig::new(),
            MemoryChannel::new(),
        )
        .unwrap();
        (daemon, host)
    }

    fn request(message: DaemonMessage, payload: &[u8]) -> MemoryStorage {
        let mut bytes = Vec::from(CommandHeader::new(MAGIC, message as u32).as_bytes());
        bytes.extend_from_slice(payload);
        bytes.resize(COMMAND_STORAGE_SIZE, 0);
        MemoryStorage::from_bytes(bytes)
    }

    fn reply_header(daemon: &mut TestDaemon) -> CommandHeader {
        let reply = daemon.channel_mut().take_outbound().unwrap();
        CommandHeader::read_from_prefix(reply.as_bytes()).unwrap().0
    }

    fn menu_mode(host: &Host) -> Option<MenuStartMode> {
        let (id, input) = host.last_input()?;
        assert_eq!(id, AppletId::LibraryAppletShop);
        MenuStartInput::read_from_bytes(&input).ok()?.mode()
    }

    /// Starts the menu and selects [`USER`].
    fn daemon_with_menu() -> (TestDaemon, Host) {
        let (mut daemon, host) = daemon();
        daemon.tick().unwrap();
        daemon
            .channel_mut()
            .queue_inbound(request(DaemonMessage::SetSelectedUser, USER.as_bytes()));
        daemon.tick().unwrap();
        assert_eq!(reply_header(&mut daemon).val(), 0);
        host.clear_calls();
        (daemon, host)
    }

    #[test]
    fn first_tick_shows_startup_screen() {
        let (mut daemon, host) = daemon();
        assert!(host.calls().is_empty());

        daemon.tick().unwrap();

        assert_eq!(menu_mode(&host), Some(MenuStartMode::StartupScreen));
        assert!(daemon.context_mut().session_mut().is_menu());
    }

    #[test]
    fn menu_position_reaches_next_menu_start() {
        let (mut daemon, host) = daemon_with_menu();
        let path = PathBuf::new("sdmc:/ulaunch/menu/emulators").unwrap();
        daemon
            .channel_mut()
            .queue_inbound(request(DaemonMessage::UpdateMenuPath, path.as_bytes()));
        daemon.tick().unwrap();
        daemon
            .channel_mut()
            .queue_inbound(request(DaemonMessage::UpdateMenuIndex, &3u32.to_le_bytes()));
        daemon.tick().unwrap();

        daemon
            .channel_mut()
            .queue_inbound(request(DaemonMessage::RestartMenu, &[]));
        daemon.tick().unwrap();
        daemon.tick().unwrap();

        let (_, input) = host.last_input().unwrap();
        let input = MenuStartInput::read_from_bytes(&input).unwrap();
        assert_eq!(input.mode(), Some(MenuStartMode::Menu));
        assert_eq!(input.menu_index.get(), 3);
        assert_eq!(input.menu_path, path);
    }

    #[test]
    fn menu_is_closed_only_after_launch_reply() {
        let (mut daemon, host) = daemon_with_menu();
        daemon.channel_mut().queue_inbound(request(
            DaemonMessage::LaunchApplication,
            &0x0100000000001000u64.to_le_bytes(),
        ));

        daemon.tick().unwrap();

        let header = reply_header(&mut daemon);
        assert_eq!((header.magic(), header.val()), (MAGIC, 0));
        assert_eq!(host.calls(), [Call::LaunchApplication(0x0100000000001000, USER)]);
        assert!(daemon.context().session().is_active());

        daemon.tick().unwrap();

        assert_eq!(
            host.calls()[1..],
            [Call::ExitApplet(AppletId::LibraryAppletShop)]
        );
        assert!(!daemon.context().session().is_active());
        assert!(daemon.context().is_application_foreground());
    }

    #[test]
    fn rejected_launch_keeps_menu() {
        let (mut daemon, host) = daemon_with_menu();
        host.set_application_running(true);
        daemon.channel_mut().queue_inbound(request(
            DaemonMessage::LaunchApplication,
            &0x0100000000001000u64.to_le_bytes(),
        ));

        daemon.tick().unwrap();
        daemon.tick().unwrap();

        assert_eq!(
            reply_header(&mut daemon).val(),
            ul_rc::ul::APPLICATION_ACTIVE.to_raw()
        );
        assert!(host.calls().is_empty());
        assert!(daemon.context_mut().session_mut().is_menu());
    }

    #[test]
    fn home_button_suspends_application() {
        let (mut daemon, host) = daemon_with_menu();
        daemon.channel_mut().queue_inbound(request(
            DaemonMessage::LaunchApplication,
            &0x0100000000001000u64.to_le_bytes(),
        ));
        daemon.tick().unwrap();
        daemon.tick().unwrap();
        daemon.tick().unwrap();
        assert!(!daemon.context().session().is_active());

        daemon.on_home_button().unwrap();

        assert_eq!(menu_mode(&host), Some(MenuStartMode::MenuApplicationSuspended));
        assert!(!daemon.context().is_application_foreground());
        assert_eq!(daemon.context().status().app_id.get(), 0x0100000000001000);
    }

    #[test]
    fn exited_application_brings_menu_back() {
        let (mut daemon, host) = daemon_with_menu();
        daemon.channel_mut().queue_inbound(request(
            DaemonMessage::LaunchApplication,
            &0x0100000000001000u64.to_le_bytes(),
        ));
        daemon.tick().unwrap();
        daemon.tick().unwrap();

        host.set_application_running(false);
        daemon.tick().unwrap();

        assert_eq!(menu_mode(&host), Some(MenuStartMode::Menu));
        assert_eq!(daemon.context().status().app_id.get(), 0);
    }

    #[test]
    fn web_page_replaces_menu_then_menu_returns() {
        let (mut daemon, host) = daemon_with_menu();
        let url = ul_dmi::Url::new("https://github.com/XorTroll/uLaunch").unwrap();
        daemon
            .channel_mut()
            .queue_inbound(request(DaemonMessage::OpenWebPage, url.as_bytes()));

        daemon.tick().unwrap();
        assert!(!host.calls().contains(&Call::CreateApplet(AppletId::LibraryAppletWeb)));

        daemon.tick().unwrap();
        assert_eq!(
            host.last_input(),
            Some((AppletId::LibraryAppletWeb, Vec::from(url.as_bytes())))
        );

        host.finish_applet();
        daemon.tick().unwrap();
        assert_eq!(menu_mode(&host), Some(MenuStartMode::Menu));
    }

    #[test]
    fn failed_applet_launch_is_reported_to_menu() {
        let (mut daemon, host) = daemon_with_menu();
        host.fail_applet(AppletId::LibraryAppletPhotoViewer);
        daemon
            .channel_mut()
            .queue_inbound(request(DaemonMessage::OpenAlbum, &[]));

        daemon.tick().unwrap();
        daemon.tick().unwrap();

        assert_eq!(menu_mode(&host), Some(MenuStartMode::MenuLaunchFailure));

        host.finish_applet();
        daemon.tick().unwrap();
        assert_eq!(menu_mode(&host), Some(MenuStartMode::Menu));
    }

    #[test]
    fn home_button_in_menu_notifies_it() {
        let (mut daemon, host) = daemon_with_menu();

        daemon.on_home_button().unwrap();

        assert_eq!(
            host.calls(),
            [Call::PushApplet(
                AppletId::LibraryAppletShop,
                Vec::from(MenuMessage::HomeRequest.envelope().as_bytes())
            )]
        );
    }

    #[test]
    fn home_button_closes_other_applets() {
        let (mut daemon, host) = daemon_with_menu();
        daemon
            .channel_mut()
            .queue_inbound(request(DaemonMessage::OpenAlbum, &[]));
        daemon.tick().unwrap();
        daemon.tick().unwrap();
        host.clear_calls();

        daemon.on_home_button().unwrap();
        assert_eq!(
            host.calls(),
            [Call::ExitApplet(AppletId::LibraryAppletPhotoViewer)]
        );

        daemon.tick().unwrap();
        assert_eq!(menu_mode(&host), Some(MenuStartMode::Menu));
    }

    #[test]
    fn status_is_served() {
        let (mut daemon, _host) = daemon_with_menu();
        daemon
            .channel_mut()
            .queue_inbound(request(DaemonMessage::GetStatus, &[]));

        daemon.tick().unwrap();

        let reply = daemon.channel_mut().take_outbound().unwrap();
        let (header, rest) = CommandHeader::read_from_prefix(reply.as_bytes()).unwrap();
        let (status, _) = DaemonStatus::read_from_prefix(rest).unwrap();
        assert_eq!(header.val(), 0);
        assert_eq!(status.selected_user, USER);
        assert_eq!(status.app_id, U64::ZERO);
    }
}
