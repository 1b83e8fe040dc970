//! Daemon state and command handling.
//!
//! Commands that replace the foreground applet (opening the browser, the
//! album, a homebrew applet, or closing the menu for an application) cannot
//! run while the menu is still waiting for their reply: the menu would be
//! terminated mid-exchange. They are recorded as a [`HandOff`] and carried out
//! by the next tick, after the reply has been published.

use alloc::vec::Vec;

use ul_applet::{
    AppletId, AppletSession, LibraryAppletCreator, StartError, TerminateError,
    applet_id_for_program_id,
};
use ul_dmi::{DaemonCommand, DaemonReply, DaemonStatus, MenuStartInput, MenuStartMode};
use ul_ipc::FixedString;
use ul_target::{
    ConfigEntryId, ConfigError, ConfigSource, ConfigValue, PathBuf, RawHomebrewTarget,
};
use zerocopy::{IntoBytes, little_endian::U64};

use crate::host::ApplicationHost;

/// API version passed to the menu applet.
pub const MENU_LA_VERSION: u32 = 0;
/// API version passed to homebrew running as a library applet.
pub const HOMEBREW_LA_VERSION: u32 = 0;
/// API version passed to the web applet.
pub const WEB_LA_VERSION: u32 = 0x80000;
/// API version passed to the album applet.
pub const ALBUM_LA_VERSION: u32 = 0x10000;
/// Album argument: show every album file, as the HOME menu does.
pub const ALBUM_SHOW_ALL_FOR_HOME_MENU: u8 = 2;

/// A foreground change deferred until the current reply is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandOff {
    /// Close the menu so the application gets the foreground.
    CloseMenu,
    /// Close the menu and start it again.
    RestartMenu,
    /// Replace the menu with a library applet.
    LaunchApplet {
        id: AppletId,
        la_version: u32,
        input: Vec<u8>,
    },
}

/// Everything the daemon owns besides its command channel.
pub struct DaemonContext<A: LibraryAppletCreator, H, S> {
    session: AppletSession<A>,
    host: H,
    config: S,
    status: DaemonStatus,
    menu_path: PathBuf,
    menu_index: u32,
    pending: Option<HandOff>,
    app_foreground: bool,
    launch_failed: bool,
}

impl<A, H, S> DaemonContext<A, H, S>
where
    A: LibraryAppletCreator,
    H: ApplicationHost,
    S: ConfigSource,
{
    /// Creates the context and registers the menu takeover applet.
    pub fn new(creator: A, host: H, config: S) -> Result<Self, NewDaemonError> {
        let program_id = config.read_u64(ConfigEntryId::MenuTakeoverProgramId);
        let menu_id = applet_id_for_program_id(program_id);
        if menu_id.is_none() {
            return Err(NewDaemonError::InvalidMenuTakeover { program_id });
        }
        log::info!("menu runs as {menu_id:?} ({program_id:#018x})");

        let mut session = AppletSession::new(creator);
        session.set_menu_applet_id(menu_id);

        let status = DaemonStatus {
            fw_version: FixedString::new_truncate(host.firmware_version()),
            ..DaemonStatus::default()
        };

        Ok(Self {
            session,
            host,
            config,
            status,
            menu_path: PathBuf::empty(),
            menu_index: 0,
            pending: None,
            app_foreground: false,
            launch_failed: false,
        })
    }

    #[inline]
    pub fn session(&self) -> &AppletSession<A> {
        &self.session
    }

    #[inline]
    pub fn session_mut(&mut self) -> &mut AppletSession<A> {
        &mut self.session
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[inline]
    pub fn config(&self) -> &S {
        &self.config
    }

    #[inline]
    pub fn status(&self) -> &DaemonStatus {
        &self.status
    }

    #[inline]
    pub fn pending(&self) -> Option<&HandOff> {
        self.pending.as_ref()
    }

    /// Returns true while an application holds the foreground.
    #[inline]
    pub fn is_application_foreground(&self) -> bool {
        self.app_foreground
    }

    /// Returns the menu position passed in the next [`MenuStartInput`].
    #[inline]
    pub fn menu_position(&self) -> (&PathBuf, u32) {
        (&self.menu_path, self.menu_index)
    }

    /// Performs one menu command.
    pub fn handle(&mut self, command: DaemonCommand) -> Result<DaemonReply, HandleError> {
        match command {
            DaemonCommand::SetSelectedUser(uid) => {
                self.status.selected_user = uid;
            }
            DaemonCommand::LaunchApplication(app_id) => {
                if self.host.is_application_running() {
                    return Err(HandleError::ApplicationActive);
                }
                self.host
                    .launch_application(app_id, self.status.selected_user)
                    .map_err(HandleError::Host)?;

                log::info!("launched application {app_id:#018x}");
                self.status.app_id = U64::new(app_id);
                self.status.params = RawHomebrewTarget::EMPTY;
                self.give_foreground_to_application();
            }
            DaemonCommand::ResumeApplication => {
                if !self.host.is_application_running() {
                    return Err(HandleError::ApplicationNotActive);
                }
                self.host.resume_application().map_err(HandleError::Host)?;
                self.give_foreground_to_application();
            }
            DaemonCommand::TerminateApplication => {
                self.host.terminate_application().map_err(HandleError::Host)?;
                self.clear_suspended();
            }
            DaemonCommand::LaunchHomebrewLibraryApplet(target) => {
                let program_id = self
                    .config
                    .read_u64(ConfigEntryId::HomebrewAppletTakeoverProgramId);
                let id = applet_id_for_program_id(program_id);
                if id.is_none() {
                    return Err(HandleError::InvalidTakeover { id: program_id });
                }
                self.defer(HandOff::LaunchApplet {
                    id,
                    la_version: HOMEBREW_LA_VERSION,
                    input: Vec::from(target.as_bytes()),
                });
            }
            DaemonCommand::LaunchHomebrewApplication(target) => {
                if self.host.is_application_running() {
                    return Err(HandleError::ApplicationActive);
                }
                let app_id = self
                    .config
                    .read_u64(ConfigEntryId::HomebrewApplicationTakeoverApplicationId);
                if app_id == 0 {
                    return Err(HandleError::InvalidTakeover { id: app_id });
                }
                self.host
                    .launch_homebrew_application(app_id, self.status.selected_user, &target)
                    .map_err(HandleError::Host)?;

                log::info!("launched homebrew application through {app_id:#018x}");
                self.status.app_id = U64::new(app_id);
                self.status.params = target;
                self.give_foreground_to_application();
            }
            DaemonCommand::OpenWebPage(url) => {
                self.defer(HandOff::LaunchApplet {
                    id: AppletId::LibraryAppletWeb,
                    la_version: WEB_LA_VERSION,
                    input: Vec::from(url.as_bytes()),
                });
            }
            DaemonCommand::OpenAlbum => {
                self.defer(HandOff::LaunchApplet {
                    id: AppletId::LibraryAppletPhotoViewer,
                    la_version: ALBUM_LA_VERSION,
                    input: Vec::from([ALBUM_SHOW_ALL_FOR_HOME_MENU]),
                });
            }
            DaemonCommand::RestartMenu => {
                self.defer(HandOff::RestartMenu);
            }
            DaemonCommand::SetHomebrewTakeoverApplication(app_id) => {
                self.config
                    .write_option(
                        ConfigEntryId::HomebrewApplicationTakeoverApplicationId,
                        ConfigValue::U64(app_id),
                    )
                    .map_err(HandleError::Config)?;
            }
            DaemonCommand::UpdateMenuPath(path) => {
                self.menu_path = path;
            }
            DaemonCommand::UpdateMenuIndex(index) => {
                self.menu_index = index;
            }
            DaemonCommand::GetStatus => return Ok(DaemonReply::Status(self.status)),
        }
        Ok(DaemonReply::Empty)
    }

    /// Starts the menu applet in `mode`.
    pub fn launch_menu(&mut self, mode: MenuStartMode) -> Result<(), StartError> {
        let input = MenuStartInput::new(mode, self.menu_index, self.menu_path);
        let menu_id = self.session.menu_applet_id();

        log::info!("launching menu ({mode:?})");
        self.session.start(menu_id, MENU_LA_VERSION, input.as_bytes())
    }

    /// Carries out the deferred hand-off, if any.
    pub fn run_pending(&mut self) -> Result<(), TerminateError> {
        let Some(hand_off) = self.pending.take() else {
            return Ok(());
        };
        log::debug!("running hand-off {hand_off:?}");

        match hand_off {
            HandOff::CloseMenu | HandOff::RestartMenu => self.session.terminate(),
            HandOff::LaunchApplet {
                id,
                la_version,
                input,
            } => {
                if let Err(err) = self.session.start(id, la_version, &input) {
                    log::warn!("failed to launch {id:?}: {err}");
                    self.launch_failed = true;
                }
                Ok(())
            }
        }
    }

    /// Notices an application that exited on its own.
    pub fn check_application(&mut self) {
        if self.host.is_application_running() {
            return;
        }
        if self.app_foreground || self.status.app_id.get() != 0 {
            log::info!("application {:#018x} exited", self.status.app_id.get());
            self.clear_suspended();
        }
    }

    /// Picks the mode the menu should be relaunched in.
    pub fn next_menu_mode(&mut self) -> MenuStartMode {
        if core::mem::take(&mut self.launch_failed) {
            MenuStartMode::MenuLaunchFailure
        } else if !self.status.selected_user.is_valid() {
            MenuStartMode::StartupScreen
        } else if self.host.is_application_running() {
            MenuStartMode::MenuApplicationSuspended
        } else {
            MenuStartMode::Menu
        }
    }

    /// Takes the foreground back from the running application.
    pub(crate) fn suspend_application(&mut self) {
        self.app_foreground = false;
    }

    fn give_foreground_to_application(&mut self) {
        self.app_foreground = true;
        self.defer(HandOff::CloseMenu);
    }

    fn clear_suspended(&mut self) {
        self.app_foreground = false;
        self.status.app_id = U64::ZERO;
        self.status.params = RawHomebrewTarget::EMPTY;
    }

    fn defer(&mut self, hand_off: HandOff) {
        if let Some(previous) = self.pending.replace(hand_off) {
            log::warn!("dropping pending hand-off {previous:?}");
        }
    }
}

/// Error returned when creating the daemon.
#[derive(Debug, thiserror::Error)]
pub enum NewDaemonError {
    /// The configured menu takeover is not a library applet.
    #[error("menu takeover program {program_id:#018x} is not a library applet")]
    InvalidMenuTakeover { program_id: u64 },
}

impl From<NewDaemonError> for ul_rc::Error {
    fn from(err: NewDaemonError) -> Self {
        match err {
            NewDaemonError::InvalidMenuTakeover { .. } => ul_rc::ul::INVALID_TAKEOVER,
        }
    }
}

/// Error answered to the menu when a command fails.
#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    #[error("an application is already running")]
    ApplicationActive,
    #[error("no application is running")]
    ApplicationNotActive,
    /// The configured takeover id cannot host homebrew.
    #[error("invalid homebrew takeover {id:#018x}")]
    InvalidTakeover { id: u64 },
    #[error("application host request failed")]
    Host(#[source] ul_rc::Error),
    #[error("failed to update configuration")]
    Config(#[source] ConfigError),
}

impl From<HandleError> for ul_rc::Error {
    fn from(err: HandleError) -> Self {
        match err {
            HandleError::ApplicationActive => ul_rc::ul::APPLICATION_ACTIVE,
            HandleError::ApplicationNotActive => ul_rc::ul::APPLICATION_NOT_ACTIVE,
            HandleError::InvalidTakeover { .. } => ul_rc::ul::INVALID_TAKEOVER,
            HandleError::Host(rc) => rc,
            HandleError::Config(err) => err.into(),
        }
    }
}
