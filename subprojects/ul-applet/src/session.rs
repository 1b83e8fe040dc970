//! The library applet currently holding the foreground.
//!
//! The daemon runs at most one library applet at a time: the menu itself, or
//! an applet launched on its behalf (web browser, album, homebrew). The
//! session owns that applet's holder and brokers every interaction with it.
//!
//! ```text
//!          start()                       applet exits / terminate()
//!   Idle ─────────> Starting ─────────> Running ───────────────────> Idle
//!    ^                  │  create, push args, push input, start
//!    └──────────────────┘  any stage fails
//! ```
//!
//! Liveness is never cached: [`AppletSession::is_active`] asks the holder on
//! every call.

use core::time::Duration;

use zerocopy::IntoBytes;

use crate::{
    args::{CommonArguments, LibraryAppletMode},
    host::{LibraryAppletCreator, LibraryAppletHolder},
    id::AppletId,
};

/// Grace period given to an applet asked to exit before it is terminated.
pub const TERMINATE_TIMEOUT: Duration = Duration::from_secs(15);

/// Coarse session state, derived from the holder on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No applet is running.
    Idle,
    /// An applet was started and has not finished.
    Running,
}

/// State of the single active library applet.
pub struct AppletSession<C: LibraryAppletCreator> {
    creator: C,
    holder: Option<C::Holder>,
    last_started: AppletId,
    menu_id: AppletId,
}

impl<C: LibraryAppletCreator> AppletSession<C> {
    /// Creates an idle session launching applets through `creator`.
    pub fn new(creator: C) -> Self {
        Self {
            creator,
            holder: None,
            last_started: AppletId::None,
            menu_id: AppletId::None,
        }
    }

    #[inline]
    pub fn creator(&self) -> &C {
        &self.creator
    }

    #[inline]
    pub fn creator_mut(&mut self) -> &mut C {
        &mut self.creator
    }

    /// Starts library applet `id`, replacing whatever applet is running.
    ///
    /// `input` is pushed after the common arguments unless it is empty.
    pub fn start(&mut self, id: AppletId, la_version: u32, input: &[u8]) -> Result<(), StartError> {
        if self.is_active()
            && let Err(err) = self.terminate()
        {
            log::warn!("failed to terminate running applet before starting {id:?}: {err}");
        }
        self.holder = None;

        let mut holder = self
            .creator
            .create_library_applet(id, LibraryAppletMode::AllForeground)
            .map_err(StartError::Create)?;

        let args = CommonArguments::new(la_version, self.creator.system_tick());
        holder
            .push_in_data(args.as_bytes())
            .map_err(StartError::PushArguments)?;

        if !input.is_empty() {
            holder.push_in_data(input).map_err(StartError::PushInput)?;
        }

        holder.start().map_err(StartError::Start)?;

        log::info!("started library applet {id:?}");
        self.holder = Some(holder);
        self.last_started = id;
        Ok(())
    }

    /// Returns true while the started applet is alive.
    pub fn is_active(&self) -> bool {
        self.holder.as_ref().is_some_and(|holder| {
            holder.has_state_changed_event() && holder.is_service_active() && !holder.check_finished()
        })
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        if self.is_active() {
            SessionState::Running
        } else {
            SessionState::Idle
        }
    }

    /// Asks the running applet to exit, terminating it after [`TERMINATE_TIMEOUT`].
    ///
    /// The handle is closed once the applet is gone. Does nothing if the
    /// session is idle.
    pub fn terminate(&mut self) -> Result<(), TerminateError> {
        if !self.is_active() {
            self.holder = None;
            return Ok(());
        }
        let Some(holder) = self.holder.as_mut() else {
            return Ok(());
        };

        holder
            .request_exit_or_terminate(TERMINATE_TIMEOUT)
            .map_err(|err| {
                log::error!("failed to terminate library applet: {err}");
                TerminateError(err)
            })?;
        self.holder = None;
        Ok(())
    }

    /// Pushes `data` to the running applet.
    pub fn push(&mut self, data: &[u8]) -> Result<(), PushError> {
        let holder = self.active_holder().ok_or(PushError::NoActiveApplet)?;
        holder.push_in_data(data).map_err(PushError::Push)
    }

    /// Pops the next output of the applet into `out`, returning its length.
    pub fn pop(&mut self, out: &mut [u8]) -> Result<usize, PopError> {
        let holder = self.active_holder().ok_or(PopError::NoActiveApplet)?;
        holder.pop_out_data(out).map_err(PopError::Pop)
    }

    /// Returns the last started applet.
    ///
    /// Once the applet has finished the record is cleared and its handle
    /// closed, so the id is returned one last time and [`AppletId::None`]
    /// afterwards.
    pub fn last_applet_id(&mut self) -> AppletId {
        let last = self.last_started;
        if !self.is_active() {
            self.holder = None;
            self.last_started = AppletId::None;
        }
        last
    }

    /// Returns true if the running applet is the menu.
    pub fn is_menu(&mut self) -> bool {
        self.is_active() && !self.menu_id.is_none() && self.last_applet_id() == self.menu_id
    }

    #[inline]
    pub fn set_menu_applet_id(&mut self, id: AppletId) {
        self.menu_id = id;
    }

    #[inline]
    pub fn menu_applet_id(&self) -> AppletId {
        self.menu_id
    }

    fn active_holder(&mut self) -> Option<&mut C::Holder> {
        if self.is_active() {
            self.holder.as_mut()
        } else {
            None
        }
    }
}

/// Error returned by [`AppletSession::start`], tagged with the failing stage.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("failed to create library applet")]
    Create(#[source] ul_rc::Error),
    #[error("failed to push common arguments")]
    PushArguments(#[source] ul_rc::Error),
    #[error("failed to push applet input")]
    PushInput(#[source] ul_rc::Error),
    #[error("failed to start library applet")]
    Start(#[source] ul_rc::Error),
}

impl From<StartError> for ul_rc::Error {
    fn from(err: StartError) -> Self {
        match err {
            StartError::Create(rc)
            | StartError::PushArguments(rc)
            | StartError::PushInput(rc)
            | StartError::Start(rc) => rc,
        }
    }
}

/// Error returned by [`AppletSession::terminate`].
#[derive(Debug, thiserror::Error)]
#[error("failed to terminate library applet")]
pub struct TerminateError(#[source] pub ul_rc::Error);

impl From<TerminateError> for ul_rc::Error {
    fn from(err: TerminateError) -> Self {
        err.0
    }
}

/// Error returned by [`AppletSession::push`].
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("no library applet is active")]
    NoActiveApplet,
    #[error("failed to push data to library applet")]
    Push(#[source] ul_rc::Error),
}

impl From<PushError> for ul_rc::Error {
    fn from(err: PushError) -> Self {
        match err {
            PushError::NoActiveApplet => ul_rc::ul::NO_ACTIVE_APPLET,
            PushError::Push(rc) => rc,
        }
    }
}

/// Error returned by [`AppletSession::pop`].
#[derive(Debug, thiserror::Error)]
pub enum PopError {
    #[error("no library applet is active")]
    NoActiveApplet,
    #[error("failed to pop data from library applet")]
    Pop(#[source] ul_rc::Error),
}

impl From<PopError> for ul_rc::Error {
    fn from(err: PopError) -> Self {
        match err {
            PopError::NoActiveApplet => ul_rc::ul::NO_ACTIVE_APPLET,
            PopError::Pop(rc) => rc,
        }
    }
}
