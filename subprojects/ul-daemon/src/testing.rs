//! Fake OS collaborators recording every request in one shared log.

use alloc::{rc::Rc, vec::Vec};
use core::{
    cell::{Cell, RefCell},
    time::Duration,
};

use ul_applet::{AppletId, LibraryAppletCreator, LibraryAppletHolder, LibraryAppletMode};
use ul_rc::{Error, Module};
use ul_target::{AccountUid, RawHomebrewTarget};

use crate::host::ApplicationHost;

const HOST_FAILURE: Error = Error::from_parts(Module::LibraryApplet, 2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    LaunchApplication(u64, AccountUid),
    LaunchHomebrewApplication(u64, AccountUid, RawHomebrewTarget),
    ResumeApplication,
    TerminateApplication,
    CreateApplet(AppletId),
    PushApplet(AppletId, Vec<u8>),
    StartApplet(AppletId),
    ExitApplet(AppletId),
}

#[derive(Default)]
struct State {
    calls: RefCell<Vec<Call>>,
    app_running: Cell<bool>,
    applet_finished: Cell<bool>,
    fail_applet: Cell<Option<AppletId>>,
}

/// Handle on the shared fake state.
#[derive(Clone, Default)]
pub struct Host(Rc<State>);

impl Host {
    pub fn calls(&self) -> Vec<Call> {
        self.0.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.0.calls.borrow_mut().clear();
    }

    pub fn set_application_running(&self, running: bool) {
        self.0.app_running.set(running);
    }

    /// Makes the running applet exit on its own.
    pub fn finish_applet(&self) {
        self.0.applet_finished.set(true);
    }

    /// Makes the next creation of `id` fail.
    pub fn fail_applet(&self, id: AppletId) {
        self.0.fail_applet.set(Some(id));
    }

    /// Returns the input pushed after the common arguments of the last started applet.
    pub fn last_input(&self) -> Option<(AppletId, Vec<u8>)> {
        let calls = self.0.calls.borrow();
        let start = calls.iter().rposition(|call| matches!(call, Call::CreateApplet(_)))?;
        calls[start..]
            .iter()
            .filter_map(|call| match call {
                Call::PushApplet(id, data) => Some((*id, data.clone())),
                _ => None,
            })
            .nth(1)
    }

    pub fn firmware(&self) -> &'static str {
        "18.1.0|AMS 1.8.0|S"
    }

    fn record(&self, call: Call) {
        self.0.calls.borrow_mut().push(call);
    }
}

pub struct FakeCreator(pub Host);

pub struct FakeHolder {
    id: AppletId,
    host: Host,
}

impl LibraryAppletCreator for FakeCreator {
    type Holder = FakeHolder;

    fn create_library_applet(
        &mut self,
        id: AppletId,
        _mode: LibraryAppletMode,
    ) -> ul_rc::Result<FakeHolder> {
        if self.0.0.fail_applet.get() == Some(id) {
            self.0.0.fail_applet.set(None);
            return Err(HOST_FAILURE);
        }
        self.0.record(Call::CreateApplet(id));
        self.0.0.applet_finished.set(false);
        Ok(FakeHolder {
            id,
            host: self.0.clone(),
        })
    }

    fn system_tick(&self) -> u64 {
        0
    }
}

impl LibraryAppletHolder for FakeHolder {
    fn push_in_data(&mut self, data: &[u8]) -> ul_rc::Result<()> {
        self.host.record(Call::PushApplet(self.id, data.to_vec()));
        Ok(())
    }

    fn pop_out_data(&mut self, _out: &mut [u8]) -> ul_rc::Result<usize> {
        Err(HOST_FAILURE)
    }

    fn start(&mut self) -> ul_rc::Result<()> {
        self.host.record(Call::StartApplet(self.id));
        Ok(())
    }

    fn has_state_changed_event(&self) -> bool {
        true
    }

    fn is_service_active(&self) -> bool {
        true
    }

    fn check_finished(&self) -> bool {
        self.host.0.applet_finished.get()
    }

    fn request_exit_or_terminate(&mut self, _timeout: Duration) -> ul_rc::Result<()> {
        self.host.record(Call::ExitApplet(self.id));
        self.host.0.applet_finished.set(true);
        Ok(())
    }
}

pub struct FakeHost(pub Host);

impl ApplicationHost for FakeHost {
    fn launch_application(&mut self, app_id: u64, user: AccountUid) -> ul_rc::Result<()> {
        self.0.record(Call::LaunchApplication(app_id, user));
        self.0.set_application_running(true);
        Ok(())
    }

    fn launch_homebrew_application(
        &mut self,
        app_id: u64,
        user: AccountUid,
        target: &RawHomebrewTarget,
    ) -> ul_rc::Result<()> {
        self.0
            .record(Call::LaunchHomebrewApplication(app_id, user, *target));
        self.0.set_application_running(true);
        Ok(())
    }

    fn resume_application(&mut self) -> ul_rc::Result<()> {
        self.0.record(Call::ResumeApplication);
        Ok(())
    }

    fn terminate_application(&mut self) -> ul_rc::Result<()> {
        self.0.record(Call::TerminateApplication);
        self.0.set_application_running(false);
        Ok(())
    }

    fn is_application_running(&self) -> bool {
        self.0.0.app_running.get()
    }

    fn firmware_version(&self) -> &str {
        self.0.firmware()
    }
}
