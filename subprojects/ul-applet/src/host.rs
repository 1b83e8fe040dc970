//! OS primitives for creating and driving library applets.

use core::time::Duration;

use crate::{args::LibraryAppletMode, id::AppletId};

/// Creates library applets (`ILibraryAppletCreator`).
pub trait LibraryAppletCreator {
    /// Holder type returned for created applets.
    type Holder: LibraryAppletHolder;

    /// Creates, but does not start, the library applet `id`.
    fn create_library_applet(
        &mut self,
        id: AppletId,
        mode: LibraryAppletMode,
    ) -> ul_rc::Result<Self::Holder>;

    /// Returns the current system tick.
    fn system_tick(&self) -> u64;
}

/// A created library applet (`ILibraryAppletAccessor`).
///
/// Dropping the holder closes it.
pub trait LibraryAppletHolder {
    /// Copies `data` into a new storage and pushes it to the applet's input queue.
    fn push_in_data(&mut self, data: &[u8]) -> ul_rc::Result<()>;

    /// Pops the next storage from the applet's output queue into `out`.
    ///
    /// Returns the number of bytes copied.
    fn pop_out_data(&mut self, out: &mut [u8]) -> ul_rc::Result<usize>;

    /// Starts the applet.
    fn start(&mut self) -> ul_rc::Result<()>;

    /// Returns true if the state-changed event handle is valid.
    fn has_state_changed_event(&self) -> bool;

    /// Returns true if the accessor session is still open.
    fn is_service_active(&self) -> bool;

    /// Returns true once the applet has exited.
    fn check_finished(&self) -> bool;

    /// Asks the applet to exit and terminates it if it has not done so within `timeout`.
    fn request_exit_or_terminate(&mut self, timeout: Duration) -> ul_rc::Result<()>;
}
