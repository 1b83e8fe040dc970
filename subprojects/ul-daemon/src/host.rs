use ul_target::{AccountUid, RawHomebrewTarget};

/// Application lifecycle operations of the system applet (`IApplicationCreator`
/// and `IApplicationAccessor`).
pub trait ApplicationHost {
    /// Launches application `app_id` for `user`. It starts suspended behind the
    /// foreground applet.
    fn launch_application(&mut self, app_id: u64, user: AccountUid) -> ul_rc::Result<()>;

    /// Launches the takeover application `app_id` for `user`, with the homebrew
    /// loader set to run `target`.
    fn launch_homebrew_application(
        &mut self,
        app_id: u64,
        user: AccountUid,
        target: &RawHomebrewTarget,
    ) -> ul_rc::Result<()>;

    /// Brings the running application back to the foreground.
    fn resume_application(&mut self) -> ul_rc::Result<()>;

    /// Terminates the running application.
    fn terminate_application(&mut self) -> ul_rc::Result<()>;

    /// Returns true while an application process exists.
    fn is_application_running(&self) -> bool;

    /// Returns the system version string shown by the menu.
    fn firmware_version(&self) -> &str;
}
