//! # ul-applet
//!
//! Library applet management for the uLaunch daemon.
//!
//! The menu does not run as a regular process: the daemon launches it in the
//! slot of a system library applet (the _menu takeover_, the shop applet by
//! default), and launches other library applets (web browser, album) in its
//! place when the menu asks for them. Only one of them holds the foreground at
//! any time.
//!
//! - [`id`]: applet ids and the fixed program-id table.
//! - [`args`]: the common arguments every library applet receives first.
//! - [`host`]: the OS operations used to create and drive an applet.
//! - [`session`]: the [`AppletSession`] state machine owning the active applet.
//!
//! ## References
//! - [Switchbrew Wiki: Library Applets](https://switchbrew.org/wiki/Library_Applets)
//! - [libnx applet.h](https://github.com/switchbrew/libnx/blob/master/nx/include/switch/services/applet.h)

#![no_std]

#[cfg(test)]
extern crate alloc;

pub mod args;
pub mod host;
pub mod id;
pub mod session;

pub use self::{
    args::{COMMON_ARGUMENTS_VERSION, CommonArguments, LibraryAppletMode},
    host::{LibraryAppletCreator, LibraryAppletHolder},
    id::{APPLET_TABLE, AppletId, applet_id_for_program_id, program_id_for_applet_id},
    session::{
        AppletSession, PopError, PushError, SessionState, StartError, TERMINATE_TIMEOUT,
        TerminateError,
    },
};
