//! # ul-daemon
//!
//! The uLaunch daemon: the process that replaces the HOME menu.
//!
//! It owns the foreground. The menu runs as a library applet the daemon starts
//! (see [`ul_applet`]) and asks for everything else over the daemon↔menu
//! channel ([`ul_dmi`]): launching applications and homebrew, opening the
//! browser or the album, restarting itself. The daemon brings the menu back
//! whenever nothing else is in the foreground.
//!
//! The OS side is reached only through traits, so the whole state machine can
//! be driven by fakes:
//! - [`ul_ipc::StorageChannel`] for the menu's command storages.
//! - [`ul_applet::LibraryAppletCreator`] for library applets.
//! - [`ApplicationHost`] for applications.
//! - [`ul_target::ConfigSource`] for the launcher configuration.

#![no_std]

extern crate alloc;

pub mod context;
pub mod daemon;
pub mod host;

#[cfg(test)]
mod testing;

pub use self::{
    context::{
        ALBUM_LA_VERSION, ALBUM_SHOW_ALL_FOR_HOME_MENU, DaemonContext, HOMEBREW_LA_VERSION,
        HandOff, HandleError, MENU_LA_VERSION, NewDaemonError, WEB_LA_VERSION,
    },
    daemon::{Daemon, HomeButtonError, TickError},
    host::ApplicationHost,
};
