//! # ul-dmi
//!
//! The daemon↔menu channel ("DMI").
//!
//! The menu runs as a library applet launched by the daemon. It asks the
//! daemon to do everything that needs system privileges (launching titles,
//! opening the browser, restarting itself) by sending commands through its
//! applet storages; the daemon answers each one.
//!
//! ```text
//!   menu (MenuClient)                         daemon (receive_command)
//!   ─────────────────                         ────────────────────────
//!   {DMI0, LaunchApplication} + app id  ───>  decode, launch
//!                           {DMI0, 0}   <───  reply
//! ```
//!
//! In the other direction the daemon pushes [`MenuMessage`] notifications
//! into the running menu.

#![no_std]

#[cfg(test)]
extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod client;
pub mod command;
pub mod proto;
pub mod server;

pub use self::{
    client::{LaunchTitleError, MenuClient, receive_menu_message},
    command::{DaemonCommand, DaemonReply, DecodeError},
    proto::{
        DaemonMessage, DaemonStatus, FW_VERSION_LEN, MAGIC, MenuMessage, MenuStartInput,
        MenuStartMode, PRIVATE_SERVICE_NAME, PUBLIC_SERVICE_NAME, URL_LEN, Url,
    },
    server::{DispatchError, receive_command},
};
