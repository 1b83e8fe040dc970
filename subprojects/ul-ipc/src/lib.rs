//! # ul-ipc
//!
//! Storage-based command channels between uLaunch processes.
//!
//! The daemon, the menu and the in-applet helpers never talk through regular
//! IPC sessions for their commands. Instead, each request and each reply is
//! written into a fixed-size exchange buffer (a _storage_), handed to the peer
//! through an applet data queue, and read back on the other side.
//!
//! This crate provides the pieces shared by every such channel:
//!
//! - [`storage`]: the [`Storage`]/[`StorageChannel`] seams and the scoped
//!   bounded cursors reading and writing them.
//! - [`header`]: the 8-byte `{magic, val}` envelope and the [`Message`]
//!   trait implemented by each catalog.
//! - [`channel`]: the generic [`Initiator`] and [`Responder`] halves.
//! - [`fixed_str`]: NUL-padded string buffers used for paths and URLs.
//! - [`service_name`]: 8-byte service names.
//! - [`memory`]: a heap-backed channel for scripted exchanges.
//! - `loopback` (feature `std`): a blocking two-endpoint pipe.
//!
//! ## References
//! - [Switchbrew Wiki: Applet Manager services](https://switchbrew.org/wiki/Applet_Manager_services)

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod channel;
pub mod fixed_str;
pub mod header;
#[cfg(feature = "std")]
pub mod loopback;
pub mod memory;
pub mod service_name;
pub mod storage;

pub use self::{
    channel::{CommandError, Direction, Initiator, Responder},
    fixed_str::FixedString,
    header::{CommandHeader, Message},
    service_name::ServiceName,
    storage::{
        COMMAND_STORAGE_SIZE, ScopedStorageReader, ScopedStorageWriter, Storage, StorageChannel,
        StorageError,
    },
};
