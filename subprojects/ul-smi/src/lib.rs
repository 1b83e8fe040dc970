//! # ul-smi
//!
//! The menu↔system channel ("SMI").
//!
//! Same exchange as the daemon↔menu channel, under its own magic so the two
//! families can never be confused. The vocabulary mirrors the daemon↔menu
//! catalog, adds a homebrew picker request and drops the status query.

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
    client::SystemClient,
    command::{DecodeError, SystemCommand},
    proto::{MAGIC, SystemMessage, URL_LEN, Url},
    server::{DispatchError, receive_command},
};
