//! # ul-target
//!
//! Launch targets and launcher options shared by the daemon and the menu.
//!
//! Everything here is data produced by the configuration layer and consumed
//! by the command catalogs: the account id of the selected user, homebrew
//! launch descriptors, menu titles and the persisted option catalog.

#![no_std]

extern crate alloc;

pub mod account;
pub mod config;
pub mod homebrew;
pub mod title;

pub use self::{
    account::AccountUid,
    config::{ConfigEntryId, ConfigEntryType, ConfigError, ConfigSource, ConfigValue, MemoryConfig},
    homebrew::{HomebrewTarget, LaunchFlags, PATH_LEN, PathBuf, RawHomebrewTarget, TargetError},
    title::{ApplicationInfo, LaunchTarget, Title},
};
