//! Arguments pushed to every library applet before it starts.

use static_assertions::const_assert_eq;
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout,
    little_endian::{I32, U32, U64},
};

/// How a library applet shares the screen with its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum LibraryAppletMode {
    /// The applet takes over the whole foreground.
    #[default]
    AllForeground = 0,
    PartialForeground = 1,
    NoUi = 2,
    PartialForegroundWithIndirectDisplay = 3,
    AllForegroundInitiallyHidden = 4,
}

/// Version of the [`CommonArguments`] layout.
pub const COMMON_ARGUMENTS_VERSION: u32 = 1;

/// Header storage every library applet pops first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CommonArguments {
    pub version: U32,
    pub size: U32,
    /// Applet-specific API version
    pub la_version: U32,
    pub theme_color: I32,
    pub play_startup_sound: u8,
    _pad: [u8; 7],
    pub system_tick: U64,
}

const_assert_eq!(size_of::<CommonArguments>(), 0x20);

impl CommonArguments {
    /// Creates the arguments for an applet of API `la_version`, started at `system_tick`.
    ///
    /// The theme color is left at the default and no startup sound is played.
    pub fn new(la_version: u32, system_tick: u64) -> Self {
        Self {
            version: U32::new(COMMON_ARGUMENTS_VERSION),
            size: U32::new(size_of::<Self>() as u32),
            la_version: U32::new(la_version),
            theme_color: I32::new(0),
            play_startup_sound: 0,
            _pad: [0; 7],
            system_tick: U64::new(system_tick),
        }
    }
}
