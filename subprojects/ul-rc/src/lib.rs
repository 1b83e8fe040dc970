//! Result codes shared by every uLaunch process.
//!
//! Horizon OS reports failures as 32-bit result codes, and uLaunch reuses the
//! same encoding for everything that crosses a process boundary: a command
//! reply header carries one of these codes in place of the opcode, and the
//! receiving side turns a non-zero code back into an [`Error`].
//!
//! # Structure
//!
//! The 32-bit result code is structured as follows:
//!
//! - **Bits 0-8:** Module ID
//! - **Bits 9-21:** Description
//! - **Bits 22-31:** Reserved
//!
//! A raw value of `0` is the success sentinel.
//!
//! uLaunch's own failures live under [`Module::ULaunch`] (380). See [`ul`] for
//! the table.
//!
//! # References
//! - [Switchbrew Wiki: Error Codes](https://switchbrew.org/wiki/Error_codes)

#![no_std]

/// Type alias for Result with [`Error`] as the error type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Successful result code
const SUCCESS: u32 = 0;

/// Mask for the module field (9 bits)
const MODULE_MASK: u32 = 0x1FF;
/// Mask for the description field (13 bits)
const DESCRIPTION_MASK: u32 = 0x1FFF;
/// Shift amount for the description field
const DESCRIPTION_SHIFT: u32 = 9;

/// Modules that uLaunch reports or recognizes.
///
/// Codes from any other module are still carried verbatim; this list only
/// names the ones the control plane produces itself or is likely to relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Module {
    /// Kernel (SVC) failures.
    Kernel = 1,
    /// Filesystem services.
    Fs = 2,
    /// Service framework (CMIF/HIPC) failures.
    Sf = 10,
    /// Service manager.
    Sm = 21,
    /// Application manager (ns).
    Ns = 16,
    /// Account services.
    Account = 124,
    /// Applet manager (AM).
    Applet = 128,
    /// Library applet helpers.
    LibraryApplet = 129,
    /// uLaunch itself.
    ULaunch = 380,
}

impl Module {
    /// Creates a `Module` from its raw number.
    ///
    /// Returns `None` for modules uLaunch does not name.
    #[inline]
    pub const fn from_raw(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Kernel),
            2 => Some(Self::Fs),
            10 => Some(Self::Sf),
            21 => Some(Self::Sm),
            16 => Some(Self::Ns),
            124 => Some(Self::Account),
            128 => Some(Self::Applet),
            129 => Some(Self::LibraryApplet),
            380 => Some(Self::ULaunch),
            _ => None,
        }
    }
}

/// Encapsulates a raw result code, containing both success and error states.
///
/// This is what travels on the wire. For error handling with the standard
/// library traits, see [`Error`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct ResultCode(u32);

impl ResultCode {
    /// The success sentinel.
    pub const SUCCESS: Self = Self(SUCCESS);

    /// Creates a new [`ResultCode`] from a raw value
    #[inline]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value of the [`ResultCode`]
    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// Creates a new [`ResultCode`] from a module and description
    #[inline]
    pub const fn from_parts(module: u32, description: u32) -> Self {
        let module_val = module & MODULE_MASK;
        let desc_val = (description & DESCRIPTION_MASK) << DESCRIPTION_SHIFT;
        Self(module_val | desc_val)
    }

    /// Returns true if the [`ResultCode`] represents a success
    #[inline]
    pub const fn is_success(&self) -> bool {
        self.0 == SUCCESS
    }

    /// Returns the raw module number
    #[inline]
    pub const fn module(&self) -> u32 {
        self.0 & MODULE_MASK
    }

    /// Returns the description value
    #[inline]
    pub const fn description(&self) -> u32 {
        (self.0 >> DESCRIPTION_SHIFT) & DESCRIPTION_MASK
    }

    /// Converts this code into a [`Result`], `Ok(())` on success.
    #[inline]
    pub const fn into_result(self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error(self))
        }
    }
}

impl From<Error> for ResultCode {
    #[inline]
    fn from(err: Error) -> Self {
        err.0
    }
}

impl<E: Into<Error>> From<Result<(), E>> for ResultCode {
    /// Flattens an operation outcome into the code written to a reply header.
    #[inline]
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::SUCCESS,
            Err(err) => err.into().0,
        }
    }
}

/// A failing result code.
///
/// The stored code is guaranteed to be non-zero.
///
/// # Formatting
///
/// The error code is formatted as `2XXX-YYYY` where:
///  - `XXX` is `2000` + module number
///  - `YYYY` is the `description`
///
/// ```text
/// ul::OUT_OF_PUSH_SPACE  =>  "2380-0001"
/// ```
#[derive(Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct Error(ResultCode);

impl Error {
    /// Creates an error from a module and description.
    ///
    /// # Panics
    ///
    /// Panics if both parts are zero, which would encode the success sentinel.
    #[inline]
    pub const fn from_parts(module: Module, description: u32) -> Self {
        let rc = ResultCode::from_parts(module as u32, description);
        assert!(!rc.is_success(), "result code must not be the success value");
        Self(rc)
    }

    /// Creates an error from a raw value, or `None` if `raw` is the success value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        if raw == SUCCESS {
            None
        } else {
            Some(Self(ResultCode(raw)))
        }
    }

    /// Returns the raw module number that caused the error
    #[inline]
    pub const fn module(&self) -> u32 {
        self.0.module()
    }

    /// Returns the module if it is one uLaunch names
    #[inline]
    pub const fn known_module(&self) -> Option<Module> {
        Module::from_raw(self.0.module())
    }

    /// Returns the description value
    #[inline]
    pub const fn description(&self) -> u32 {
        self.0.description()
    }

    /// Returns the raw value (`u32`) of this error code
    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0.to_raw()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:04}",
            2000 + self.0.module(),
            self.0.description()
        )
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Error")
            .field("code", &format_args!("{}", self))
            .field("module", &self.0.module())
            .field("description", &self.0.description())
            .field("raw", &format_args!("{:#x}", self.0.to_raw()))
            .finish()
    }
}

impl core::error::Error for Error {}

/// uLaunch result codes (module 380).
pub mod ul {
    use super::{Error, Module};

    /// A write would advance past the end of the exchange buffer.
    pub const OUT_OF_PUSH_SPACE: Error = Error::from_parts(Module::ULaunch, 1);

    /// A read would advance past the end of the exchange buffer.
    pub const OUT_OF_POP_SPACE: Error = Error::from_parts(Module::ULaunch, 2);

    /// An inbound request carried a foreign magic.
    pub const INVALID_IN_HEADER_MAGIC: Error = Error::from_parts(Module::ULaunch, 3);

    /// An inbound reply carried a foreign magic.
    pub const INVALID_OUT_HEADER_MAGIC: Error = Error::from_parts(Module::ULaunch, 4);

    /// The opcode is not part of the channel's catalog.
    pub const INVALID_MESSAGE: Error = Error::from_parts(Module::ULaunch, 5);

    /// No library applet is held by the session.
    pub const NO_ACTIVE_APPLET: Error = Error::from_parts(Module::ULaunch, 6);

    /// An application is already running.
    pub const APPLICATION_ACTIVE: Error = Error::from_parts(Module::ULaunch, 7);

    /// No application is running.
    pub const APPLICATION_NOT_ACTIVE: Error = Error::from_parts(Module::ULaunch, 8);

    /// The configured takeover program or application is unusable.
    pub const INVALID_TAKEOVER: Error = Error::from_parts(Module::ULaunch, 9);

    /// A blocking wait for a storage returned without one.
    pub const NO_STORAGE_AVAILABLE: Error = Error::from_parts(Module::ULaunch, 10);

    /// An argument is outside the range the protocol accepts.
    pub const INVALID_ARGUMENT: Error = Error::from_parts(Module::ULaunch, 11);
}

#[cfg(test)]
mod tests {
    use super::{Error, Module, ResultCode, ul};

    #[test]
    fn success_code_is_not_an_error() {
        assert!(ResultCode::SUCCESS.is_success());
        assert_eq!(ResultCode::SUCCESS.into_result(), Ok(()));
        assert_eq!(Error::from_raw(0), None);
    }

    #[test]
    fn parts_are_split_back_out() {
        let rc = ResultCode::from_parts(380, 9);

        assert_eq!(rc.module(), 380);
        assert_eq!(rc.description(), 9);
        assert_eq!(rc.to_raw(), 380 | (9 << 9));
    }

    #[test]
    fn failing_code_converts_to_error() {
        let raw = ul::NO_ACTIVE_APPLET.to_raw();
        let err = ResultCode::from_raw(raw).into_result().unwrap_err();

        assert_eq!(err, ul::NO_ACTIVE_APPLET);
        assert_eq!(err.known_module(), Some(Module::ULaunch));
    }

    #[test]
    fn display_uses_horizon_format() {
        let mut buf = [0u8; 16];
        let len = {
            use core::fmt::Write as _;

            struct Cursor<'a>(&'a mut [u8], usize);
            impl core::fmt::Write for Cursor<'_> {
                fn write_str(&mut self, s: &str) -> core::fmt::Result {
                    let end = self.1 + s.len();
                    self.0[self.1..end].copy_from_slice(s.as_bytes());
                    self.1 = end;
                    Ok(())
                }
            }

            let mut cursor = Cursor(&mut buf, 0);
            write!(cursor, "{}", ul::OUT_OF_PUSH_SPACE).unwrap();
            cursor.1
        };

        assert_eq!(&buf[..len], b"2380-0001");
    }

    #[test]
    fn outcome_flattens_into_reply_code() {
        let ok: Result<(), Error> = Ok(());
        let err: Result<(), Error> = Err(ul::APPLICATION_ACTIVE);

        assert_eq!(ResultCode::from(ok), ResultCode::SUCCESS);
        assert_eq!(ResultCode::from(err), ul::APPLICATION_ACTIVE.into());
    }

    #[test]
    fn unknown_module_is_kept_verbatim() {
        let err = Error::from_raw(ResultCode::from_parts(77, 3).to_raw()).unwrap();

        assert_eq!(err.module(), 77);
        assert_eq!(err.known_module(), None);
    }
}
