//! Generic request/reply exchange over a [`StorageChannel`].
//!
//! Every uLaunch channel uses the same two-phase exchange:
//!
//! ```text
//!        Initiator                                   Responder
//!            │                                           │
//!            │  writer: {MAGIC, opcode} + request        │
//!            │ ─────────────────────────────────────────>│ reader: check MAGIC,
//!            │                                           │ dispatch(opcode, payload)
//!            │  writer: {MAGIC, result} [+ reply]        │
//!            │<───────────────────────────────────────── │
//!  reader: check MAGIC,                                  │
//!  fail on result != 0,                                  │
//!  decode reply                                          │
//! ```
//!
//! The Initiator blocks only while waiting for the reply storage. The
//! Responder blocks only if asked to wait for a request. Only one storage is
//! open at any time: each phase's reader or writer is closed before the next
//! one is opened.

use core::marker::PhantomData;

use ul_rc::{ResultCode, ul};

use crate::{
    header::{CommandHeader, Message},
    storage::{ScopedStorageReader, ScopedStorageWriter, StorageChannel, StorageError},
};

/// Requesting side of a channel: sends a command and blocks for its reply.
pub struct Initiator<M, C> {
    channel: C,
    _message: PhantomData<fn() -> M>,
}

impl<M: Message, C: StorageChannel> Initiator<M, C> {
    /// Creates an initiator sending over `channel`.
    #[inline]
    pub const fn new(channel: C) -> Self {
        Self {
            channel,
            _message: PhantomData,
        }
    }

    /// Returns a reference to the underlying channel.
    #[inline]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Returns a mutable reference to the underlying channel.
    #[inline]
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consumes the initiator, returning the channel.
    #[inline]
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Sends `message` and waits for the reply.
    ///
    /// `push_fn` writes the request payload after the header. `pop_fn` reads the
    /// reply payload and only runs if the peer reported success.
    pub fn send<R>(
        &mut self,
        message: M,
        push_fn: impl FnOnce(&mut ScopedStorageWriter<'_, C>) -> Result<(), CommandError>,
        pop_fn: impl FnOnce(&mut ScopedStorageReader<C::Storage>) -> Result<R, CommandError>,
    ) -> Result<R, CommandError> {
        log::debug!("sending {message:?}");

        {
            let mut writer = ScopedStorageWriter::open(&mut self.channel, M::STORAGE_SIZE)
                .map_err(CommandError::CreateStorage)?;
            writer.push(&CommandHeader::new(M::MAGIC, message.to_raw()))?;
            push_fn(&mut writer)?;
            writer.publish().map_err(CommandError::PushStorage)?;
        }

        let mut reader = ScopedStorageReader::open(&mut self.channel, true, M::STORAGE_SIZE)
            .map_err(CommandError::PopStorage)?
            .ok_or(CommandError::MissingReply)?;

        let header = reader.pop::<CommandHeader>()?;
        if header.magic() != M::MAGIC {
            return Err(CommandError::MagicMismatch {
                direction: Direction::Reply,
                expected: M::MAGIC,
                found: header.magic(),
            });
        }

        header
            .result_code()
            .into_result()
            .map_err(CommandError::Remote)?;

        pop_fn(&mut reader)
    }
}

/// Handling side of a channel: receives a command and answers it.
pub struct Responder<M, C> {
    channel: C,
    _message: PhantomData<fn() -> M>,
}

impl<M: Message, C: StorageChannel> Responder<M, C> {
    /// Creates a responder listening on `channel`.
    #[inline]
    pub const fn new(channel: C) -> Self {
        Self {
            channel,
            _message: PhantomData,
        }
    }

    /// Returns a reference to the underlying channel.
    #[inline]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Returns a mutable reference to the underlying channel.
    #[inline]
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consumes the responder, returning the channel.
    #[inline]
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Receives one command and answers it.
    ///
    /// `dispatch` reads the request payload and performs the command; its value
    /// is handed to `reply`, which writes the reply payload. A failing dispatch
    /// is answered with its result code and no payload. So is a reply that
    /// `reply` fails to write; its error is then returned.
    ///
    /// Returns `Ok(None)` if `wait` is false and no request was pending.
    pub fn receive<T, E>(
        &mut self,
        wait: bool,
        dispatch: impl FnOnce(M, &mut ScopedStorageReader<C::Storage>) -> Result<T, E>,
        reply: impl FnOnce(M, T, &mut ScopedStorageWriter<'_, C>) -> Result<(), CommandError>,
    ) -> Result<Option<M>, CommandError>
    where
        E: Into<ul_rc::Error> + core::fmt::Display,
    {
        let (raw, outcome) = {
            let Some(mut reader) =
                ScopedStorageReader::open(&mut self.channel, wait, M::STORAGE_SIZE)
                    .map_err(CommandError::PopStorage)?
            else {
                return Ok(None);
            };

            let header = reader.pop::<CommandHeader>()?;
            if header.magic() != M::MAGIC {
                return Err(CommandError::MagicMismatch {
                    direction: Direction::Request,
                    expected: M::MAGIC,
                    found: header.magic(),
                });
            }

            let raw = header.val();
            let outcome = M::from_raw(raw).map(|message| {
                log::debug!("received {message:?}");
                (message, dispatch(message, &mut reader))
            });
            (raw, outcome)
        };

        let mut writer = ScopedStorageWriter::open(&mut self.channel, M::STORAGE_SIZE)
            .map_err(CommandError::CreateStorage)?;

        match outcome {
            None => {
                log::warn!("rejecting unknown message {raw:#x}");
                writer.push(&CommandHeader::new(M::MAGIC, ul::INVALID_MESSAGE.to_raw()))?;
                writer.publish().map_err(CommandError::PushStorage)?;
                Err(CommandError::UnknownMessage(raw))
            }
            Some((message, Err(err))) => {
                log::warn!("{message:?} failed: {err}");
                let rc: ul_rc::Error = err.into();
                writer.push(&CommandHeader::new(M::MAGIC, rc.to_raw()))?;
                writer.publish().map_err(CommandError::PushStorage)?;
                Ok(Some(message))
            }
            Some((message, Ok(value))) => {
                writer.push(&CommandHeader::reply(M::MAGIC, ResultCode::SUCCESS))?;
                if let Err(err) = reply(message, value, &mut writer) {
                    // A partial payload must not go out under a success header.
                    writer.discard();
                    log::warn!("failed to write {message:?} reply: {err}");

                    let mut writer = ScopedStorageWriter::open(&mut self.channel, M::STORAGE_SIZE)
                        .map_err(CommandError::CreateStorage)?;
                    writer.push(&CommandHeader::new(M::MAGIC, err.result_code().to_raw()))?;
                    writer.publish().map_err(CommandError::PushStorage)?;
                    return Err(err);
                }
                writer.publish().map_err(CommandError::PushStorage)?;
                Ok(Some(message))
            }
        }
    }
}

/// Which half of an exchange an envelope belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// A request read by the Responder.
    Request,
    /// A reply read by the Initiator.
    Reply,
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Reply => f.write_str("reply"),
        }
    }
}

/// Error returned by [`Initiator::send`] and [`Responder::receive`].
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The channel could not allocate a storage.
    #[error("failed to create storage")]
    CreateStorage(#[source] ul_rc::Error),
    /// The channel could not publish a storage.
    #[error("failed to push storage")]
    PushStorage(#[source] ul_rc::Error),
    /// The channel could not deliver a storage.
    #[error("failed to pop storage")]
    PopStorage(#[source] ul_rc::Error),
    /// A blocking wait for the reply returned without one.
    #[error("no reply storage was received")]
    MissingReply,
    /// Reading or writing the envelope failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The envelope belongs to another channel family.
    #[error("invalid {direction} header magic {found:#010x}, expected {expected:#010x}")]
    MagicMismatch {
        direction: Direction,
        expected: u32,
        found: u32,
    },
    /// The peer answered with a failing result code.
    #[error("peer reported failure {0}")]
    Remote(ul_rc::Error),
    /// The opcode is not part of the catalog.
    #[error("unknown message {0:#x}")]
    UnknownMessage(u32),
}

impl CommandError {
    /// Returns true if a storage access ran past the buffer capacity.
    #[inline]
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_out_of_bounds())
    }
}

impl CommandError {
    /// Returns the result code reported to a peer for this error.
    pub fn result_code(&self) -> ul_rc::Error {
        match self {
            Self::CreateStorage(rc)
            | Self::PushStorage(rc)
            | Self::PopStorage(rc)
            | Self::Remote(rc) => *rc,
            Self::MissingReply => ul::NO_STORAGE_AVAILABLE,
            Self::Storage(err) => err.result_code(),
            Self::MagicMismatch {
                direction: Direction::Request,
                ..
            } => ul::INVALID_IN_HEADER_MAGIC,
            Self::MagicMismatch {
                direction: Direction::Reply,
                ..
            } => ul::INVALID_OUT_HEADER_MAGIC,
            Self::UnknownMessage(_) => ul::INVALID_MESSAGE,
        }
    }
}

impl From<CommandError> for ul_rc::Error {
    fn from(err: CommandError) -> Self {
        err.result_code()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use zerocopy::{IntoBytes, little_endian::U64};

    use super::*;
    use crate::memory::{MemoryChannel, MemoryStorage};

    const TEST_MAGIC: u32 = 0x54455354;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestMessage {
        Ping = 1,
        Echo = 2,
    }

    impl Message for TestMessage {
        const MAGIC: u32 = TEST_MAGIC;

        fn from_raw(raw: u32) -> Option<Self> {
            match raw {
                1 => Some(Self::Ping),
                2 => Some(Self::Echo),
                _ => None,
            }
        }

        fn to_raw(self) -> u32 {
            self as u32
        }
    }

    fn envelope(magic: u32, val: u32, payload: &[u8]) -> MemoryStorage {
        let mut bytes = Vec::from(CommandHeader::new(magic, val).as_bytes());
        bytes.extend_from_slice(payload);
        bytes.resize(crate::storage::COMMAND_STORAGE_SIZE, 0);
        MemoryStorage::from_bytes(bytes)
    }

    fn header_of(storage: &MemoryStorage) -> (u32, u32) {
        let bytes = storage.as_bytes();
        let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let val = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        (magic, val)
    }

    #[test]
    fn send_frames_request_and_decodes_reply() {
        let mut channel = MemoryChannel::new();
        channel.queue_inbound(envelope(TEST_MAGIC, 0, U64::new(99).as_bytes()));

        let mut initiator = Initiator::<TestMessage, _>::new(&mut channel);
        let value = initiator
            .send(
                TestMessage::Echo,
                |writer| Ok(writer.push(&U64::new(42))?),
                |reader| Ok(reader.pop::<U64>()?.get()),
            )
            .unwrap();
        assert_eq!(value, 99);

        let request = channel.take_outbound().unwrap();
        assert_eq!(header_of(&request), (TEST_MAGIC, 2));
        assert_eq!(&request.as_bytes()[8..16], &42u64.to_le_bytes());
    }

    #[test]
    fn send_rejects_foreign_reply_magic_without_reading_payload() {
        let mut channel = MemoryChannel::new();
        channel.queue_inbound(envelope(0xDEADBEEF, 0, &[]));

        let mut decoded = false;
        let err = Initiator::<TestMessage, _>::new(&mut channel)
            .send(
                TestMessage::Ping,
                |_| Ok(()),
                |_| {
                    decoded = true;
                    Ok(())
                },
            )
            .unwrap_err();

        assert!(matches!(
            err,
            CommandError::MagicMismatch {
                direction: Direction::Reply,
                expected: TEST_MAGIC,
                found: 0xDEADBEEF,
            }
        ));
        assert!(!decoded);
        assert_eq!(ul_rc::Error::from(err), ul::INVALID_OUT_HEADER_MAGIC);
    }

    #[test]
    fn send_passes_remote_failure_through() {
        let mut channel = MemoryChannel::new();
        channel.queue_inbound(envelope(TEST_MAGIC, ul::APPLICATION_ACTIVE.to_raw(), &[]));

        let mut decoded = false;
        let err = Initiator::<TestMessage, _>::new(&mut channel)
            .send(
                TestMessage::Ping,
                |_| Ok(()),
                |_| {
                    decoded = true;
                    Ok(())
                },
            )
            .unwrap_err();

        assert!(matches!(err, CommandError::Remote(rc) if rc == ul::APPLICATION_ACTIVE));
        assert!(!decoded);
    }

    #[test]
    fn send_publishes_request_even_if_encoding_fails() {
        let mut channel = MemoryChannel::new();

        let err = Initiator::<TestMessage, _>::new(&mut channel)
            .send(
                TestMessage::Echo,
                |writer| Ok(writer.push_data(&[0; crate::storage::COMMAND_STORAGE_SIZE])?),
                |_| Ok(()),
            )
            .unwrap_err();

        assert!(err.is_out_of_bounds());
        assert_eq!(channel.outbound_len(), 1);
    }

    #[test]
    fn receive_dispatches_and_replies() {
        let mut channel = MemoryChannel::new();
        channel.queue_inbound(envelope(TEST_MAGIC, 2, U64::new(5).as_bytes()));

        let mut responder = Responder::<TestMessage, _>::new(&mut channel);
        let message = responder
            .receive(
                true,
                |message, reader| {
                    assert_eq!(message, TestMessage::Echo);
                    let value = reader.pop::<U64>().map_err(ul_rc::Error::from)?.get();
                    Ok::<_, ul_rc::Error>(value * 2)
                },
                |_, value, writer| Ok(writer.push(&U64::new(value))?),
            )
            .unwrap();
        assert_eq!(message, Some(TestMessage::Echo));

        let reply = channel.take_outbound().unwrap();
        assert_eq!(header_of(&reply), (TEST_MAGIC, 0));
        assert_eq!(&reply.as_bytes()[8..16], &10u64.to_le_bytes());
    }

    #[test]
    fn receive_answers_failed_dispatch_without_payload() {
        let mut channel = MemoryChannel::new();
        channel.queue_inbound(envelope(TEST_MAGIC, 1, &[]));

        let mut replied = false;
        let message = Responder::<TestMessage, _>::new(&mut channel)
            .receive(
                false,
                |_, _| Err::<(), _>(ul::NO_ACTIVE_APPLET),
                |_, _, _| {
                    replied = true;
                    Ok(())
                },
            )
            .unwrap();

        assert_eq!(message, Some(TestMessage::Ping));
        assert!(!replied);

        let reply = channel.take_outbound().unwrap();
        assert_eq!(header_of(&reply), (TEST_MAGIC, ul::NO_ACTIVE_APPLET.to_raw()));
        assert!(reply.as_bytes()[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn receive_turns_oversized_reply_into_failure() {
        let mut channel = MemoryChannel::new();
        channel.queue_inbound(envelope(TEST_MAGIC, 2, &[]));

        let err = Responder::<TestMessage, _>::new(&mut channel)
            .receive(
                false,
                |_, _| Ok::<_, ul_rc::Error>(()),
                |_, (), writer| {
                    writer.push(&U64::new(7))?;
                    Ok(writer.push_data(&[0xAA; crate::storage::COMMAND_STORAGE_SIZE])?)
                },
            )
            .unwrap_err();

        assert!(err.is_out_of_bounds());
        assert_eq!(channel.outbound_len(), 1);
        let reply = channel.take_outbound().unwrap();
        assert_eq!(header_of(&reply), (TEST_MAGIC, ul::OUT_OF_PUSH_SPACE.to_raw()));
        assert!(reply.as_bytes()[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn receive_answers_unknown_opcode() {
        let mut channel = MemoryChannel::new();
        channel.queue_inbound(envelope(TEST_MAGIC, 77, &[]));

        let err = Responder::<TestMessage, _>::new(&mut channel)
            .receive(
                true,
                |_, _| Ok::<_, ul_rc::Error>(()),
                |_, _, _| Ok(()),
            )
            .unwrap_err();

        assert!(matches!(err, CommandError::UnknownMessage(77)));
        let reply = channel.take_outbound().unwrap();
        assert_eq!(header_of(&reply), (TEST_MAGIC, ul::INVALID_MESSAGE.to_raw()));
    }

    #[test]
    fn receive_rejects_foreign_request_magic() {
        let mut channel = MemoryChannel::new();
        channel.queue_inbound(envelope(0x444D4930, 1, &[]));

        let mut dispatched = false;
        let err = Responder::<TestMessage, _>::new(&mut channel)
            .receive(
                true,
                |_, _| {
                    dispatched = true;
                    Ok::<_, ul_rc::Error>(())
                },
                |_, _, _| Ok(()),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            CommandError::MagicMismatch {
                direction: Direction::Request,
                ..
            }
        ));
        assert!(!dispatched);
        assert_eq!(channel.outbound_len(), 0);
    }

    #[test]
    fn receive_without_pending_request_returns_none() {
        let mut channel = MemoryChannel::new();

        let message = Responder::<TestMessage, _>::new(&mut channel)
            .receive(
                false,
                |_, _| Ok::<_, ul_rc::Error>(()),
                |_, _, _| Ok(()),
            )
            .unwrap();

        assert_eq!(message, None);
        assert_eq!(channel.outbound_len(), 0);
    }
}
