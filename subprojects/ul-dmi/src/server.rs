//! Daemon side of the daemon↔menu channel.

use ul_ipc::{CommandError, Responder, StorageChannel};

use crate::{
    command::{DaemonCommand, DaemonReply, DecodeError},
    proto::DaemonMessage,
};

/// Receives one menu command, hands it to `handler` and answers with its outcome.
///
/// A command that cannot be decoded is answered with its decode error and never
/// reaches `handler`. Returns `Ok(None)` if `wait` is false and the menu sent
/// nothing.
pub fn receive_command<C, E>(
    responder: &mut Responder<DaemonMessage, C>,
    wait: bool,
    handler: impl FnOnce(DaemonCommand) -> Result<DaemonReply, E>,
) -> Result<Option<DaemonMessage>, CommandError>
where
    C: StorageChannel,
    E: core::error::Error + Into<ul_rc::Error>,
{
    responder.receive(
        wait,
        |message, reader| {
            let command = DaemonCommand::decode(message, reader).map_err(DispatchError::Decode)?;
            handler(command).map_err(DispatchError::Handler)
        },
        |_, reply, writer| Ok(reply.encode(writer)?),
    )
}

/// Failure of a received command, answered to the menu as a result code.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError<E> {
    #[error("failed to decode command")]
    Decode(#[source] DecodeError),
    #[error(transparent)]
    Handler(E),
}

impl<E: Into<ul_rc::Error>> From<DispatchError<E>> for ul_rc::Error {
    fn from(err: DispatchError<E>) -> Self {
        match err {
            DispatchError::Decode(err) => err.into(),
            DispatchError::Handler(err) => err.into(),
        }
    }
}
