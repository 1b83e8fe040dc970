//! System side of the menu↔system channel.

use ul_ipc::{CommandError, Responder, StorageChannel};

use crate::{
    command::{DecodeError, SystemCommand},
    proto::SystemMessage,
};

/// Receives one menu command and answers with the outcome of `handler`.
///
/// Returns `Ok(None)` if `wait` is false and the menu sent nothing.
pub fn receive_command<C, E>(
    responder: &mut Responder<SystemMessage, C>,
    wait: bool,
    handler: impl FnOnce(SystemCommand) -> Result<(), E>,
) -> Result<Option<SystemMessage>, CommandError>
where
    C: StorageChannel,
    E: core::error::Error + Into<ul_rc::Error>,
{
    responder.receive(
        wait,
        |message, reader| {
            let command = SystemCommand::decode(message, reader).map_err(DispatchError::Decode)?;
            handler(command).map_err(DispatchError::Handler)
        },
        |_, (), _| Ok(()),
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
