//! Scoped access to exchange buffers ("storages").
//!
//! A storage is a fixed-capacity byte region that moves one request or one
//! reply across a process boundary. The OS primitives used to create, publish
//! and receive storages differ per channel (a menu pushes to its own out-queue,
//! the daemon pushes into the menu's applet holder), so they are injected
//! through [`StorageChannel`].
//!
//! ```text
//!   writer side                               reader side
//!   ───────────                               ───────────
//!   create_storage(0x800)
//!   push_data(header) ─┐
//!   push_data(payload) ┤ cursor advances
//!   publish / drop ────┴── push_storage ───>  pop_storage(wait)
//!                                             pop_data(header) ─┐
//!                                             pop_data(payload) ┤ cursor advances
//!                                             drop ─────────────┴ release
//! ```
//!
//! Both cursors are bounded by the channel capacity; an access that would run
//! past it fails and leaves the cursor where it was.

use zerocopy::{FromBytes, Immutable, IntoBytes};

use ul_rc::ul;

/// Capacity of every command exchange buffer.
pub const COMMAND_STORAGE_SIZE: usize = 0x800;

/// One exchange buffer.
///
/// Dropping the value releases the underlying handle.
pub trait Storage {
    /// Returns the size of the buffer in bytes.
    fn size(&self) -> usize;

    /// Writes `data` at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> ul_rc::Result<()>;

    /// Fills `out` with the bytes at `offset`.
    fn read(&self, offset: usize, out: &mut [u8]) -> ul_rc::Result<()>;
}

/// The OS primitives that move storages in one direction pair.
pub trait StorageChannel {
    /// Storage type produced and consumed by this channel.
    type Storage: Storage;

    /// Allocates a fresh storage of `size` bytes.
    fn create_storage(&mut self, size: usize) -> ul_rc::Result<Self::Storage>;

    /// Publishes `storage` to the peer. Ownership moves with it.
    fn push_storage(&mut self, storage: Self::Storage) -> ul_rc::Result<()>;

    /// Takes the next storage published by the peer.
    ///
    /// Returns `Ok(None)` only when `wait` is false and nothing is pending.
    fn pop_storage(&mut self, wait: bool) -> ul_rc::Result<Option<Self::Storage>>;
}

impl<C: StorageChannel + ?Sized> StorageChannel for &mut C {
    type Storage = C::Storage;

    #[inline]
    fn create_storage(&mut self, size: usize) -> ul_rc::Result<Self::Storage> {
        (**self).create_storage(size)
    }

    #[inline]
    fn push_storage(&mut self, storage: Self::Storage) -> ul_rc::Result<()> {
        (**self).push_storage(storage)
    }

    #[inline]
    fn pop_storage(&mut self, wait: bool) -> ul_rc::Result<Option<Self::Storage>> {
        (**self).pop_storage(wait)
    }
}

/// Sequential writer over a freshly created storage.
///
/// The storage is published exactly once: explicitly through [`publish`], or
/// on drop if the writer goes out of scope early (for instance when an encoder
/// bails out with `?`). A drop-time publish failure can only be logged.
///
/// [`publish`]: ScopedStorageWriter::publish
pub struct ScopedStorageWriter<'a, C: StorageChannel> {
    channel: &'a mut C,
    storage: Option<C::Storage>,
    offset: usize,
    capacity: usize,
}

impl<'a, C: StorageChannel> ScopedStorageWriter<'a, C> {
    /// Creates a storage of `capacity` bytes on `channel` and opens a writer on it.
    pub fn open(channel: &'a mut C, capacity: usize) -> ul_rc::Result<Self> {
        let storage = channel.create_storage(capacity)?;

        Ok(Self {
            channel,
            storage: Some(storage),
            offset: 0,
            capacity,
        })
    }

    /// Returns the current cursor position.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the buffer capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends raw bytes at the cursor.
    pub fn push_data(&mut self, data: &[u8]) -> Result<(), StorageError> {
        let end = match self.offset.checked_add(data.len()) {
            Some(end) if end <= self.capacity => end,
            _ => {
                return Err(StorageError::OutOfPushSpace {
                    offset: self.offset,
                    size: data.len(),
                    capacity: self.capacity,
                });
            }
        };

        let storage = self
            .storage
            .as_mut()
            .ok_or(StorageError::Access(ul::NO_STORAGE_AVAILABLE))?;
        storage
            .write(self.offset, data)
            .map_err(StorageError::Access)?;

        self.offset = end;
        Ok(())
    }

    /// Appends the byte representation of `value` at the cursor.
    #[inline]
    pub fn push<T: IntoBytes + Immutable>(&mut self, value: &T) -> Result<(), StorageError> {
        self.push_data(value.as_bytes())
    }

    /// Publishes the storage to the peer and closes the writer.
    pub fn publish(mut self) -> ul_rc::Result<()> {
        match self.storage.take() {
            Some(storage) => self.channel.push_storage(storage),
            None => Ok(()),
        }
    }

    /// Releases the storage without publishing it.
    pub fn discard(mut self) {
        drop(self.storage.take());
    }
}

impl<C: StorageChannel> Drop for ScopedStorageWriter<'_, C> {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.take()
            && let Err(err) = self.channel.push_storage(storage)
        {
            log::error!("failed to publish storage on scope exit: {err}");
        }
    }
}

/// Sequential reader over a storage received from the peer.
///
/// Dropping the reader releases the storage; nothing is published.
pub struct ScopedStorageReader<S: Storage> {
    storage: S,
    offset: usize,
    capacity: usize,
}

impl<S: Storage> ScopedStorageReader<S> {
    /// Pops the next storage from `channel`, optionally blocking until one arrives.
    ///
    /// Returns `Ok(None)` if `wait` is false and nothing is pending.
    pub fn open<C>(channel: &mut C, wait: bool, capacity: usize) -> ul_rc::Result<Option<Self>>
    where
        C: StorageChannel<Storage = S> + ?Sized,
    {
        Ok(channel
            .pop_storage(wait)?
            .map(|storage| Self::new(storage, capacity)))
    }

    /// Opens a reader over an already received storage.
    #[inline]
    pub fn new(storage: S, capacity: usize) -> Self {
        Self {
            storage,
            offset: 0,
            capacity,
        }
    }

    /// Returns the current cursor position.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of bytes left before the capacity is reached.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.offset
    }

    /// Reads `out.len()` bytes at the cursor.
    pub fn pop_data(&mut self, out: &mut [u8]) -> Result<(), StorageError> {
        let end = match self.offset.checked_add(out.len()) {
            Some(end) if end <= self.capacity => end,
            _ => {
                return Err(StorageError::OutOfPopSpace {
                    offset: self.offset,
                    size: out.len(),
                    capacity: self.capacity,
                });
            }
        };

        self.storage
            .read(self.offset, out)
            .map_err(StorageError::Access)?;

        self.offset = end;
        Ok(())
    }

    /// Reads a `T` at the cursor.
    pub fn pop<T: FromBytes + IntoBytes>(&mut self) -> Result<T, StorageError> {
        let mut value = T::new_zeroed();
        self.pop_data(value.as_mut_bytes())?;
        Ok(value)
    }

    /// Consumes the reader, returning the storage.
    #[inline]
    pub fn into_inner(self) -> S {
        self.storage
    }
}

/// Error returned by scoped storage reads and writes.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The write would run past the end of the buffer.
    #[error("out of push space: {size:#x} bytes at offset {offset:#x} exceed capacity {capacity:#x}")]
    OutOfPushSpace {
        offset: usize,
        size: usize,
        capacity: usize,
    },
    /// The read would run past the end of the buffer.
    #[error("out of pop space: {size:#x} bytes at offset {offset:#x} exceed capacity {capacity:#x}")]
    OutOfPopSpace {
        offset: usize,
        size: usize,
        capacity: usize,
    },
    /// The OS rejected the access.
    #[error("storage access failed")]
    Access(#[source] ul_rc::Error),
}

impl StorageError {
    /// Returns true if the access was rejected for exceeding the buffer capacity.
    #[inline]
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            Self::OutOfPushSpace { .. } | Self::OutOfPopSpace { .. }
        )
    }
}

impl StorageError {
    /// Returns the result code reported to a peer for this error.
    pub fn result_code(&self) -> ul_rc::Error {
        match self {
            Self::OutOfPushSpace { .. } => ul::OUT_OF_PUSH_SPACE,
            Self::OutOfPopSpace { .. } => ul::OUT_OF_POP_SPACE,
            Self::Access(rc) => *rc,
        }
    }
}

impl From<StorageError> for ul_rc::Error {
    fn from(err: StorageError) -> Self {
        err.result_code()
    }
}
