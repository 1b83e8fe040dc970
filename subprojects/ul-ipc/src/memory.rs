//! Heap-backed storages and a single-threaded channel over them.
//!
//! [`MemoryChannel`] never blocks: a waiting pop on an empty inbound queue
//! fails with [`ul::NO_STORAGE_AVAILABLE`] instead. It is meant for scripting
//! one side of a conversation; for two live peers see the `loopback` module
//! (feature `std`).

use alloc::{collections::VecDeque, vec, vec::Vec};

use ul_rc::ul;

use crate::storage::{Storage, StorageChannel};

/// Storage backed by a heap buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStorage {
    data: Vec<u8>,
}

impl MemoryStorage {
    /// Creates a zero-filled storage of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    /// Wraps existing bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the full buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the storage, returning its bytes.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl Storage for MemoryStorage {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> ul_rc::Result<()> {
        let dst = offset
            .checked_add(data.len())
            .and_then(|end| self.data.get_mut(offset..end))
            .ok_or(ul::INVALID_ARGUMENT)?;
        dst.copy_from_slice(data);
        Ok(())
    }

    fn read(&self, offset: usize, out: &mut [u8]) -> ul_rc::Result<()> {
        let src = offset
            .checked_add(out.len())
            .and_then(|end| self.data.get(offset..end))
            .ok_or(ul::INVALID_ARGUMENT)?;
        out.copy_from_slice(src);
        Ok(())
    }
}

/// Channel whose two directions are plain in-memory queues.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    outbound: VecDeque<MemoryStorage>,
    inbound: VecDeque<MemoryStorage>,
}

impl MemoryChannel {
    /// Creates a channel with both queues empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a storage for the next pop, as if the peer had published it.
    pub fn queue_inbound(&mut self, storage: MemoryStorage) {
        self.inbound.push_back(storage);
    }

    /// Takes the oldest storage published through this channel.
    pub fn take_outbound(&mut self) -> Option<MemoryStorage> {
        self.outbound.pop_front()
    }

    /// Returns the number of published storages not yet taken.
    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    /// Returns the number of queued storages not yet popped.
    pub fn inbound_len(&self) -> usize {
        self.inbound.len()
    }
}

impl StorageChannel for MemoryChannel {
    type Storage = MemoryStorage;

    fn create_storage(&mut self, size: usize) -> ul_rc::Result<MemoryStorage> {
        Ok(MemoryStorage::new(size))
    }

    fn push_storage(&mut self, storage: MemoryStorage) -> ul_rc::Result<()> {
        self.outbound.push_back(storage);
        Ok(())
    }

    fn pop_storage(&mut self, wait: bool) -> ul_rc::Result<Option<MemoryStorage>> {
        match self.inbound.pop_front() {
            Some(storage) => Ok(Some(storage)),
            // Nobody else can ever fill the queue while we wait.
            None if wait => Err(ul::NO_STORAGE_AVAILABLE),
            None => Ok(None),
        }
    }
}
