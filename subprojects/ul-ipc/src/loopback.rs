//! Thread-safe in-process pipe between two channel endpoints.
//!
//! Each direction is a queue guarded by a mutex, with a condition variable so
//! that a blocking pop parks the calling thread until the peer publishes. This
//! lets a Responder loop run on one thread while an Initiator blocks on
//! another, exactly as the daemon and menu processes do.

use alloc::{collections::VecDeque, sync::Arc};
use std::sync::{Condvar, Mutex, PoisonError};

use crate::{
    memory::MemoryStorage,
    storage::StorageChannel,
};

#[derive(Default)]
struct Queue {
    storages: Mutex<VecDeque<MemoryStorage>>,
    available: Condvar,
}

impl Queue {
    fn push(&self, storage: MemoryStorage) {
        let mut storages = self.storages.lock().unwrap_or_else(PoisonError::into_inner);
        storages.push_back(storage);
        self.available.notify_one();
    }

    fn pop(&self, wait: bool) -> Option<MemoryStorage> {
        let mut storages = self.storages.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(storage) = storages.pop_front() {
                return Some(storage);
            }
            if !wait {
                return None;
            }
            storages = self
                .available
                .wait(storages)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// One end of a [`pipe`].
pub struct LoopbackEndpoint {
    outbound: Arc<Queue>,
    inbound: Arc<Queue>,
}

/// Creates two connected endpoints: what one pushes, the other pops.
pub fn pipe() -> (LoopbackEndpoint, LoopbackEndpoint) {
    let a_to_b = Arc::new(Queue::default());
    let b_to_a = Arc::new(Queue::default());

    let a = LoopbackEndpoint {
        outbound: a_to_b.clone(),
        inbound: b_to_a.clone(),
    };
    let b = LoopbackEndpoint {
        outbound: b_to_a,
        inbound: a_to_b,
    };
    (a, b)
}

impl StorageChannel for LoopbackEndpoint {
    type Storage = MemoryStorage;

    fn create_storage(&mut self, size: usize) -> ul_rc::Result<MemoryStorage> {
        Ok(MemoryStorage::new(size))
    }

    fn push_storage(&mut self, storage: MemoryStorage) -> ul_rc::Result<()> {
        self.outbound.push(storage);
        Ok(())
    }

    fn pop_storage(&mut self, wait: bool) -> ul_rc::Result<Option<MemoryStorage>> {
        Ok(self.inbound.pop(wait))
    }
}
