//! Fixed-block pool allocator.

use super::{AllocError, AllocStats, Block, EventAllocator};
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug)]
struct PoolState {
    free: Vec<usize>,
    in_use: Vec<bool>,
    stats: AllocStats,
}

/// Bounded pool of equally sized blocks.
///
/// Allocation pops a slot from the free list and fails with
/// [`AllocError::Exhausted`] once every slot is out. The pool tracks slot
/// ownership only; payload values themselves live inside [`super::EventData`].
#[derive(Debug)]
pub struct FixedBlockPool {
    id: Uuid,
    block_size: usize,
    capacity: usize,
    state: Mutex<PoolState>,
}

impl FixedBlockPool {
    pub fn new(block_size: usize, capacity: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            block_size,
            capacity,
            state: Mutex::new(PoolState {
                // Reversed so slot 0 is handed out first.
                free: (0..capacity).rev().collect(),
                in_use: vec![false; capacity],
                stats: AllocStats::default(),
            }),
        }
    }

    /// Id stamped on every block this pool hands out.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.lock().free.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        // A poisoned lock only means another thread panicked mid-update;
        // the counters are still usable.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventAllocator for FixedBlockPool {
    fn allocate(&self, size: usize) -> Result<Block, AllocError> {
        if size > self.block_size {
            return Err(AllocError::BlockTooSmall {
                requested: size,
                block_size: self.block_size,
            });
        }

        let mut state = self.lock();
        let slot = state.free.pop().ok_or(AllocError::Exhausted {
            capacity: self.capacity,
        })?;
        state.in_use[slot] = true;
        state.stats.allocated += 1;
        let outstanding = state.stats.outstanding();
        state.stats.peak = state.stats.peak.max(outstanding);

        Ok(Block::new(self.id, slot, size))
    }

    fn release(&self, block: Block) {
        if block.owner() != self.id {
            warn!(
                pool = %self.id,
                owner = %block.owner(),
                slot = block.slot(),
                "release of a block minted by another allocator"
            );
            return;
        }

        let mut state = self.lock();
        match state.in_use.get_mut(block.slot()) {
            Some(in_use) if *in_use => {
                *in_use = false;
                state.free.push(block.slot());
                state.stats.released += 1;
            }
            _ => {
                warn!(
                    pool = %self.id,
                    slot = block.slot(),
                    "release of a slot that is not in use"
                );
            }
        }
    }

    fn stats(&self) -> AllocStats {
        self.lock().stats
    }
}
