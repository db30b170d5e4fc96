//! Event-data allocation.
//!
//! Event data travels from the caller into exactly one dispatch and is then
//! released. Allocation is abstracted behind [`EventAllocator`] so a machine
//! can draw its payloads from a bounded [`FixedBlockPool`] or from the
//! [`HeapAllocator`]. [`EventData`] owns the lease on its block and gives it
//! back exactly once when dropped, whichever dispatch path consumed it.
//!
//! # Example
//!
//! ```rust
//! use statemap::alloc::{EventAllocator, EventData, FixedBlockPool};
//! use std::sync::Arc;
//!
//! let pool: Arc<dyn EventAllocator> = Arc::new(FixedBlockPool::new(16, 2));
//!
//! let first = EventData::allocate_in(&pool, 100u32).unwrap();
//! let second = EventData::allocate_in(&pool, 200u32).unwrap();
//! assert!(EventData::allocate_in(&pool, 300u32).is_err());
//!
//! drop(first);
//! drop(second);
//! assert!(pool.stats().is_balanced());
//! ```

mod event_data;
mod heap;
mod pool;

pub use event_data::EventData;
pub use heap::HeapAllocator;
pub use pool::FixedBlockPool;

use thiserror::Error;
use uuid::Uuid;

/// Errors reported to the caller requesting event-data memory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllocError {
    #[error("No free block available (capacity: {capacity})")]
    Exhausted { capacity: usize },

    #[error("Requested {requested} bytes exceeds block size {block_size}")]
    BlockTooSmall { requested: usize, block_size: usize },
}

/// Handle to one allocated block.
///
/// Deliberately neither `Clone` nor `Copy`: `release` consumes it, so a block
/// can only be handed back once. Each block carries the id of the allocator
/// that minted it; allocators refuse blocks stamped by anyone else.
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
    owner: Uuid,
    slot: usize,
    size: usize,
}

impl Block {
    pub(crate) fn new(owner: Uuid, slot: usize, size: usize) -> Self {
        Self { owner, slot, size }
    }

    /// Id of the allocator this block came from.
    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Size requested when the block was allocated.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Allocation counters used for balance checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    pub allocated: usize,
    pub released: usize,
    /// Highest number of simultaneously outstanding blocks.
    pub peak: usize,
}

impl AllocStats {
    pub fn outstanding(&self) -> usize {
        self.allocated.saturating_sub(self.released)
    }

    /// True when every successful allocation has been released.
    pub fn is_balanced(&self) -> bool {
        self.allocated == self.released
    }
}

/// Source of blocks for event data.
pub trait EventAllocator: Send + Sync {
    /// Obtain a block of at least `size` bytes.
    fn allocate(&self, size: usize) -> Result<Block, AllocError>;

    /// Give a block back.
    ///
    /// Blocks minted by another allocator are logged and ignored.
    fn release(&self, block: Block);

    fn stats(&self) -> AllocStats;
}
