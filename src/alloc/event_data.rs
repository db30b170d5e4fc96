//! Move-once owned event payloads.

use super::{AllocError, Block, EventAllocator};
use std::fmt;
use std::mem;
use std::ops::Deref;
use std::sync::Arc;

/// Outstanding block, handed back when dropped.
struct Lease {
    allocator: Arc<dyn EventAllocator>,
    block: Option<Block>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            self.allocator.release(block);
        }
    }
}

/// Payload accompanying one event delivery.
///
/// Owning an `EventData` means owning its block: passing it into a dispatch
/// moves the block with it, and dropping it releases the block exactly once.
/// State behaviors only ever see `&T`, so nothing outlives the dispatch.
pub struct EventData<T> {
    value: T,
    lease: Option<Lease>,
}

impl<T> EventData<T> {
    /// Wrap a payload that was not drawn from any allocator.
    pub fn new(value: T) -> Self {
        Self { value, lease: None }
    }

    /// Wrap a payload, charging one block of `size_of::<T>()` to `allocator`.
    pub fn allocate_in(allocator: &Arc<dyn EventAllocator>, value: T) -> Result<Self, AllocError> {
        let block = allocator.allocate(mem::size_of::<T>())?;
        Ok(Self {
            value,
            lease: Some(Lease {
                allocator: Arc::clone(allocator),
                block: Some(block),
            }),
        })
    }

    /// True if dropping this payload returns a block to an allocator.
    pub fn is_pooled(&self) -> bool {
        self.lease.is_some()
    }

    /// Take the payload out; the block is released here.
    pub fn into_inner(self) -> T {
        let Self { value, lease } = self;
        drop(lease);
        value
    }
}

impl<T> Deref for EventData<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for EventData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventData")
            .field("value", &self.value)
            .field("pooled", &self.is_pooled())
            .finish()
    }
}
