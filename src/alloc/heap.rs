//! Unbounded allocator backed by the global heap.

use super::{AllocError, AllocStats, Block, EventAllocator};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;
use uuid::Uuid;

/// Allocator that never runs out and only counts.
///
/// Each allocation gets a fresh slot number so blocks stay distinguishable
/// in logs.
#[derive(Debug)]
pub struct HeapAllocator {
    id: Uuid,
    allocated: AtomicUsize,
    released: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapAllocator {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            allocated: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Id stamped on every block this allocator hands out.
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl EventAllocator for HeapAllocator {
    fn allocate(&self, size: usize) -> Result<Block, AllocError> {
        let slot = self.allocated.fetch_add(1, Ordering::AcqRel);
        let outstanding = (slot + 1).saturating_sub(self.released.load(Ordering::Acquire));
        self.peak.fetch_max(outstanding, Ordering::AcqRel);
        Ok(Block::new(self.id, slot, size))
    }

    fn release(&self, block: Block) {
        if block.owner() != self.id {
            warn!(
                heap = %self.id,
                owner = %block.owner(),
                slot = block.slot(),
                "release of a block minted by another allocator"
            );
            return;
        }
        self.released.fetch_add(1, Ordering::AcqRel);
    }

    fn stats(&self) -> AllocStats {
        // Every counted release follows its allocation, so reading `released`
        // first keeps the snapshot at `released <= allocated`.
        let released = self.released.load(Ordering::Acquire);
        let allocated = self.allocated.load(Ordering::Acquire);
        AllocStats {
            allocated,
            released,
            peak: self.peak.load(Ordering::Acquire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::FixedBlockPool;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counts_allocations_and_releases() {
        let heap = HeapAllocator::new();

        let a = heap.allocate(1024).unwrap();
        let b = heap.allocate(4).unwrap();
        assert_eq!(heap.stats().outstanding(), 2);

        heap.release(a);
        heap.release(b);

        let stats = heap.stats();
        assert_eq!(stats.allocated, 2);
        assert_eq!(stats.peak, 2);
        assert!(stats.is_balanced());
    }

    #[test]
    fn foreign_block_is_not_counted() {
        let heap = HeapAllocator::new();
        let pool = FixedBlockPool::new(8, 1);

        heap.release(pool.allocate(8).unwrap());

        let stats = heap.stats();
        assert_eq!(stats.released, 0);
        assert_eq!(stats.outstanding(), 0);
        assert!(stats.is_balanced());
    }

    #[test]
    fn snapshots_never_show_more_releases_than_allocations() {
        let heap = Arc::new(HeapAllocator::new());
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let heap = Arc::clone(&heap);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        let block = heap.allocate(8).unwrap();
                        heap.release(block);
                    }
                })
            })
            .collect();

        for _ in 0..1_000 {
            let stats = heap.stats();
            assert!(stats.released <= stats.allocated, "{stats:?}");
        }
        for worker in workers {
            worker.join().unwrap();
        }

        let stats = heap.stats();
        assert_eq!(stats.allocated, 4_000);
        assert!(stats.is_balanced());
    }
}
