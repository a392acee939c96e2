use alloc::alloc::{alloc, Layout};
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use crate::error::DequeError;

/// Number of blocks a fresh table starts with
const INITIAL_BLOCKS: usize = 2;

/// A fixed-capacity chunk of `C` uninitialized slots.
///
/// The block never tracks which of its slots hold a value: that is the job
/// of the owning deque's cursors. Dropping a block releases its memory but
/// never drops slot contents.
pub(crate) struct Block<T, const C: usize> {
    slots: Box<[MaybeUninit<T>; C]>,
}

impl<T, const C: usize> Block<T, C> {
    /// Obtains a block straight from the global allocator.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if the allocator returns null.
    #[allow(unsafe_code)]
    pub(crate) fn allocate() -> Result<Self, DequeError> {
        let layout = Layout::new::<[MaybeUninit<T>; C]>();
        if layout.size() == 0 {
            // Safe: a dangling, well-aligned pointer is a valid box for a zero-sized value
            let slots = unsafe { Box::from_raw(NonNull::dangling().as_ptr()) };
            return Ok(Self { slots });
        }

        // Safe: the layout has a non-zero size
        let ptr = unsafe { alloc(layout) }.cast::<[MaybeUninit<T>; C]>();
        if ptr.is_null() {
            return Err(DequeError::AllocationFailed { blocks: 1 });
        }

        // Safe: `ptr` came from the global allocator with the layout of the boxed type,
        // and an array of `MaybeUninit` needs no initialization
        let slots = unsafe { Box::from_raw(ptr) };
        Ok(Self { slots })
    }

    /// Stores `value` at `slot`. Whatever the slot held before is forgotten, not dropped.
    #[allow(clippy::indexing_slicing)]
    pub(crate) fn write(&mut self, slot: usize, value: T) {
        self.slots[slot].write(value);
    }

    /// Moves the value out of `slot`, leaving the bytes in place.
    ///
    /// # Safety
    ///
    /// The slot must be initialized, and the caller must treat it as
    /// uninitialized afterwards.
    #[allow(unsafe_code, clippy::indexing_slicing)]
    pub(crate) unsafe fn read(&self, slot: usize) -> T {
        self.slots[slot].assume_init_read()
    }

    /// # Safety
    ///
    /// The slot must be initialized.
    #[allow(unsafe_code, clippy::indexing_slicing)]
    pub(crate) unsafe fn get(&self, slot: usize) -> &T {
        self.slots[slot].assume_init_ref()
    }

    /// # Safety
    ///
    /// The slot must be initialized.
    #[allow(unsafe_code, clippy::indexing_slicing)]
    pub(crate) unsafe fn get_mut(&mut self, slot: usize) -> &mut T {
        self.slots[slot].assume_init_mut()
    }

    /// Drops the value in `slot` in place.
    ///
    /// # Safety
    ///
    /// The slot must be initialized, and the caller must treat it as
    /// uninitialized afterwards.
    #[allow(unsafe_code, clippy::indexing_slicing)]
    pub(crate) unsafe fn drop_in_place(&mut self, slot: usize) {
        self.slots[slot].assume_init_drop();
    }

    #[cfg(test)]
    fn as_ptr(&self) -> *const MaybeUninit<T> {
        self.slots.as_ptr()
    }
}

/// Ordered sequence of owned blocks addressed around a pivot.
///
/// Growth doubles the table and relinks the blocks that hold data; the
/// elements themselves never move.
pub(crate) struct BlockTable<T, const C: usize> {
    blocks: Vec<Block<T, C>>,
    pivot: usize,
}

impl<T, const C: usize> BlockTable<T, C> {
    /// Creates a table of two freshly allocated blocks with the pivot at index 0.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if any block cannot be allocated.
    pub(crate) fn new() -> Result<Self, DequeError> {
        let blocks = allocate_blocks(INITIAL_BLOCKS)?;
        Ok(Self { blocks, pivot: 0 })
    }

    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }

    pub(crate) fn pivot(&self) -> usize {
        self.pivot
    }

    pub(crate) fn blocks(&self) -> &[Block<T, C>] {
        &self.blocks
    }

    #[allow(clippy::indexing_slicing)]
    pub(crate) fn block(&self, index: usize) -> &Block<T, C> {
        &self.blocks[index]
    }

    #[allow(clippy::indexing_slicing)]
    pub(crate) fn block_mut(&mut self, index: usize) -> &mut Block<T, C> {
        &mut self.blocks[index]
    }

    /// Doubles the table, keeping blocks `first..=last` at the same
    /// pivot-relative offsets around the new midpoint pivot.
    ///
    /// Spare blocks outside `first..=last` are freed; every position outside
    /// the relinked range gets a fresh block. All fresh memory is obtained
    /// before anything is relinked, so on failure the table is untouched.
    ///
    /// Returns the new indices of `first` and `last`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if the new table or any fresh
    /// block cannot be allocated.
    pub(crate) fn resize(&mut self, first: usize, last: usize) -> Result<(usize, usize), DequeError> {
        debug_assert!(first <= last && last < self.blocks.len());

        let old_len = self.blocks.len();
        let new_len = old_len
            .checked_mul(2)
            .ok_or(DequeError::AllocationFailed { blocks: old_len })?;
        let new_pivot = new_len / 2 - 1;

        // The pivot never passes the old midpoint, so neither index leaves the new table
        let occupied = last - first + 1;
        let new_first = new_pivot + first - self.pivot;
        let new_last = new_first + occupied - 1;
        debug_assert!(new_last < new_len);

        let fresh = allocate_blocks(new_len - occupied)?;
        let mut table = Vec::new();
        table
            .try_reserve_exact(new_len)
            .map_err(|_| DequeError::AllocationFailed { blocks: new_len })?;

        let mut fresh = fresh.into_iter();
        let old = core::mem::take(&mut self.blocks);
        table.extend(fresh.by_ref().take(new_first));
        table.extend(old.into_iter().skip(first).take(occupied));
        table.extend(fresh);

        self.blocks = table;
        self.pivot = new_pivot;
        Ok((new_first, new_last))
    }
}

/// Allocates `count` blocks, releasing the ones already obtained if any allocation fails.
///
/// A failure reports the batch size `count`, whichever block in the batch failed.
fn allocate_blocks<T, const C: usize>(count: usize) -> Result<Vec<Block<T, C>>, DequeError> {
    let mut blocks = Vec::new();
    blocks
        .try_reserve_exact(count)
        .map_err(|_| DequeError::AllocationFailed { blocks: count })?;
    for _ in 0..count {
        let block = Block::allocate().map_err(|error| match error {
            DequeError::AllocationFailed { .. } => DequeError::AllocationFailed { blocks: count },
            other => other,
        })?;
        blocks.push(block);
    }
    Ok(blocks)
}
