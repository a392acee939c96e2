use core::fmt;
use core::mem;
use core::ops::{Index, IndexMut, Range};

use crate::block::BlockTable;
use crate::error::DequeError;
use crate::iter::{Cursor, Iter};

/// Number of slots per block unless the deque type says otherwise
pub const DEFAULT_BLOCK_CAPACITY: usize = 64;

/// A double-ended queue stored in individually allocated blocks of `C` slots.
///
/// The occupied range is marked by two exclusive cursors: the front cursor
/// is the free slot the next `push_front` writes, the back cursor is the
/// free slot the next `push_back` writes.
pub struct Deque<T, const C: usize = DEFAULT_BLOCK_CAPACITY> {
    table: BlockTable<T, C>,
    first_storage: usize,
    current_first: usize,
    last_storage: usize,
    current_last: usize,
    len: usize,
}

/// Physical (block, slot) of logical `index` given the front cursor.
fn locate<const C: usize>(first_storage: usize, current_first: usize, index: usize) -> (usize, usize) {
    let linear = current_first + 1 + index;
    (first_storage + linear / C, linear % C)
}

impl<T, const C: usize> Deque<T, C> {
    /// Creates an empty deque with two pre-allocated blocks.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::InvalidConfiguration` if the block capacity `C` is 0,
    /// or `DequeError::AllocationFailed` if the initial blocks cannot be allocated.
    pub fn new() -> Result<Self, DequeError> {
        if C == 0 {
            return Err(DequeError::InvalidConfiguration {
                parameter: "block capacity",
                value: C,
            });
        }

        let table = BlockTable::new()?;
        let mut deque = Self {
            table,
            first_storage: 0,
            current_first: 0,
            last_storage: 0,
            current_last: 0,
            len: 0,
        };
        deque.reset_cursors();
        Ok(deque)
    }

    /// Creates a deque holding clones of `source`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first error from `new` or `push_back`.
    pub fn from_slice(source: &[T]) -> Result<Self, DequeError>
    where
        T: Clone,
    {
        let mut deque = Self::new()?;
        for value in source {
            deque.push_back(value.clone())?;
        }
        Ok(deque)
    }

    /// Places both cursors around the middle of the pivot block.
    fn reset_cursors(&mut self) {
        let last = ((C - 1) / 2).max(1);
        let first = last - 1;
        let pivot = self.table.pivot();
        self.first_storage = pivot + first / C;
        self.current_first = first % C;
        self.last_storage = pivot + last / C;
        self.current_last = last % C;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of slots across all blocks, occupied or not.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.table.len() * C
    }

    /// Number of blocks currently owned by the deque.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn pivot(&self) -> usize {
        self.table.pivot()
    }

    fn grow(&mut self) -> Result<(), DequeError> {
        let (first, last) = self.table.resize(self.first_storage, self.last_storage)?;
        self.first_storage = first;
        self.last_storage = last;
        Ok(())
    }

    /// Appends an element to the back of the deque.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if the block table has to grow
    /// and memory cannot be obtained. The deque is unchanged in that case.
    pub fn push_back(&mut self, value: T) -> Result<(), DequeError> {
        if self.current_last + 1 == C && self.last_storage + 1 == self.table.len() {
            self.grow()?;
        }

        self.table
            .block_mut(self.last_storage)
            .write(self.current_last, value);
        self.len += 1;

        self.current_last += 1;
        if self.current_last == C {
            self.current_last = 0;
            self.last_storage += 1;
        }
        Ok(())
    }

    /// Prepends an element to the front of the deque.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if the block table has to grow
    /// and memory cannot be obtained. The deque is unchanged in that case.
    pub fn push_front(&mut self, value: T) -> Result<(), DequeError> {
        if self.current_first == 0 && self.first_storage == 0 {
            self.grow()?;
        }

        self.table
            .block_mut(self.first_storage)
            .write(self.current_first, value);
        self.len += 1;

        if self.current_first == 0 {
            self.current_first = C - 1;
            self.first_storage -= 1;
        } else {
            self.current_first -= 1;
        }
        Ok(())
    }

    /// Removes and returns the last element.
    ///
    /// Returns `None` if the deque is empty. The slot keeps its bytes until
    /// the next push overwrites it.
    #[allow(unsafe_code)]
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        if self.current_last == 0 {
            self.current_last = C - 1;
            self.last_storage -= 1;
        } else {
            self.current_last -= 1;
        }
        self.len -= 1;

        // Safe: the slot held the last live element and is outside the live range now
        Some(unsafe { self.table.block(self.last_storage).read(self.current_last) })
    }

    /// Removes and returns the first element.
    ///
    /// Returns `None` if the deque is empty. The slot keeps its bytes until
    /// the next push overwrites it.
    #[allow(unsafe_code)]
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.current_first += 1;
        if self.current_first == C {
            self.current_first = 0;
            self.first_storage += 1;
        }
        self.len -= 1;

        // Safe: the slot held the first live element and is outside the live range now
        Some(unsafe { self.table.block(self.first_storage).read(self.current_first) })
    }

    /// Drops every element and recenters the cursors. Blocks are kept.
    #[allow(unsafe_code)]
    pub fn clear(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        let (first_storage, current_first) = (self.first_storage, self.current_first);
        self.reset_cursors();

        if mem::needs_drop::<T>() {
            for index in 0..len {
                let (block, slot) = locate::<C>(first_storage, current_first, index);
                // Safe: every slot in the old live range is initialized and visited once
                unsafe { self.table.block_mut(block).drop_in_place(slot) };
            }
        }
    }

    fn locate(&self, index: usize) -> (usize, usize) {
        locate::<C>(self.first_storage, self.current_first, index)
    }

    /// Returns a reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[allow(unsafe_code)]
    #[must_use]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        let (block, slot) = self.locate(index);
        self.table.block(block).get(slot)
    }

    /// Returns a mutable reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[allow(unsafe_code)]
    #[must_use]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        let (block, slot) = self.locate(index);
        self.table.block_mut(block).get_mut(slot)
    }

    /// Returns `None` if the index is out of bounds.
    #[allow(unsafe_code)]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        // Safe: bounds checked above
        Some(unsafe { self.get_unchecked(index) })
    }

    #[allow(unsafe_code)]
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        // Safe: bounds checked above
        Some(unsafe { self.get_unchecked_mut(index) })
    }

    /// Checked element access.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if `index` is not less than `len()`.
    pub fn at(&self, index: usize) -> Result<&T, DequeError> {
        self.get(index).ok_or(DequeError::IndexOutOfBounds {
            index,
            length: self.len,
        })
    }

    /// Returns the first element.
    ///
    /// # Panics
    ///
    /// Panics if the deque is empty.
    #[must_use]
    pub fn front(&self) -> &T {
        assert!(!self.is_empty(), "front() called on empty deque");
        &self[0]
    }

    /// Returns the last element.
    ///
    /// # Panics
    ///
    /// Panics if the deque is empty.
    #[must_use]
    pub fn back(&self) -> &T {
        assert!(!self.is_empty(), "back() called on empty deque");
        &self[self.len - 1]
    }

    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if the deque is empty.
    pub fn try_front(&self) -> Result<&T, DequeError> {
        self.get(0).ok_or(DequeError::EmptyDeque)
    }

    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if the deque is empty.
    pub fn try_back(&self) -> Result<&T, DequeError> {
        let last = self.len.checked_sub(1).ok_or(DequeError::EmptyDeque)?;
        self.get(last).ok_or(DequeError::EmptyDeque)
    }

    #[must_use]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    #[must_use]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let last = self.len.checked_sub(1)?;
        self.get_mut(last)
    }

    /// Linear position of physical (block, slot) relative to the pivot block.
    #[allow(clippy::cast_possible_wrap)]
    fn linear(&self, block: usize, slot: usize) -> isize {
        (block as isize - self.table.pivot() as isize) * C as isize + slot as isize
    }

    /// Linear positions of the first element and one past the last.
    fn live_range(&self) -> Range<isize> {
        let start = self.linear(self.first_storage, self.current_first) + 1;
        start..self.linear(self.last_storage, self.current_last)
    }

    /// Returns a cursor at the first element.
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, T, C> {
        let live = self.live_range();
        Cursor::new(self.table.blocks(), self.table.pivot(), live.start, live)
    }

    /// Returns a cursor one past the last element.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, T, C> {
        let live = self.live_range();
        Cursor::new(self.table.blocks(), self.table.pivot(), live.end, live)
    }

    /// Returns an iterator over the elements, front to back.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, C> {
        self.into_iter()
    }

    /// Writes every block of the table, one line each, to `out`.
    ///
    /// Live slots show their value, free slots show `.`. The rows holding
    /// the front and back cursors are marked `<` and `>`.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by `out`.
    #[cfg(feature = "display")]
    #[allow(unsafe_code)]
    pub fn dump<W: fmt::Write>(&self, out: &mut W) -> fmt::Result
    where
        T: fmt::Debug,
    {
        writeln!(
            out,
            "len={} capacity={} blocks={} pivot={}",
            self.len,
            self.capacity(),
            self.table.len(),
            self.table.pivot()
        )?;

        let front = self.live_range().start;
        for block in 0..self.table.len() {
            let front_mark = if block == self.first_storage { '<' } else { ' ' };
            let back_mark = if block == self.last_storage { '>' } else { ' ' };
            write!(out, "{block:>4}{front_mark}{back_mark}|")?;
            for slot in 0..C {
                let index = usize::try_from(self.linear(block, slot) - front)
                    .ok()
                    .filter(|index| *index < self.len);
                match index {
                    // Safe: filtered to the live range
                    Some(index) => write!(out, " {:?}", unsafe { self.get_unchecked(index) })?,
                    None => write!(out, " .")?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl<T, const C: usize> Drop for Deque<T, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, const C: usize> Index<usize> for Deque<T, C> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!(
                "Index {} out of bounds for deque of length {}",
                index, self.len
            ),
        }
    }
}

impl<T, const C: usize> IndexMut<usize> for Deque<T, C> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("Index {index} out of bounds for deque of length {len}"),
        }
    }
}

impl<T: fmt::Debug, const C: usize> fmt::Debug for Deque<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
