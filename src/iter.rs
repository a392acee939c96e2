use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Add, Range, Sub};

use crate::block::Block;
use crate::core::Deque;

/// Random-access cursor over the elements of a `Deque`.
///
/// The position is a block delta (`offset`) from the table pivot plus an
/// `index` inside that block. The cursor may move anywhere; it only yields
/// elements while it points into the live range. Borrowing the deque keeps
/// the block table from being resized while the cursor exists.
pub struct Cursor<'a, T, const C: usize> {
    blocks: &'a [Block<T, C>],
    pivot: usize,
    offset: isize,
    index: isize,
    live: Range<isize>,
}

#[allow(clippy::cast_possible_wrap)]
const fn signed<const C: usize>() -> isize {
    C as isize
}

impl<'a, T, const C: usize> Cursor<'a, T, C> {
    /// `position` and `live` are linear slot positions relative to the first slot of the pivot block.
    pub(crate) fn new(blocks: &'a [Block<T, C>], pivot: usize, position: isize, live: Range<isize>) -> Self {
        Self {
            blocks,
            pivot,
            offset: position.div_euclid(signed::<C>()),
            index: position.rem_euclid(signed::<C>()),
            live,
        }
    }

    fn position(&self) -> isize {
        self.offset * signed::<C>() + self.index
    }

    /// Moves the cursor by `n` elements; negative `n` moves towards the front.
    pub fn advance(&mut self, n: isize) {
        self.index += n;
        if !(0..signed::<C>()).contains(&self.index) {
            self.offset += self.index.div_euclid(signed::<C>());
            self.index = self.index.rem_euclid(signed::<C>());
        }
    }

    pub fn move_next(&mut self) {
        self.advance(1);
    }

    pub fn move_prev(&mut self) {
        self.advance(-1);
    }

    /// Block delta from the table pivot.
    #[must_use]
    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Slot inside the current block.
    #[must_use]
    pub fn index(&self) -> isize {
        self.index
    }

    /// Logical index of the element under the cursor, `None` outside the live range.
    #[must_use]
    pub fn logical_index(&self) -> Option<usize> {
        let position = self.position();
        if self.live.contains(&position) {
            usize::try_from(position - self.live.start).ok()
        } else {
            None
        }
    }

    /// Signed number of elements from `self` to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> isize {
        other.position() - self.position()
    }

    /// Element at `(pivot + offset, index)`, `None` outside the live range.
    #[must_use]
    #[allow(unsafe_code, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn get(&self) -> Option<&'a T> {
        if !self.live.contains(&self.position()) {
            return None;
        }
        let block = usize::try_from(self.pivot as isize + self.offset).ok()?;
        let blocks: &'a [Block<T, C>] = self.blocks;
        // Safe: positions inside the live range map to initialized slots, and `index` is in `[0, C)`
        Some(unsafe { blocks.get(block)?.get(self.index as usize) })
    }
}

impl<T, const C: usize> Clone for Cursor<'_, T, C> {
    fn clone(&self) -> Self {
        Self {
            blocks: self.blocks,
            pivot: self.pivot,
            offset: self.offset,
            index: self.index,
            live: self.live.clone(),
        }
    }
}

impl<T, const C: usize> PartialEq for Cursor<'_, T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.index == other.index
    }
}

impl<T, const C: usize> Eq for Cursor<'_, T, C> {}

impl<T, const C: usize> Add<isize> for Cursor<'_, T, C> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self.advance(n);
        self
    }
}

impl<T, const C: usize> Sub<isize> for Cursor<'_, T, C> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self.advance(-n);
        self
    }
}

impl<T, const C: usize> fmt::Debug for Cursor<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.offset)
            .field("index", &self.index)
            .finish()
    }
}

/// Iterator over the elements of a `Deque`, front to back.
///
/// This iterator implements `Clone`.
pub struct Iter<'a, T, const C: usize> {
    front: Cursor<'a, T, C>,
    back: Cursor<'a, T, C>,
}

impl<T, const C: usize> Clone for Iter<'_, T, C> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
        }
    }
}

impl<'a, T, const C: usize> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let result = self.front.get();
        self.front.move_next();
        result
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.front.distance(&self.back)).unwrap_or(0);
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let remaining = self.len();
        if n >= remaining {
            self.front = self.back.clone();
            return None;
        }
        // n < remaining, which fits in isize
        #[allow(clippy::cast_possible_wrap)]
        self.front.advance(n as isize);
        self.next()
    }
}

impl<T, const C: usize> DoubleEndedIterator for Iter<'_, T, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back.move_prev();
        self.back.get()
    }
}

impl<T, const C: usize> ExactSizeIterator for Iter<'_, T, C> {}

impl<T, const C: usize> FusedIterator for Iter<'_, T, C> {}

impl<'a, T, const C: usize> IntoIterator for &'a Deque<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            front: self.begin(),
            back: self.end(),
        }
    }
}
