use core::fmt;
use core::mem::MaybeUninit;
use core::ptr;

use crate::{add_mod, slice_assume_init_mut, slice_assume_init_ref};

/// Slot storage shared by all the buffer kinds.
///
/// `items` is allocated once and never resized. Only the `size` slots starting at `start`
/// (wrapping around the end of `items`) are initialized; logical index `i` lives at physical
/// index `(start + i) % capacity`.
pub(crate) struct Backend<T> {
    pub(crate) size: usize,
    pub(crate) start: usize,
    pub(crate) items: Box<[MaybeUninit<T>]>,
}

impl<T> Backend<T> {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        debug_assert!(cap > 0, "zero capacity");
        let items = (0..cap).map(|_| MaybeUninit::uninit()).collect();
        Self { size: 0, start: 0, items }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    /// Maps a logical index to the physical slot holding it.
    #[inline]
    pub(crate) fn physical_index(&self, index: usize) -> usize {
        debug_assert!(index < self.capacity(), "index out-of-bounds");
        debug_assert!(self.start < self.capacity(), "start out-of-bounds");
        add_mod(self.start, index, self.capacity())
    }

    #[inline]
    pub(crate) fn as_slices(&self) -> (&[T], &[T]) {
        if self.size == 0 {
            return (&[], &[]);
        }

        debug_assert!(self.start < self.capacity(), "start out-of-bounds");
        debug_assert!(self.size <= self.capacity(), "size out-of-bounds");

        let start = self.start;
        let end = add_mod(self.start, self.size, self.capacity());

        let (front, back) = if start < end {
            (&self.items[start..end], &[][..])
        } else {
            let (back, front) = self.items.split_at(start);
            (front, &back[..end])
        };

        // SAFETY: The elements in these slices are guaranteed to be initialized
        unsafe {
            (slice_assume_init_ref(front), slice_assume_init_ref(back))
        }
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size {
            return None;
        }
        let index = self.physical_index(index);
        // SAFETY: `index` is in a valid range; it is guaranteed to point to an initialized element
        Some(unsafe { self.items[index].assume_init_ref() })
    }

    #[inline]
    pub(crate) fn front(&self) -> Option<&T> {
        self.get(0)
    }

    #[inline]
    pub(crate) fn back(&self) -> Option<&T> {
        self.size.checked_sub(1).and_then(|index| self.get(index))
    }

    /// Appends `item`, overwriting the front element if the buffer is full.
    ///
    /// Returns `true` if an element was evicted.
    pub(crate) fn push_back(&mut self, item: T) -> bool {
        if self.size >= self.capacity() {
            // At capacity; the front slot becomes the new back slot
            let slot = &mut self.items[self.start];
            // SAFETY: the buffer is full, so the front slot is initialized
            let evicted = unsafe { slot.assume_init_read() };
            slot.write(item);
            self.inc_start();
            // Dropped only once the slot holds the new item
            drop(evicted);
            true
        } else {
            // Some uninitialized slots left; append at the end
            self.inc_size();
            let back = self.physical_index(self.size - 1);
            self.items[back].write(item);
            false
        }
    }

    pub(crate) fn clear(&mut self) {
        // Drops all the items in the slice when dropped. This is needed to ensure that all
        // elements are dropped in case a panic occurs during the drop of a single element.
        struct Dropper<'a, T>(&'a mut [MaybeUninit<T>]);

        impl<'a, T> Drop for Dropper<'a, T> {
            #[inline]
            fn drop(&mut self) {
                // SAFETY: only initialized slots are ever wrapped in a `Dropper`
                unsafe { ptr::drop_in_place(slice_assume_init_mut(self.0)); }
            }
        }

        let start = self.start;
        let size = self.size;
        // Reset first, so that no element is dropped twice if a destructor panics
        self.start = 0;
        self.size = 0;

        if size == 0 {
            return;
        }

        let end = add_mod(start, size, self.capacity());
        let (front, back) = if start < end {
            (&mut self.items[start..end], &mut [][..])
        } else {
            let (back, front) = self.items.split_at_mut(start);
            (front, &mut back[..end])
        };

        let _back = Dropper(back);
        let _front = Dropper(front);
    }

    #[inline]
    fn inc_start(&mut self) {
        debug_assert!(self.start < self.capacity(), "start out-of-bounds");
        self.start = add_mod(self.start, 1, self.capacity());
    }

    #[inline]
    fn inc_size(&mut self) {
        debug_assert!(self.size < self.capacity(), "size at capacity limit");
        self.size += 1;
    }
}

impl<T: Clone> Backend<T> {
    #[must_use]
    pub(crate) fn to_vec(&self) -> Vec<T> {
        let (front, back) = self.as_slices();
        let mut vec = Vec::with_capacity(self.size);
        vec.extend_from_slice(front);
        vec.extend_from_slice(back);
        debug_assert_eq!(vec.len(), self.size);
        vec
    }
}

impl<T> Drop for Backend<T> {
    #[inline]
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for Backend<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (front, back) = self.as_slices();
        f.debug_list().entries(front).entries(back).finish()
    }
}
