//! This crate implements a fixed-capacity [ring buffer], also known as circular buffer, that can
//! be shared between threads.
//!
//! The main struct is [`RingBuffer`]. A `RingBuffer` is a sequence of elements with a maximum
//! capacity chosen at construction: elements can be added to the buffer, and once the maximum
//! capacity is reached, the oldest element is overwritten by every new insertion.
//!
//! [`OrderedRingBuffer`] additionally requires elements to be inserted in non-decreasing order,
//! and in exchange supports searching the buffer in logarithmic time.
//!
//! [ring buffer]: https://en.wikipedia.org/wiki/Circular_buffer
//!
//! # Examples
//!
//! ```
//! use ordered_ring_buffer::RingBuffer;
//!
//! // Initialize a new, empty ring buffer with a capacity of 5 elements
//! let buf = RingBuffer::<u32>::new(5);
//!
//! // Add a few elements
//! buf.insert(1);
//! buf.insert(2);
//! buf.insert(3);
//! assert_eq!(buf.to_vec(), [1, 2, 3]);
//!
//! // Add more elements to fill the buffer capacity completely
//! buf.insert(4);
//! buf.insert(5);
//! assert_eq!(buf.to_vec(), [1, 2, 3, 4, 5]);
//!
//! // Adding more elements than the buffer can contain causes the oldest elements to be
//! // overwritten
//! assert!(buf.insert(6));
//! assert_eq!(buf.to_vec(), [2, 3, 4, 5, 6]); // `1` got evicted to make room for `6`
//! ```
//!
//! # Interface
//!
//! Both buffer kinds share the same read interface. The list below includes the most common
//! methods, but see the [`RingBuffer` struct documentation](RingBuffer) to see more.
//!
//! ## Adding elements
//!
//! * [`RingBuffer::insert()`]
//! * [`OrderedRingBuffer::insert()`]
//!
//! ## Getting elements
//!
//! * [`get()`](RingBuffer::get)
//! * [`front()`](RingBuffer::front), [`back()`](RingBuffer::back)
//! * [`to_vec()`](RingBuffer::to_vec)
//! * [`OrderedRingBuffer::search()`]
//!
//! ## Iterating
//!
//! * [`iter()`](RingBuffer::iter), [`try_iter()`](RingBuffer::try_iter)
//! * [`break_iteration()`](RingBuffer::break_iteration)
//! * [`is_iterating()`](RingBuffer::is_iterating)
//!
//! # Concurrency
//!
//! All methods take `&self`: a buffer is internally synchronized with a reader/writer lock and can
//! be shared between threads by wrapping it in an [`Arc`](std::sync::Arc). Inserting takes the
//! lock exclusively; reading takes it shared.
//!
//! A buffer can be iterated by at most one [`Iter`] at a time. The iterator holds the shared lock
//! for its whole lifetime, so it always observes a stable view of the buffer, and inserts from
//! other threads wait until the iterator is dropped. Inserting from the thread that owns the
//! iterator deadlocks.
//!
//! ```
//! use ordered_ring_buffer::RingBuffer;
//!
//! let buf = RingBuffer::<u32>::new(3);
//! buf.insert(1);
//! buf.insert(2);
//!
//! let mut it = buf.iter();
//! assert_eq!(it.next(), Some(1));
//!
//! // A second session is refused while the first one is open
//! assert!(buf.try_iter().is_err());
//!
//! // Reads are still allowed
//! assert_eq!(buf.get(1), Ok(2));
//!
//! drop(it);
//! assert!(buf.try_iter().is_ok());
//! ```
//!
//! # Time complexity
//!
//! | Method                                                                                  | Complexity                                    |
//! |-----------------------------------------------------------------------------------------|-----------------------------------------------|
//! | [`RingBuffer::insert()`], [`OrderedRingBuffer::insert()`]                               | *O*(1)                                        |
//! | [`get()`](RingBuffer::get), [`front()`](RingBuffer::front), [`back()`](RingBuffer::back) | *O*(1)                                        |
//! | [`len()`](RingBuffer::len), [`capacity()`](RingBuffer::capacity)                        | *O*(1)                                        |
//! | [`OrderedRingBuffer::search()`]                                                         | *O*(log *n*)                                  |
//! | [`clear()`](RingBuffer::clear)                                                          | *O*(*n*) for types that implement [`Drop`], *O*(1) otherwise |
//!
//! # Logging
//!
//! Session lifecycle events, evictions and rejected inserts are reported through [`tracing`].
//! The crate never installs a subscriber.

#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![warn(unused_qualifications)]

mod backend;
mod error;
mod iter;
mod session;


pub mod ordered;

use core::fmt;
use core::mem::MaybeUninit;
use parking_lot::RwLock;
use tracing::trace;

use crate::backend::Backend;
use crate::session::Sessions;

pub use crate::error::CapacityError;
pub use crate::error::IndexError;
pub use crate::error::IterationError;
pub use crate::error::OrderViolation;
pub use crate::iter::Iter;
pub use crate::ordered::OrderedRingBuffer;

/// Returns `(x + y) % m` without risk of overflows if `x + y` cannot fit in `usize`.
///
/// `x` and `y` are expected to be less than, or equal to `m`.
#[inline]
const fn add_mod(x: usize, y: usize, m: usize) -> usize {
    debug_assert!(m > 0);
    debug_assert!(x <= m);
    debug_assert!(y <= m);
    let (z, overflow) = x.overflowing_add(y);
    (z + (overflow as usize) * (usize::MAX % m + 1)) % m
}

#[inline]
const unsafe fn slice_assume_init_ref<T>(slice: &[MaybeUninit<T>]) -> &[T] {
    &*(slice as *const [MaybeUninit<T>] as *const [T])
}

#[inline]
unsafe fn slice_assume_init_mut<T>(slice: &mut [MaybeUninit<T>]) -> &mut [T] {
    &mut *(slice as *mut [MaybeUninit<T>] as *mut [T])
}

macro_rules! impl_buffer {
    (@clone $name:literal, $fill:literal) => {
        /// Returns a copy of the element at logical `index`, where index 0 is the oldest element.
        ///
        /// # Examples
        ///
        /// ```
        #[doc = concat!("use ordered_ring_buffer::{IndexError, ", $name, "};")]
        #[doc = concat!("let buf = ", $name, "::<u32>::new(3);")]
        #[doc = $fill]
        ///
        /// assert_eq!(buf.get(0), Ok(1));
        /// assert_eq!(buf.get(2), Ok(3));
        /// assert_eq!(buf.get(3), Err(IndexError { index: 3, len: 3 }));
        /// ```
        pub fn get(&self, index: usize) -> Result<T, $crate::IndexError> {
            let backend = self.backend.read_recursive();
            backend.get(index)
                   .cloned()
                   .ok_or($crate::IndexError { index, len: backend.len() })
        }

        /// Returns a copy of the oldest element, or `None` if the buffer is empty.
        #[inline]
        pub fn front(&self) -> Option<T> {
            self.backend.read_recursive().front().cloned()
        }

        /// Returns a copy of the most recently inserted element, or `None` if the buffer is empty.
        #[inline]
        pub fn back(&self) -> Option<T> {
            self.backend.read_recursive().back().cloned()
        }

        /// Clones the elements of the buffer into a new [`Vec`], oldest first.
        #[must_use]
        pub fn to_vec(&self) -> Vec<T> {
            self.backend.read_recursive().to_vec()
        }

        /// Starts an iteration session over the elements of the buffer, oldest first.
        ///
        /// # Panics
        ///
        /// If another iteration session is open on the buffer. Use
        /// [`try_iter()`](Self::try_iter) to handle that case as an error.
        ///
        /// # Examples
        ///
        /// ```
        #[doc = concat!("use ordered_ring_buffer::", $name, ";")]
        #[doc = concat!("let buf = ", $name, "::<u32>::new(3);")]
        #[doc = $fill]
        ///
        /// let items: Vec<u32> = buf.iter().collect();
        /// assert_eq!(items, [1, 2, 3]);
        /// ```
        #[must_use]
        pub fn iter(&self) -> $crate::Iter<'_, T> {
            match self.try_iter() {
                Ok(iter) => iter,
                Err(err) => panic!("{err}"),
            }
        }

        /// Starts an iteration session over the elements of the buffer, oldest first, or returns
        /// an error if another session is open.
        ///
        /// The returned [`Iter`](crate::Iter) holds the buffer's read lock until it is dropped.
        ///
        /// # Examples
        ///
        /// ```
        #[doc = concat!("use ordered_ring_buffer::{IterationError, ", $name, "};")]
        #[doc = concat!("let buf = ", $name, "::<u32>::new(3);")]
        #[doc = $fill]
        ///
        /// let first = buf.try_iter().unwrap();
        /// assert_eq!(buf.try_iter().unwrap_err(), IterationError::AlreadyIterating);
        /// drop(first);
        /// assert!(buf.try_iter().is_ok());
        /// ```
        pub fn try_iter(&self) -> Result<$crate::Iter<'_, T>, $crate::IterationError> {
            match self.sessions.begin() {
                // Must not queue behind a waiting writer: that writer may itself be waiting on a
                // cancelled `Iter` still held by this thread
                Some(session) => {
                    let backend = self.backend.read_recursive();
                    Ok($crate::Iter::new(backend, &self.sessions, session))
                }
                None => {
                    tracing::warn!("refused to start a second iteration session");
                    Err($crate::IterationError::AlreadyIterating)
                }
            }
        }
    };

    ($name:literal, $fill:literal) => {
        /// Returns the capacity of the buffer.
        ///
        /// This is the maximum number of elements that the buffer can hold, fixed at
        /// construction.
        ///
        /// # Examples
        ///
        /// ```
        #[doc = concat!("use ordered_ring_buffer::", $name, ";")]
        #[doc = concat!("let buf = ", $name, "::<u32>::new(16);")]
        /// assert_eq!(buf.capacity(), 16);
        /// ```
        #[inline]
        pub fn capacity(&self) -> usize {
            self.backend.read_recursive().capacity()
        }

        /// Returns the number of elements in the buffer.
        ///
        /// # Examples
        ///
        /// ```
        #[doc = concat!("use ordered_ring_buffer::", $name, ";")]
        #[doc = concat!("let buf = ", $name, "::<u32>::new(16);")]
        /// assert_eq!(buf.len(), 0);
        ///
        #[doc = $fill]
        /// assert_eq!(buf.len(), 3);
        /// ```
        #[inline]
        pub fn len(&self) -> usize {
            self.backend.read_recursive().len()
        }

        /// Returns `true` if the buffer contains 0 elements.
        #[inline]
        pub fn is_empty(&self) -> bool {
            self.backend.read_recursive().is_empty()
        }

        /// Returns `true` if the number of elements in the buffer matches the buffer capacity.
        ///
        /// # Examples
        ///
        /// ```
        #[doc = concat!("use ordered_ring_buffer::", $name, ";")]
        #[doc = concat!("let buf = ", $name, "::<u32>::new(3);")]
        /// assert!(!buf.is_full());
        ///
        #[doc = $fill]
        /// assert!(buf.is_full());
        /// ```
        #[inline]
        pub fn is_full(&self) -> bool {
            self.backend.read_recursive().is_full()
        }

        /// Removes and drops all the elements in the buffer.
        ///
        /// This blocks while an iteration session is open on the buffer.
        pub fn clear(&self) {
            self.backend.write().clear()
        }

        /// Returns `true` if an iteration session is currently open on the buffer.
        ///
        /// A session stays open until its [`Iter`](crate::Iter) is dropped or
        /// [`break_iteration()`](Self::break_iteration) is called.
        #[inline]
        pub fn is_iterating(&self) -> bool {
            self.sessions.is_active()
        }

        /// Cancels the open iteration session, if any.
        ///
        /// The cancelled [`Iter`](crate::Iter) stops yielding elements, and a new session can be
        /// started right away. Calling this when no session is open does nothing.
        ///
        /// # Examples
        ///
        /// ```
        #[doc = concat!("use ordered_ring_buffer::", $name, ";")]
        #[doc = concat!("let buf = ", $name, "::<u32>::new(3);")]
        #[doc = $fill]
        ///
        /// let mut it = buf.iter();
        /// assert_eq!(it.next(), Some(1));
        ///
        /// buf.break_iteration();
        /// assert_eq!(it.next(), None);
        /// assert!(!buf.is_iterating());
        ///
        /// let mut fresh = buf.iter();
        /// assert_eq!(fresh.next(), Some(1));
        /// ```
        pub fn break_iteration(&self) {
            if let Some(session) = self.sessions.cancel() {
                tracing::debug!(session, "iteration session cancelled");
            }
        }
    };
}
pub(crate) use impl_buffer;

/// A fixed-capacity, thread-safe ring buffer.
///
/// Elements are kept in insertion order, oldest first. Once the buffer is full, each insertion
/// evicts the oldest element.
///
/// See the [module-level documentation](self) for more details and examples.
pub struct RingBuffer<T> {
    backend: RwLock<Backend<T>>,
    sessions: Sessions,
}

impl<T> RingBuffer<T> {
    /// Returns an empty `RingBuffer` able to hold `capacity` elements.
    ///
    /// # Panics
    ///
    /// If `capacity` is 0. Use [`try_new()`](Self::try_new) to handle that case as an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_ring_buffer::RingBuffer;
    /// let buf = RingBuffer::<u32>::new(16);
    /// assert_eq!(buf.len(), 0);
    /// assert_eq!(buf.capacity(), 16);
    /// ```
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(buf) => buf,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns an empty `RingBuffer` able to hold `capacity` elements, or an error if `capacity`
    /// is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_ring_buffer::{CapacityError, RingBuffer};
    /// assert!(RingBuffer::<u32>::try_new(4).is_ok());
    /// assert_eq!(RingBuffer::<u32>::try_new(0).unwrap_err(), CapacityError);
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError);
        }
        Ok(Self {
            backend: RwLock::new(Backend::with_capacity(capacity)),
            sessions: Sessions::new(),
        })
    }

    /// Appends an element to the back of the buffer.
    ///
    /// If the buffer is full, the oldest element is evicted (dropped) and `true` is returned.
    ///
    /// This blocks while an iteration session is open on the buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_ring_buffer::RingBuffer;
    ///
    /// let buf = RingBuffer::<u32>::new(3);
    /// assert!(!buf.insert(1));
    /// assert!(!buf.insert(2));
    /// assert!(!buf.insert(3));
    /// assert!(buf.insert(4));
    /// assert_eq!(buf.to_vec(), [2, 3, 4]);
    /// ```
    pub fn insert(&self, item: T) -> bool {
        let evicted = self.backend.write().push_back(item);
        if evicted {
            trace!("evicted oldest element");
        }
        evicted
    }

    impl_buffer!("RingBuffer", "for i in 1..=3 { buf.insert(i); }");
}

impl<T> RingBuffer<T>
    where T: Clone
{
    impl_buffer!(@clone "RingBuffer", "for i in 1..=3 { buf.insert(i); }");
}

impl<'a, T> IntoIterator for &'a RingBuffer<T>
    where T: Clone
{
    type Item = T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> fmt::Debug for RingBuffer<T>
    where T: fmt::Debug
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.backend.read_recursive(), f)
    }
}
