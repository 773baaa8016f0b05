//! This module provides [`OrderedRingBuffer`], a ring buffer variant whose elements are always
//! sorted in non-decreasing order, which makes them searchable in logarithmic time.
//!
//! # Examples
//!
//! ```
//! use ordered_ring_buffer::OrderedRingBuffer;
//!
//! let buf = OrderedRingBuffer::<u32>::new(3);
//!
//! buf.insert(10).unwrap();
//! buf.insert(20).unwrap();
//! buf.insert(20).unwrap();
//!
//! // Inserting an element smaller than the last one is refused, and the buffer is left untouched
//! let err = buf.insert(15).unwrap_err();
//! assert_eq!(err.item, 15);
//! assert_eq!(err.last, 20);
//! assert_eq!(buf.to_vec(), [10, 20, 20]);
//!
//! // Once full, the oldest element is evicted, like in a `RingBuffer`
//! assert_eq!(buf.insert(30), Ok(true));
//! assert_eq!(buf.to_vec(), [20, 20, 30]);
//!
//! assert_eq!(buf.search(&30), Some(2));
//! assert_eq!(buf.search(&10), None);
//! ```
//!
//! # Interface
//!
//! [`OrderedRingBuffer`] has the same read interface as [`RingBuffer`]. Checkout the
//! [struct documentation] and [crate documentation][Interface] for more details.
//!
//! [`RingBuffer`]: crate::RingBuffer
//! [struct documentation]: OrderedRingBuffer
//! [Interface]: crate#interface

use core::cmp::Ordering;
use core::fmt;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::backend::Backend;
use crate::error::{CapacityError, OrderViolation};
use crate::impl_buffer;
use crate::iter::Iter;
use crate::session::Sessions;

/// A fixed-capacity, thread-safe ring buffer whose elements are kept in non-decreasing order.
///
/// Ordering is enforced on insertion: an element that sorts strictly before the most recently
/// inserted one is rejected.
///
/// See the [module-level documentation](self) for more details and examples.
pub struct OrderedRingBuffer<T> {
    backend: RwLock<Backend<T>>,
    sessions: Sessions,
}

impl<T> OrderedRingBuffer<T> {
    /// Returns an empty `OrderedRingBuffer` able to hold `capacity` elements.
    ///
    /// # Panics
    ///
    /// If `capacity` is 0. Use [`try_new()`](Self::try_new) to handle that case as an error.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(buf) => buf,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns an empty `OrderedRingBuffer` able to hold `capacity` elements, or an error if
    /// `capacity` is 0.
    pub fn try_new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError);
        }
        Ok(Self {
            backend: RwLock::new(Backend::with_capacity(capacity)),
            sessions: Sessions::new(),
        })
    }

    impl_buffer!("OrderedRingBuffer", "for i in 1..=3 { buf.insert(i).unwrap(); }");
}

impl<T> OrderedRingBuffer<T>
    where T: Clone
{
    impl_buffer!(@clone "OrderedRingBuffer", "for i in 1..=3 { buf.insert(i).unwrap(); }");
}

impl<T> OrderedRingBuffer<T>
    where T: Ord + Clone
{
    /// Appends an element to the back of the buffer, unless it sorts strictly before the most
    /// recently inserted element.
    ///
    /// Returns `Ok(true)` if the oldest element was evicted to make room, `Ok(false)` otherwise.
    /// On error the buffer is unchanged and the item is handed back inside the
    /// [`OrderViolation`].
    ///
    /// Comparison is made against the last inserted element, which is also the greatest one.
    /// This blocks while an iteration session is open on the buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_ring_buffer::OrderedRingBuffer;
    ///
    /// let buf = OrderedRingBuffer::<i32>::new(2);
    /// assert_eq!(buf.insert(1), Ok(false));
    /// assert_eq!(buf.insert(1), Ok(false));
    /// assert_eq!(buf.insert(2), Ok(true));
    ///
    /// let err = buf.insert(0).unwrap_err();
    /// assert_eq!(err.into_item(), 0);
    /// assert_eq!(buf.to_vec(), [1, 2]);
    /// ```
    pub fn insert(&self, item: T) -> Result<bool, OrderViolation<T>> {
        let mut backend = self.backend.write();
        if let Some(last) = backend.back() {
            if item < *last {
                let last = last.clone();
                drop(backend);
                debug!("rejected insert sorting before the last element");
                return Err(OrderViolation { item, last });
            }
        }
        let evicted = backend.push_back(item);
        if evicted {
            trace!("evicted oldest element");
        }
        Ok(evicted)
    }
}

impl<T> OrderedRingBuffer<T>
    where T: Ord
{
    /// Binary searches the buffer for `value`, returning its logical index if found.
    ///
    /// If several elements are equal to `value`, any one of their indexes may be returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_ring_buffer::OrderedRingBuffer;
    ///
    /// let buf = OrderedRingBuffer::<u32>::new(50);
    /// for i in 0..100 {
    ///     buf.insert(i).unwrap();
    /// }
    ///
    /// assert_eq!(buf.search(&55), Some(5));
    /// assert_eq!(buf.search(&20), None); // evicted
    /// assert_eq!(buf.search(&100), None);
    /// ```
    pub fn search(&self, value: &T) -> Option<usize> {
        let backend = self.backend.read_recursive();
        let mut low = 0;
        let mut high = backend.len();

        while low < high {
            let mid = low + (high - low) / 2;
            match backend.get(mid)?.cmp(value) {
                Ordering::Equal => return Some(mid),
                Ordering::Less => low = mid + 1,
                // `high` is exclusive, so `mid` itself is excluded here
                Ordering::Greater => high = mid,
            }
        }

        None
    }
}

impl<'a, T> IntoIterator for &'a OrderedRingBuffer<T>
    where T: Clone
{
    type Item = T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> fmt::Debug for OrderedRingBuffer<T>
    where T: fmt::Debug
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.backend.read_recursive(), f)
    }
}
