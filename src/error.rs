use thiserror::Error;

/// Error returned by [`RingBuffer::try_new()`](crate::RingBuffer::try_new) and
/// [`OrderedRingBuffer::try_new()`](crate::OrderedRingBuffer::try_new) when asked for a buffer
/// that cannot hold any element.
#[derive(Error, Copy, Clone, PartialEq, Eq, Debug)]
#[error("ring buffer capacity must be at least 1")]
pub struct CapacityError;

/// Error returned when reading a logical index outside of `0..len`.
#[derive(Error, Copy, Clone, PartialEq, Eq, Debug)]
#[error("index {index} out of range for buffer of length {len}")]
pub struct IndexError {
    /// The requested logical index.
    pub index: usize,
    /// The length of the buffer at the time of the request.
    pub len: usize,
}

/// Error returned when an iteration session cannot be started.
#[derive(Error, Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum IterationError {
    /// Another iteration session is open on the same buffer. It has to be dropped, or cancelled
    /// with `break_iteration()`, before a new one can start.
    #[error("buffer is already being iterated; drop the iterator or call break_iteration() first")]
    AlreadyIterating,
}

/// Error returned by [`OrderedRingBuffer::insert()`](crate::OrderedRingBuffer::insert) when the
/// item sorts strictly before the most recently inserted element.
///
/// The buffer is left untouched. The rejected item is handed back in `item`.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[error("item {item:?} sorts before the last inserted element {last:?}")]
pub struct OrderViolation<T> {
    /// The rejected item.
    pub item: T,
    /// A copy of the most recently inserted element.
    pub last: T,
}

impl<T> OrderViolation<T> {
    /// Consumes the error, returning the rejected item.
    #[inline]
    pub fn into_item(self) -> T {
        self.item
    }
}
