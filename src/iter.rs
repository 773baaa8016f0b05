use core::fmt;
use core::iter::FusedIterator;
use parking_lot::RwLockReadGuard;
use tracing::debug;

use crate::backend::Backend;
use crate::session::SessionId;
use crate::session::Sessions;

/// An [iterator](std::iter::Iterator) over the elements of a ring buffer.
///
/// This yields clones of the elements from the oldest to the most recently inserted one.
///
/// This struct is created by `iter()` and `try_iter()` on [`RingBuffer`](crate::RingBuffer) and
/// [`OrderedRingBuffer`](crate::OrderedRingBuffer). See their documentation for more details.
///
/// An `Iter` is an iteration session: while it is alive the buffer is read-locked, so inserts
/// block until the `Iter` is dropped or the session is cancelled by `break_iteration()`. A
/// cancelled `Iter` yields no further elements, but it keeps its read lock until it is dropped:
/// writers stay blocked until then. A new session can still be started right after the break,
/// even while a writer is waiting, as session start never queues behind writers.
///
/// # Leaking
///
/// If an `Iter` goes out of scope without being dropped (for example, due to calling
/// [`mem::forget()`](core::mem::forget) on it), the buffer stays read-locked and the session stays
/// open forever: every later insert blocks, and `try_iter()` fails until `break_iteration()` is
/// called. `is_iterating()` exposes the open session.
pub struct Iter<'a, T> {
    backend: RwLockReadGuard<'a, Backend<T>>,
    sessions: &'a Sessions,
    session: SessionId,
    index: usize,
    end: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(
        backend: RwLockReadGuard<'a, Backend<T>>,
        sessions: &'a Sessions,
        session: SessionId,
    ) -> Self {
        let end = backend.len();
        debug!(session, len = end, "iteration session started");
        Self { backend, sessions, session, index: 0, end }
    }

    /// Returns `true` if the session was cancelled with `break_iteration()`.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        !self.sessions.is_current(self.session)
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.end - self.index
    }
}

impl<'a, T> Iterator for Iter<'a, T>
    where T: Clone
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        if self.is_cancelled() {
            self.index = self.end;
            return None;
        }
        let item = self.backend.get(self.index).cloned();
        self.index += 1;
        item
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        // The session may be cancelled from another thread at any point
        (0, Some(self.remaining()))
    }
}

impl<'a, T> FusedIterator for Iter<'a, T>
    where T: Clone
{}

impl<'a, T> Drop for Iter<'a, T> {
    fn drop(&mut self) {
        if self.sessions.end(self.session) {
            debug!(session = self.session, consumed = self.index, "iteration session ended");
        }
    }
}

impl<'a, T> fmt::Debug for Iter<'a, T>
    where T: fmt::Debug
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rest = (self.index..self.end).filter_map(|index| self.backend.get(index));
        f.debug_struct("Iter")
            .field("session", &self.session)
            .field("cancelled", &self.is_cancelled())
            .field("remaining", &DebugList(rest))
            .finish()
    }
}

struct DebugList<I>(I);

impl<I> fmt::Debug for DebugList<I>
    where I: Iterator + Clone,
          I::Item: fmt::Debug
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.clone()).finish()
    }
}
