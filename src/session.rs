use core::sync::atomic::AtomicUsize;
use core::sync::atomic::Ordering;

/// Marker value meaning that no session is open.
const IDLE: usize = 0;

/// Identifier of an iteration session. Never equal to `IDLE`.
pub(crate) type SessionId = usize;

/// Tracks the single iteration session that a buffer may have open at any time.
///
/// The buffer only stores the id of the open session. The iterator carries its own id and checks
/// it against `active` to find out whether it was cancelled; ending a session is a
/// compare-and-swap on that id, so a stale iterator can never close a newer session.
pub(crate) struct Sessions {
    pub(crate) active: AtomicUsize,
    pub(crate) next_id: AtomicUsize,
}

impl Sessions {
    pub(crate) const fn new() -> Self {
        Self {
            active: AtomicUsize::new(IDLE),
            next_id: AtomicUsize::new(IDLE + 1),
        }
    }

    /// Opens a new session, or returns `None` if one is already open.
    pub(crate) fn begin(&self) -> Option<SessionId> {
        let mut id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if id == IDLE {
            // Counter wrapped around
            id = self.next_id.fetch_add(1, Ordering::Relaxed);
        }
        self.active
            .compare_exchange(IDLE, id, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| id)
    }

    #[inline]
    pub(crate) fn is_current(&self, id: SessionId) -> bool {
        self.active.load(Ordering::Acquire) == id
    }

    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) != IDLE
    }

    /// Closes session `id`. Returns `false` if it had already been cancelled.
    pub(crate) fn end(&self, id: SessionId) -> bool {
        self.active
            .compare_exchange(id, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Closes whatever session is open, returning its id.
    pub(crate) fn cancel(&self) -> Option<SessionId> {
        match self.active.swap(IDLE, Ordering::AcqRel) {
            IDLE => None,
            id => Some(id),
        }
    }
}
