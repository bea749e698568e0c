//! Sessions - liveness and confinement of memory regions
//!
//! A session is the lifetime token shared by every segment allocated in the
//! same arena. Accesses hold a shared lock on the session state for as long
//! as they touch memory; closing takes the exclusive lock, so a close cannot
//! complete while an access is in flight.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use memview_core::{AccessError, AccessResult};
use parking_lot::{RwLock, RwLockReadGuard};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Session kinds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// Accessible and closable only from the creating thread
    #[default]
    Confined,
    /// Accessible and closable from any thread
    Shared,
    /// Always alive, never closable
    Global,
}

struct SessionInner {
    id: u64,
    kind: SessionKind,
    owner: Option<ThreadId>,
    alive: RwLock<bool>,
}

/// Shared handle to a session's liveness state
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

/// Proof that a session is alive and accessible from the current thread
///
/// The session cannot be closed while a guard exists.
pub struct SessionGuard<'a> {
    _alive: RwLockReadGuard<'a, bool>,
}

impl Session {
    pub fn new(kind: SessionKind) -> Self {
        let owner = match kind {
            SessionKind::Confined => Some(thread::current().id()),
            SessionKind::Shared | SessionKind::Global => None,
        };
        Session {
            inner: Arc::new(SessionInner {
                id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
                kind,
                owner,
                alive: RwLock::new(true),
            }),
        }
    }

    /// A session that is always alive
    pub fn global() -> Self {
        Session::new(SessionKind::Global)
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    #[inline]
    pub fn kind(&self) -> SessionKind {
        self.inner.kind
    }

    /// Owner thread of a confined session
    #[inline]
    pub fn owner(&self) -> Option<ThreadId> {
        self.inner.owner
    }

    pub fn is_alive(&self) -> bool {
        *self.inner.alive.read_recursive()
    }

    #[inline]
    pub fn is_closable(&self) -> bool {
        self.inner.kind != SessionKind::Global
    }

    /// Check the session is alive and accessible, and hold it open
    pub fn acquire(&self) -> AccessResult<SessionGuard<'_>> {
        self.check_thread()?;
        // recursive: a thread already holding a guard must not queue behind a pending close
        let alive = self.inner.alive.read_recursive();
        if !*alive {
            return Err(AccessError::RegionReleased);
        }
        Ok(SessionGuard { _alive: alive })
    }

    /// Close the session
    ///
    /// Blocks until in-flight accesses of other threads complete. A confined
    /// session still held by its own thread fails with `SessionInUse`.
    pub(crate) fn close(&self) -> AccessResult<()> {
        if !self.is_closable() {
            tracing::warn!(session = self.id(), "attempt to close a global session");
            return Err(AccessError::SessionNotClosable);
        }
        self.check_thread()?;

        let mut alive = match self.inner.kind {
            SessionKind::Confined => self
                .inner
                .alive
                .try_write()
                .ok_or(AccessError::SessionInUse)?,
            _ => self.inner.alive.write(),
        };
        if !*alive {
            return Err(AccessError::RegionReleased);
        }
        *alive = false;

        tracing::debug!(session = self.id(), kind = ?self.kind(), "session closed");
        Ok(())
    }

    fn check_thread(&self) -> AccessResult<()> {
        match self.inner.owner {
            Some(owner) if owner != thread::current().id() => {
                Err(AccessError::ConfinementViolation)
            }
            _ => Ok(()),
        }
    }

    /// Whether two handles refer to the same session
    #[inline]
    pub fn same_as(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({}:{:?})", self.inner.id, self.inner.kind)
    }
}
