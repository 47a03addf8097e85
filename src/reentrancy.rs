//! Debug-only guard against nested table operations.
//!
//! Every public table operation opens a section before touching bins or
//! chains. The only user code that runs inside a section is the hashing
//! strategy; if it calls back into the same table, debug builds panic with
//! both operation names. Release builds compile the guard away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table tracker. Open a section with `let _op = self.ops.begin("add");`.
#[derive(Debug)]
pub struct OpTracker {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Tables are single-threaded; keep the tracker !Send + !Sync.
    _single_thread: PhantomData<*mut ()>,
}

impl OpTracker {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _single_thread: PhantomData,
        }
    }

    /// Open a section for `op`. In debug builds, panics if one is already open.
    #[inline]
    pub fn begin(&self, op: &'static str) -> OpSection<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrant table access: `{op}` called during `{outer}`");
            }
            self.active.set(Some(op));
            return OpSection { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return OpSection { _z: PhantomData };
        }
    }

    #[cfg(all(test, debug_assertions))]
    pub fn active(&self) -> Option<&'static str> {
        self.active.get()
    }
}

impl Default for OpTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII section returned by [`OpTracker::begin`]; closes on drop.
pub struct OpSection<'a> {
    #[cfg(debug_assertions)]
    owner: &'a OpTracker,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for OpSection<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}
