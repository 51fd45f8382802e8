//! Single-assignment cache for the outcome of binding resolution.

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Returned when the caller's token fired before a value was available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Outcome of resolving an external binding to a metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Utf8PathBuf),
    NotFound,
}

impl Resolution {
    /// Blank paths are treated as not found.
    pub fn from_path(path: Option<Utf8PathBuf>) -> Self {
        match path {
            Some(p) if !p.as_str().trim().is_empty() => Resolution::Resolved(p),
            _ => Resolution::NotFound,
        }
    }

    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Resolution::Resolved(p) => Some(p),
            Resolution::NotFound => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

enum Slot<T> {
    Unset,
    InProgress,
    Ready(T),
}

// Waiters re-check their own token at this interval.
const WAIT_POLL: Duration = Duration::from_millis(5);

/// A value computed at most once per successful attempt.
///
/// The first caller of [`ResolutionCell::get_or_compute`] runs the closure;
/// concurrent callers block until it finishes and observe the same value.
/// If the computing caller is cancelled or panics, the cell goes back to
/// unset and the next caller computes again. Once a value is stored it never
/// changes.
pub struct ResolutionCell<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T: Clone> ResolutionCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Unset),
            ready: Condvar::new(),
        }
    }

    /// The stored value, without computing.
    pub fn peek(&self) -> Option<T> {
        match &*self.slot.lock() {
            Slot::Ready(value) => Some(value.clone()),
            Slot::Unset | Slot::InProgress => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.slot.lock(), Slot::Ready(_))
    }

    pub fn get_or_compute<F>(&self, cancel: &CancellationToken, compute: F) -> Result<T, Cancelled>
    where
        F: FnOnce(&CancellationToken) -> Result<T, Cancelled>,
    {
        let mut slot = self.slot.lock();
        loop {
            if let Slot::Ready(value) = &*slot {
                return Ok(value.clone());
            }
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            match &*slot {
                Slot::InProgress => {
                    self.ready.wait_for(&mut slot, WAIT_POLL);
                }
                Slot::Unset => break,
                Slot::Ready(_) => {}
            }
        }
        *slot = Slot::InProgress;
        drop(slot);

        let mut guard = ResetOnDrop {
            cell: self,
            armed: true,
        };
        let value = compute(cancel)?;

        guard.armed = false;
        let mut slot = self.slot.lock();
        *slot = Slot::Ready(value.clone());
        self.ready.notify_all();
        Ok(value)
    }
}

impl<T: Clone> Default for ResolutionCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ResolutionCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.slot.lock() {
            Slot::Unset => "unset",
            Slot::InProgress => "in_progress",
            Slot::Ready(_) => "ready",
        };
        f.debug_struct("ResolutionCell").field("state", &state).finish()
    }
}

/// Returns the cell to unset when the computing caller bails out.
struct ResetOnDrop<'a, T> {
    cell: &'a ResolutionCell<T>,
    armed: bool,
}

impl<T> Drop for ResetOnDrop<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            let mut slot = self.cell.slot.lock();
            *slot = Slot::Unset;
            self.cell.ready.notify_all();
        }
    }
}
