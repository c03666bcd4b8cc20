//! Bounded-concurrency fan-out executor
//!
//! Runs one task per unit of work with at most `ceiling` tasks in flight,
//! remembers the first reported error, and supports cancelling everything
//! that is still running or not yet started.
//!
//! # Usage
//!
//! ```ignore
//! let mut run = BoundedFanOut::new(20, &token);
//! for item in items {
//!     if run.is_cancelled() {
//!         break;
//!     }
//!     let slot = run.acquire().await;
//!     let reporter = run.reporter();
//!     run.spawn(slot, async move {
//!         if let Err(e) = work(item).await {
//!             reporter.report(e);
//!         }
//!     });
//! }
//! let first_error = run.wait().await;
//! ```

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SearchError};

/// A held concurrency slot; released when dropped
#[derive(Debug)]
pub struct Slot {
    _permit: Option<OwnedSemaphorePermit>,
}

impl Slot {
    /// Return the slot to the executor
    pub fn release(self) {}
}

/// Records only the first error reported to it
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    first: Arc<Mutex<Option<SearchError>>>,
}

impl ErrorReporter {
    /// Record `err` unless an error was already recorded
    pub fn report(&self, err: SearchError) {
        let mut first = self.first.lock();
        if first.is_none() {
            *first = Some(err);
        } else {
            tracing::debug!("Dropping subsequent fan-out error: {}", err);
        }
    }

    pub fn has_error(&self) -> bool {
        self.first.lock().is_some()
    }

    fn take(&self) -> Option<SearchError> {
        self.first.lock().take()
    }
}

/// Bounded-concurrency executor over a cancellable context
pub struct BoundedFanOut {
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<()>,
    reporter: ErrorReporter,
    token: CancellationToken,
    ceiling: usize,
}

impl BoundedFanOut {
    /// Create an executor allowing `ceiling` concurrent tasks
    ///
    /// The executor works on a child of `parent`: cancelling the parent
    /// cancels every task, while [`cancel_all`](Self::cancel_all) leaves the
    /// parent untouched. A ceiling of zero is treated as one.
    pub fn new(ceiling: usize, parent: &CancellationToken) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(ceiling)),
            tasks: JoinSet::new(),
            reporter: ErrorReporter::default(),
            token: parent.child_token(),
            ceiling,
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Wait until a concurrency slot is free
    pub async fn acquire(&self) -> Slot {
        // The semaphore is owned here and never closed, so this cannot fail.
        let permit = Arc::clone(&self.semaphore).acquire_owned().await.ok();
        Slot { _permit: permit }
    }

    /// Number of currently free slots
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run `task` holding `slot`; the slot is released when the task ends,
    /// whether it returns normally or panics
    pub fn spawn<F>(&mut self, slot: Slot, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(async move {
            let _slot = slot;
            task.await;
        });
    }

    /// Handle for reporting errors from inside tasks
    pub fn reporter(&self) -> ErrorReporter {
        self.reporter.clone()
    }

    /// Record an error from the dispatching side
    pub fn report_error(&self, err: SearchError) {
        self.reporter.report(err);
    }

    /// The token every task should observe
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel all in-flight and not-yet-started tasks
    pub fn cancel_all(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for every dispatched task, then return the first recorded error
    pub async fn wait(mut self) -> Result<()> {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(join_error) = joined {
                tracing::warn!("Fan-out task failed: {}", join_error);
                self.reporter.report(SearchError::TaskFailed {
                    message: join_error.to_string(),
                });
            }
        }
        match self.reporter.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
