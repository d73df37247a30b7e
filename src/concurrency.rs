//! # Concurrency
//!
//! The driver runs its parallel phases as short-lived fork-join scopes on a
//! `rayon` worker pool. A scope returns only after every task submitted to
//! it has finished; the first failure of any task becomes the result of the
//! whole scope.
//!
//! Each task receives its own [`RandomNumberGenerator`], derived from the
//! scope seed and the task's submission index. Results therefore don't
//! depend on which worker thread runs which task.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use generational_ga::concurrency::{Concurrency, Interrupt};
//!
//! let concurrency = Concurrency::default();
//! let counter = AtomicUsize::new(0);
//!
//! concurrency
//!     .scope(42, &Interrupt::new(), |scope| {
//!         for _ in 0..4 {
//!             scope.execute(|_rng| {
//!                 counter.fetch_add(1, Ordering::SeqCst);
//!                 Ok(())
//!             });
//!         }
//!     })
//!     .unwrap();
//!
//! assert_eq!(counter.load(Ordering::SeqCst), 4);
//! ```

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, trace};

use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// A cancellation flag shared between the caller and running scopes.
///
/// Setting the flag makes the next task check fail with
/// `GeneticError::Cancelled`. The flag is cleared when the cancellation
/// surfaces, so the next operation runs normally again.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the cancellation of the running (or next) operation.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears the flag and returns whether it was set.
    pub(crate) fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

/// The worker pool used for the parallel phases of a generation.
///
/// Either rayon's global pool, sized to the hardware parallelism, or a
/// dedicated pool owned by this value.
#[derive(Debug, Clone, Default)]
pub struct Concurrency {
    pool: Option<Arc<ThreadPool>>,
}

impl Concurrency {
    /// Uses rayon's global thread pool.
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Creates a dedicated pool with `threads` worker threads.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `threads` is zero and
    /// `GeneticError::ThreadPool` if the pool can't be built.
    pub fn with_threads(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(GeneticError::InvalidArgument(
                "Number of worker threads must be at least 1".to_string(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("ga-worker-{}", index))
            .build()?;
        info!(threads, "Created dedicated worker pool");
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Number of worker threads available to a scope.
    pub fn parallelism(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Runs a fork-join scope.
    ///
    /// `body` submits tasks through [`Scope::execute`]. The call returns after
    /// all tasks have finished.
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed the per-task random generators are derived from.
    /// * `interrupt` - Checked before the scope, before every task and after the join.
    /// * `body` - Submits the tasks of this scope.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by any task, `GeneticError::TaskFailed`
    /// for the first panicking task and `GeneticError::Cancelled` if
    /// `interrupt` was set.
    pub fn scope<'scope, F>(&self, seed: u64, interrupt: &Interrupt, body: F) -> Result<()>
    where
        F: FnOnce(&Scope<'_, 'scope>) + Send,
    {
        if interrupt.take() {
            return Err(GeneticError::Cancelled);
        }

        let failure = Arc::new(Mutex::new(None));
        let run = {
            let failure = Arc::clone(&failure);
            let interrupt = interrupt.clone();
            move |inner: &rayon::Scope<'scope>| {
                let scope = Scope {
                    inner,
                    failure,
                    interrupt,
                    seed,
                    next_stream: AtomicU64::new(0),
                };
                body(&scope);
            }
        };
        match &self.pool {
            Some(pool) => pool.scope(run),
            None => rayon::scope(run),
        }

        let failure = failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let interrupted = interrupt.take();
        match failure {
            Some(error) => Err(error),
            None if interrupted => Err(GeneticError::Cancelled),
            None => Ok(()),
        }
    }
}

/// A running fork-join scope, see [`Concurrency::scope`].
pub struct Scope<'a, 'scope> {
    inner: &'a rayon::Scope<'scope>,
    failure: Arc<Mutex<Option<GeneticError>>>,
    interrupt: Interrupt,
    seed: u64,
    next_stream: AtomicU64,
}

impl<'a, 'scope> Scope<'a, 'scope> {
    /// Submits a task.
    ///
    /// The task receives a random generator for the stream given by its
    /// submission index within this scope. Tasks submitted after another
    /// task already failed are skipped.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce(&mut RandomNumberGenerator) -> Result<()> + Send + 'scope,
    {
        let stream = self.next_stream.fetch_add(1, Ordering::Relaxed);
        let mut rng = RandomNumberGenerator::for_stream(self.seed, stream);
        let failure = Arc::clone(&self.failure);
        let interrupt = self.interrupt.clone();

        self.inner.spawn(move |_| {
            if interrupt.is_interrupted() {
                record(&failure, GeneticError::Cancelled);
                return;
            }
            if has_failed(&failure) {
                trace!(stream, "Skipping task after earlier failure");
                return;
            }
            match catch_unwind(AssertUnwindSafe(|| task(&mut rng))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => record(&failure, error),
                Err(panic) => record(
                    &failure,
                    GeneticError::TaskFailed(panic_message(panic.as_ref())),
                ),
            }
        });
    }

    /// The seed of this scope.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

fn has_failed(failure: &Mutex<Option<GeneticError>>) -> bool {
    failure
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

fn record(failure: &Mutex<Option<GeneticError>>, error: GeneticError) {
    let mut slot = failure.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_none() {
        trace!(%error, "Task failed");
        *slot = Some(error);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
