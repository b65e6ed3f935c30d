//! Runtime abstraction layer for async operations
//!
//! Geocoding and routing calls are spawned through a [`TaskSpawner`] so the
//! widget works with Tokio, with a blocking host loop, or with a host that
//! wants to drive pending work by hand. Staleness of completed work is decided
//! with [`Generation`]s, never by aborting the underlying request.

use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

/// Monotonically increasing request stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

/// Hands out generations and remembers which one is current
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    latest: u64,
    current: Option<Generation>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new generation, superseding every earlier one
    pub fn next(&mut self) -> Generation {
        self.latest += 1;
        let generation = Generation(self.latest);
        self.current = Some(generation);
        generation
    }

    pub fn current(&self) -> Option<Generation> {
        self.current
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current == Some(generation)
    }

    /// No outstanding generation is current any more
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}

/// A trait for spawning async tasks (object-safe version)
pub trait TaskSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn TaskHandle>;
}

/// Handle to a spawned async task
pub trait TaskHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;
}

struct FinishedHandle;

impl TaskHandle for FinishedHandle {
    fn is_finished(&self) -> bool {
        true
    }
}

/// Default spawner implementations
pub mod spawners {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::task::JoinHandle;
        use once_cell::sync::Lazy;

        /// Runtime owned by the crate for hosts that never enter one.
        /// The HTTP services need a Tokio reactor, so tasks are never run
        /// on the calling thread.
        static BACKGROUND: Lazy<Option<::tokio::runtime::Runtime>> = Lazy::new(|| {
            match ::tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("roamance-map")
                .enable_all()
                .build()
            {
                Ok(runtime) => Some(runtime),
                Err(err) => {
                    log::error!("could not start background tokio runtime: {}", err);
                    None
                }
            }
        });

        /// Tokio-based async spawner. Uses the runtime entered on the calling
        /// thread, or a crate-owned background runtime when there is none.
        pub struct TokioSpawner;

        impl TaskSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn TaskHandle> {
                if let Ok(handle) = ::tokio::runtime::Handle::try_current() {
                    return Box::new(TokioHandle(handle.spawn(future)));
                }
                match BACKGROUND.as_ref() {
                    Some(runtime) => {
                        log::trace!("no tokio runtime entered, spawning on background runtime");
                        Box::new(TokioHandle(runtime.spawn(future)))
                    }
                    None => {
                        log::error!("no tokio runtime available, task dropped");
                        Box::new(FinishedHandle)
                    }
                }
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl TaskHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }
        }
    }

    /// Runs every task to completion on the spawning thread.
    ///
    /// Only suitable for services that need no reactor, such as in-memory
    /// fixtures; the bundled HTTP services do.
    pub struct InlineSpawner;

    impl TaskSpawner for InlineSpawner {
        fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn TaskHandle> {
            futures::executor::block_on(future);
            Box::new(FinishedHandle)
        }
    }

    type TaskQueue = Arc<Mutex<VecDeque<BoxFuture<'static, ()>>>>;

    /// Queues tasks until the host runs them, in any order it likes.
    ///
    /// Useful for hosts with their own event loop and for reproducing
    /// out-of-order network responses.
    #[derive(Clone, Default)]
    pub struct DeferredSpawner {
        queue: TaskQueue,
    }

    impl DeferredSpawner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn pending(&self) -> usize {
            self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
        }

        /// Run the oldest queued task
        pub fn run_next(&self) -> bool {
            let task = self.queue.lock().ok().and_then(|mut queue| queue.pop_front());
            Self::run(task)
        }

        /// Run the most recently queued task
        pub fn run_latest(&self) -> bool {
            let task = self.queue.lock().ok().and_then(|mut queue| queue.pop_back());
            Self::run(task)
        }

        /// Run everything queued, oldest first
        pub fn run_all(&self) -> usize {
            let mut ran = 0;
            while self.run_next() {
                ran += 1;
            }
            ran
        }

        fn run(task: Option<BoxFuture<'static, ()>>) -> bool {
            match task {
                Some(task) => {
                    futures::executor::block_on(task);
                    true
                }
                None => false,
            }
        }
    }

    struct DeferredHandle(Arc<AtomicBool>);

    impl TaskHandle for DeferredHandle {
        fn is_finished(&self) -> bool {
            self.0.load(Ordering::Acquire)
        }
    }

    impl TaskSpawner for DeferredSpawner {
        fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn TaskHandle> {
            let done = Arc::new(AtomicBool::new(false));
            let flag = done.clone();
            let task: BoxFuture<'static, ()> = Box::pin(async move {
                future.await;
                flag.store(true, Ordering::Release);
            });
            match self.queue.lock() {
                Ok(mut queue) => queue.push_back(task),
                Err(_) => {
                    log::error!("deferred task queue poisoned, task dropped");
                    done.store(true, Ordering::Release);
                }
            }
            Box::new(DeferredHandle(done))
        }
    }
}

pub use spawners::{DeferredSpawner, InlineSpawner};
#[cfg(feature = "tokio-runtime")]
pub use spawners::tokio_impl::TokioSpawner;

/// Global runtime instance
static RUNTIME: OnceLock<Arc<dyn TaskSpawner>> = OnceLock::new();

/// Initialize the runtime with a specific spawner
pub fn init_runtime(spawner: Arc<dyn TaskSpawner>) {
    if RUNTIME.set(spawner).is_err() {
        log::debug!("runtime already initialized, keeping the existing spawner");
    }
}

/// Get the global runtime spawner
pub fn runtime() -> Arc<dyn TaskSpawner> {
    RUNTIME
        .get_or_init(|| {
            #[cfg(feature = "tokio-runtime")]
            {
                Arc::new(spawners::tokio_impl::TokioSpawner)
            }

            #[cfg(not(feature = "tokio-runtime"))]
            {
                Arc::new(spawners::InlineSpawner)
            }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_generation_counter() {
        let mut counter = GenerationCounter::new();
        assert_eq!(counter.current(), None);

        let first = counter.next();
        let second = counter.next();
        assert!(second > first);
        assert!(counter.is_current(second));
        assert!(!counter.is_current(first));

        counter.invalidate();
        assert!(!counter.is_current(second));
        assert!(counter.next() > second);
    }

    #[test]
    fn test_deferred_spawner_order() {
        let spawner = DeferredSpawner::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for label in ["paris", "london"] {
            let log = log.clone();
            spawner.spawn_boxed(Box::pin(async move {
                log.lock().unwrap().push(label);
            }));
        }
        assert_eq!(spawner.pending(), 2);

        assert!(spawner.run_latest());
        assert!(spawner.run_next());
        assert!(!spawner.run_next());
        assert_eq!(*log.lock().unwrap(), vec!["london", "paris"]);
    }

    #[test]
    fn test_deferred_handle_reports_completion() {
        let spawner = DeferredSpawner::new();
        let first = spawner.spawn_boxed(Box::pin(async {}));
        let second = spawner.spawn_boxed(Box::pin(async {}));
        assert!(!first.is_finished());

        spawner.run_next();
        assert!(first.is_finished());
        assert!(!second.is_finished());

        spawner.run_all();
        assert!(second.is_finished());
    }

    #[test]
    fn test_inline_spawner_runs_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let inner = counter.clone();
        let handle = InlineSpawner.spawn_boxed(Box::pin(async move {
            inner.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(handle.is_finished());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_spawner() {
        let (tx, rx) = ::tokio::sync::oneshot::channel();
        let handle = TokioSpawner.spawn_boxed(Box::pin(async move {
            let _ = tx.send(7);
        }));

        assert_eq!(rx.await.unwrap(), 7);
        ::tokio::task::yield_now().await;
        let _ = handle.is_finished();
    }

    #[cfg(feature = "tokio-runtime")]
    #[test]
    fn test_tokio_spawner_without_entered_runtime() {
        let (tx, rx) = std::sync::mpsc::channel();
        TokioSpawner.spawn_boxed(Box::pin(async move {
            // timers panic without a reactor
            ::tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            let _ = tx.send(::tokio::runtime::Handle::try_current().is_ok());
        }));

        let on_runtime = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        assert!(on_runtime);
    }
}
