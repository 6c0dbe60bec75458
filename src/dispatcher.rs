//! Task dispatcher
//!
//! Runs connect attempts on a dedicated multi-threaded runtime so callers never
//! block on network latency. The pool is unbounded: every submission is spawned
//! immediately with no queue limit or admission control.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::DispatchError;

/// Unbounded worker pool for asynchronous work
pub struct Dispatcher {
    /// `None` once disposed
    runtime: Mutex<Option<Runtime>>,
    /// Submitted units that have not finished yet
    in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter when a unit finishes or is dropped
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Dispatcher {
    /// Start the worker pool
    pub fn new(config: &ClientConfig) -> Result<Self, DispatchError> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(config.thread_name.clone());
        if let Some(threads) = config.worker_threads {
            builder.worker_threads(threads.max(1));
        }
        let runtime = builder.build()?;

        info!(
            "Dispatcher started ({} worker threads)",
            config
                .worker_threads
                .map(|n| n.to_string())
                .unwrap_or_else(|| "default".into())
        );

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Schedule `work` and return immediately
    pub fn submit<F>(&self, work: F) -> Result<(), DispatchError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);
        let runtime = runtime.as_ref().ok_or(DispatchError::Disposed)?;

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        runtime.spawn(async move {
            let _guard = guard;
            work.await;
        });

        Ok(())
    }

    /// Stop serving submissions and release the workers.
    ///
    /// In-flight work is abandoned, not awaited. Safe to call from async code
    /// and more than once.
    pub fn dispose(&self) {
        let runtime = self
            .runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match runtime {
            Some(runtime) => {
                let abandoned = self.in_flight();
                runtime.shutdown_background();
                info!("Dispatcher disposed ({} tasks abandoned)", abandoned);
            }
            None => debug!("Dispatcher already disposed"),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Number of submitted units still running
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.dispose();
    }
}
