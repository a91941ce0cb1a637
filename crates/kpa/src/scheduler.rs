//! Debounced background saving of credentials.
//!
//! Credentials tend to change in bursts (the association handshake updates
//! them several times in quick succession). [`SaveScheduler`] waits until the
//! stream has been quiet for a full delay window and then writes only the
//! last value.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use kpa_core::{Credentials, CredentialsListener};

use crate::{CredentialStore, Result};

/// Upper bound on how long shutdown waits for an in-flight save.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Destination of scheduled saves.
pub trait CredentialSink: Send + Sync {
    fn save(&self, credentials: &Credentials) -> Result<()>;
}

impl CredentialSink for CredentialStore {
    fn save(&self, credentials: &Credentials) -> Result<()> {
        CredentialStore::save(self, credentials)
    }
}

/// A save waiting for its delay to elapse.
struct PendingSave {
    credentials: Credentials,
    claimed: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PendingSave {
    /// Take the right to write this save. False once the task (or someone
    /// else) already took it.
    fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::SeqCst)
    }

    /// Cancel the save unless it has already started.
    fn cancel(self) {
        if self.claim() {
            self.task.abort();
        }
    }
}

/// Coalesces credential changes into delayed, serialized writes.
///
/// Saves run on a dedicated single-worker runtime, so a caller reporting a
/// change never waits for the disk and at most one save runs at a time.
/// Each call to [`schedule`](Self::schedule) restarts the delay; a save that
/// has already started is never cancelled.
pub struct SaveScheduler {
    sink: Arc<dyn CredentialSink>,
    delay: Duration,
    runtime: Mutex<Option<Runtime>>,
    pending: Mutex<Option<PendingSave>>,
}

impl SaveScheduler {
    /// Create a scheduler writing to `sink` after `delay` of quiet.
    pub fn new(sink: Arc<dyn CredentialSink>, delay: Duration) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("kpa-save")
            .enable_time()
            .build()?;

        Ok(Self {
            sink,
            delay,
            runtime: Mutex::new(Some(runtime)),
            pending: Mutex::new(None),
        })
    }

    /// The quiet period before a save runs.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arrange for `credentials` to be saved once the delay has passed
    /// without another call. `None` has nothing to save and is ignored.
    pub fn schedule(&self, credentials: Option<Credentials>) {
        let Some(credentials) = credentials else {
            debug!("Credentials are not present and won't be saved");
            return;
        };

        let runtime = self.runtime.lock();
        let Some(runtime) = runtime.as_ref() else {
            debug!("Save scheduler is shut down, dropping credential update");
            return;
        };

        let claimed = Arc::new(AtomicBool::new(false));
        let task = runtime.spawn({
            let sink = Arc::clone(&self.sink);
            let claimed = Arc::clone(&claimed);
            let credentials = credentials.clone();
            let delay = self.delay;
            async move {
                tokio::time::sleep(delay).await;
                if claimed.swap(true, Ordering::SeqCst) {
                    return;
                }
                write(sink.as_ref(), &credentials);
            }
        });

        let previous = self.pending.lock().replace(PendingSave {
            credentials,
            claimed,
            task,
        });
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    /// True while a save is waiting for its delay.
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|pending| !pending.claimed.load(Ordering::SeqCst))
    }

    /// Stop accepting saves and release the worker.
    ///
    /// A save still waiting for its delay is written immediately; a save in
    /// progress is allowed to finish (bounded by a grace period). Later calls
    /// do nothing.
    pub fn shutdown(&self) {
        let Some(runtime) = self.runtime.lock().take() else {
            return;
        };

        let flush = self
            .pending
            .lock()
            .take()
            .filter(|pending| pending.claim())
            .map(|pending| {
                pending.task.abort();
                pending.credentials
            });

        // The single worker runs tasks one after another, so once this task
        // runs any earlier save has completed.
        let (done_tx, done_rx) = mpsc::channel();
        let sink = Arc::clone(&self.sink);
        runtime.spawn(async move {
            if let Some(credentials) = flush {
                write(sink.as_ref(), &credentials);
            }
            let _ = done_tx.send(());
        });

        if done_rx.recv_timeout(SHUTDOWN_GRACE).is_err() {
            warn!("Timed out waiting for the last credential save");
        }

        runtime.shutdown_background();
        debug!("Save scheduler shut down");
    }
}

impl CredentialsListener for SaveScheduler {
    fn credentials_changed(&self, credentials: Option<Credentials>) {
        self.schedule(credentials);
    }
}

impl Drop for SaveScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SaveScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveScheduler")
            .field("delay", &self.delay)
            .field("running", &self.runtime.lock().is_some())
            .finish()
    }
}

fn write(sink: &dyn CredentialSink, credentials: &Credentials) {
    if let Err(e) = sink.save(credentials) {
        error!(error = %e, "Credentials could not be saved to disk");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpa_core::{KeyPair, SecretKey};
    use std::time::Instant;

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<String>>,
    }

    impl CredentialSink for RecordingSink {
        fn save(&self, credentials: &Credentials) -> Result<()> {
            self.saved.lock().push(credentials.associate_id().to_string());
            Ok(())
        }
    }

    fn credentials(id: &str) -> Credentials {
        Credentials::new(KeyPair::new("cHVi", SecretKey::new("c2Vj")), "aWQ=", id)
    }

    fn scheduler(delay_ms: u64) -> (Arc<RecordingSink>, SaveScheduler) {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = SaveScheduler::new(sink.clone(), Duration::from_millis(delay_ms)).unwrap();
        (sink, scheduler)
    }

    #[test]
    fn test_none_is_not_scheduled() {
        let (sink, scheduler) = scheduler(20);

        scheduler.schedule(None);

        assert!(!scheduler.has_pending());
        std::thread::sleep(Duration::from_millis(100));
        assert!(sink.saved.lock().is_empty());
    }

    #[test]
    fn test_schedule_returns_before_delay() {
        let (_sink, scheduler) = scheduler(5_000);
        assert_eq!(scheduler.delay(), Duration::from_secs(5));

        let start = Instant::now();
        scheduler.schedule(Some(credentials("a")));

        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(scheduler.has_pending());
    }

    #[test]
    fn test_shutdown_flushes_pending_save() {
        let (sink, scheduler) = scheduler(60_000);

        scheduler.schedule(Some(credentials("a")));
        scheduler.schedule(Some(credentials("b")));
        scheduler.shutdown();

        assert_eq!(*sink.saved.lock(), vec!["b".to_string()]);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_schedule_after_shutdown_is_ignored() {
        let (sink, scheduler) = scheduler(10);
        scheduler.shutdown();

        scheduler.schedule(Some(credentials("late")));
        std::thread::sleep(Duration::from_millis(100));

        assert!(sink.saved.lock().is_empty());
        scheduler.shutdown();
    }
}
