//! Periodic task engine.
//!
//! Every battery, the panel and the demo driver each own one
//! [`PeriodicTask`].  There is no process-wide timer: a task is started by
//! its owner and cancelled by its owner.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PeriodicTask thread                                         │
//! │                                                              │
//! │   ┌─────────────┐      ┌─────────────┐                       │
//! │   │ tick(every) │      │  stop rx    │◀── stop tx dropped    │
//! │   └──────┬──────┘      └──────┬──────┘     by stop()/Drop    │
//! │          │                    │                              │
//! │          ▼                    ▼                              │
//! │   ┌────────────────────────────────────┐                     │
//! │   │             select!                │                     │
//! │   │  tick  → job()                     │                     │
//! │   │  stop  → break                     │                     │
//! │   └────────────────────────────────────┘                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The thread only ever blocks on "next tick or stop".  `stop()` joins the
//! thread, so once it returns the job will not run again.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};
use log::{debug, warn};

/// Handle to a background thread that runs a job at a fixed interval.
pub struct PeriodicTask {
    name: String,
    /// Dropping the sender wakes the thread and ends the loop.
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn the thread.  The first run happens one `interval` from now.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to create the thread.
    pub fn spawn<F>(name: impl Into<String>, interval: Duration, mut job: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let ticker = tick(interval);

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                loop {
                    select! {
                        recv(ticker) -> _ => job(),
                        recv(stop_rx) -> _ => break,
                    }
                }
            })
            .expect("Failed to spawn periodic task thread");

        debug!("{}: started, every {:?}", name, interval);

        Self {
            name,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the thread and wait for it to exit.  Idempotent.
    pub fn stop(&mut self) {
        // Closing the channel is what the thread waits on.
        drop(self.stop_tx.take());

        let Some(handle) = self.handle.take() else {
            return;
        };

        // A job that drops its own task cannot join itself.
        if handle.thread().id() == thread::current().id() {
            return;
        }

        if handle.join().is_err() {
            warn!("{}: job panicked", self.name);
        }
        debug!("{}: stopped", self.name);
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}
