//! Shutdown coordination for the site and control servers.
//!
//! The stop flag is a `watch` value rather than a one-shot message, so a
//! server that subscribes after the trigger still observes it.

use tokio::sync::watch;

/// Owner of the stop flag.
pub struct Shutdown {
    stopped: watch::Sender<bool>,
}

/// One server's view of the stop flag.
#[derive(Clone)]
pub struct ShutdownSignal {
    stopped: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self { stopped }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            stopped: self.stopped.subscribe(),
        }
    }

    /// Raise the stop flag. Idempotent.
    pub fn trigger(&self) {
        self.stopped.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Number of live [`ShutdownSignal`]s.
    pub fn receiver_count(&self) -> usize {
        self.stopped.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once the flag is raised, or once the [`Shutdown`] is dropped.
    pub async fn wait(mut self) {
        let _ = self.stopped.wait_for(|stopped| *stopped).await;
    }
}
