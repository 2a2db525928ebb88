//! Ownership of running local capture.
//!
//! Capture starts before the room is joined, so a join attempt that fails
//! halfway still has tasks and threads running. [`CaptureHandles`] owns all
//! of them and stops them when dropped, whether that happens on a failed
//! attempt or when the joined session goes away.

use std::sync::mpsc::{self, Receiver, Sender};

use log::debug;
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct CaptureHandles {
    tasks: Vec<JoinHandle<()>>,
    stop_signals: Vec<Sender<()>>,
}

impl CaptureHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_task(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    /// A signal for a capture thread to block on. It fires once these
    /// handles are dropped.
    pub fn stop_signal(&mut self) -> StopSignal {
        let (tx, rx) = mpsc::channel();
        self.stop_signals.push(tx);
        StopSignal(rx)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.stop_signals.is_empty()
    }
}

impl Drop for CaptureHandles {
    fn drop(&mut self) {
        if self.is_empty() {
            return;
        }

        debug!(
            "Stopping {} capture tasks and {} capture threads",
            self.tasks.len(),
            self.stop_signals.len()
        );
        for task in &self.tasks {
            task.abort();
        }
        // Disconnects every StopSignal.
        self.stop_signals.clear();
    }
}

pub struct StopSignal(Receiver<()>);

impl StopSignal {
    /// Blocks the calling thread until the owning handles are dropped.
    pub fn wait(self) {
        let _ = self.0.recv();
    }
}
