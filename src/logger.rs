//! Asynchronous event log.
//!
//! Workers push events onto a lock-free multi-producer queue through
//! cloneable [`EventSink`] handles; a single writer thread drains the
//! queue, serializes one JSON line per event and flushes once per
//! non-empty batch. Producers never block on the file. The writer sleeps
//! on a condition variable with a bounded timeout when idle, so a missed
//! wakeup costs at most one timeout period.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::queue::SegQueue;

use crate::error::EngineError;
use crate::events::Event;
use crate::metrics::Metrics;

const IDLE_WAIT: Duration = Duration::from_millis(100);

struct Shared {
    queue: SegQueue<Event>,
    running: AtomicBool,
    lock: Mutex<()>,
    available: Condvar,
}

/// Producer handle onto the log queue. Cheap to clone; enqueue is
/// wait-free apart from the wakeup notification.
#[derive(Clone)]
pub struct EventSink {
    shared: Arc<Shared>,
}

impl EventSink {
    #[inline]
    pub fn push(&self, event: Event) {
        self.shared.queue.push(event);
        self.shared.available.notify_one();
    }
}

/// Owns the writer thread and the output file. Shutting down drains the
/// queue, flushes and closes; events enqueued before `shutdown` are never
/// lost.
pub struct EventLogger {
    shared: Arc<Shared>,
    writer: Option<JoinHandle<()>>,
}

impl EventLogger {
    /// Open `path` for writing and start the writer thread. Failing to
    /// open the file is the engine's one fatal startup error.
    pub fn create(path: &Path, metrics: Arc<Metrics>) -> Result<Self, EngineError> {
        let file = File::create(path).map_err(|source| EngineError::LogOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let shared = Arc::new(Shared {
            queue: SegQueue::new(),
            running: AtomicBool::new(true),
            lock: Mutex::new(()),
            available: Condvar::new(),
        });

        let writer_shared = Arc::clone(&shared);
        let writer = thread::Builder::new()
            .name("event-log-writer".into())
            .spawn(move || write_loop(writer_shared, BufWriter::new(file), metrics))
            .map_err(|source| EngineError::Spawn { source })?;

        Ok(Self {
            shared,
            writer: Some(writer),
        })
    }

    pub fn sink(&self) -> EventSink {
        EventSink {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Stop the writer: final drain, flush, close. Idempotent.
    pub fn shutdown(&mut self) {
        if self
            .shared
            .running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.shared.available.notify_one();
        }
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                tracing::error!("event log writer panicked");
            }
        }
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn write_loop(shared: Arc<Shared>, mut out: BufWriter<File>, metrics: Arc<Metrics>) {
    tracing::debug!("event log writer started");
    loop {
        let wrote = drain(&shared.queue, &mut out, &metrics);
        if wrote {
            if let Err(err) = out.flush() {
                tracing::warn!(%err, "event log flush failed");
            }
        }
        if !shared.running.load(Ordering::Acquire) {
            break;
        }
        let guard = shared.lock.lock().unwrap_or_else(|e| e.into_inner());
        drop(
            shared
                .available
                .wait_timeout(guard, IDLE_WAIT)
                .map(|(g, _)| g),
        );
    }

    // Producers stopped enqueueing before shutdown; whatever is still
    // queued gets written out.
    drain(&shared.queue, &mut out, &metrics);
    if let Err(err) = out.flush() {
        tracing::warn!(%err, "final event log flush failed");
    }
    tracing::debug!("event log writer stopped");
}

fn drain(queue: &SegQueue<Event>, out: &mut BufWriter<File>, metrics: &Metrics) -> bool {
    let mut wrote = false;
    while let Some(event) = queue.pop() {
        match write_line(out, &event) {
            Ok(()) => metrics.inc_events_logged(),
            Err(err) => tracing::warn!(%err, "failed to write event"),
        }
        wrote = true;
    }
    wrote
}

fn write_line(out: &mut BufWriter<File>, event: &Event) -> io::Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    out.write_all(b"\n")
}
