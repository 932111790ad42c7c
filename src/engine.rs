//! Exchange orchestration: wiring from feed to log.
//!
//! ```text
//! [Feed] -> [Dispatcher] -> [Shard Queue]_k -> [Worker_k] -> [Book_sym]
//!                                                   |
//!                                             [Logger Queue] -> [Log Writer]
//! ```
//!
//! The exchange owns the shard queues, the worker threads and the event
//! logger. `stop` is idempotent: it flips the shared running flag, joins
//! the workers (each drains its queue best-effort), then shuts the logger
//! down, which drains and flushes the remaining events.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam::queue::SegQueue;

use crate::dispatch::{bucket_of, Dispatcher};
use crate::error::EngineError;
use crate::logger::EventLogger;
use crate::metrics::Metrics;
use crate::parser::parse_message;
use crate::types::{Order, Ticker};
use crate::worker::{self, WorkerConfig};

/// Worker (shard) count. Fixed at build time; buckets fold onto workers
/// modulo this.
pub const NUM_WORKERS: usize = 4;

/// Startup configuration. Everything not listed here is a build-time
/// constant.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Event log destination. Opening it is the one fatal startup step.
    pub log_path: PathBuf,
    /// Symbols to register at startup. Unlisted symbols get their book on
    /// first message.
    pub symbols: Vec<Ticker>,
    /// Pin each worker thread to a core.
    pub pin_workers: bool,
}

impl ExchangeConfig {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            symbols: Vec::new(),
            pin_workers: false,
        }
    }

    pub fn with_symbols(mut self, symbols: impl IntoIterator<Item = Ticker>) -> Self {
        self.symbols.extend(symbols);
        self
    }
}

pub struct Exchange {
    dispatcher: Dispatcher,
    running: Arc<AtomicBool>,
    stopped: AtomicBool,
    workers: Vec<JoinHandle<()>>,
    logger: EventLogger,
    metrics: Arc<Metrics>,
}

impl Exchange {
    /// Open the log, spawn the log writer and the worker pool.
    pub fn start(config: ExchangeConfig) -> Result<Self, EngineError> {
        let metrics = Arc::new(Metrics::new());
        let mut logger = EventLogger::create(&config.log_path, Arc::clone(&metrics))?;
        let running = Arc::new(AtomicBool::new(true));

        let queues: Vec<Arc<SegQueue<Order>>> =
            (0..NUM_WORKERS).map(|_| Arc::new(SegQueue::new())).collect();

        let mut shard_symbols: Vec<Vec<Ticker>> = vec![Vec::new(); NUM_WORKERS];
        for symbol in &config.symbols {
            match bucket_of(symbol) {
                Some(bucket) => shard_symbols[bucket % NUM_WORKERS].push(*symbol),
                None => {
                    tracing::warn!(ticker = %symbol, "ignoring unmappable symbol at startup")
                }
            }
        }

        let mut workers = Vec::with_capacity(NUM_WORKERS);
        for (shard, symbols) in shard_symbols.into_iter().enumerate() {
            let spawned = worker::spawn(WorkerConfig {
                shard,
                queue: Arc::clone(&queues[shard]),
                sink: logger.sink(),
                running: Arc::clone(&running),
                metrics: Arc::clone(&metrics),
                symbols,
                pin_to_core: config.pin_workers,
            });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    // Unwind whatever already started before reporting.
                    running.store(false, Ordering::Release);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    logger.shutdown();
                    return Err(EngineError::Spawn { source });
                }
            }
        }

        tracing::info!(
            workers = NUM_WORKERS,
            log = %config.log_path.display(),
            symbols = config.symbols.len(),
            "exchange started"
        );

        Ok(Self {
            dispatcher: Dispatcher::new(queues, Arc::clone(&metrics)),
            running,
            stopped: AtomicBool::new(false),
            workers,
            logger,
            metrics,
        })
    }

    /// Parse one raw frame and route it. Parse failures and unmappable
    /// tickers are counted drops, never errors.
    pub fn on_message(&self, data: &[u8]) {
        self.metrics.inc_msgs_total();
        match parse_message(data) {
            Ok(order) => {
                self.dispatcher.dispatch(order);
            }
            Err(err) => {
                self.metrics.inc_parse_errors();
                tracing::debug!(%err, len = data.len(), "dropping unparseable message");
            }
        }
    }

    /// Route an already-parsed order, bypassing the wire decoder.
    pub fn submit(&self, order: Order) -> bool {
        self.dispatcher.dispatch(order)
    }

    /// Shard a ticker resolves to; test and tooling support.
    pub fn shard_of(&self, ticker: &Ticker) -> Option<usize> {
        self.dispatcher.shard_of(ticker)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Stop workers and logger. Repeated calls are no-ops.
    pub fn stop(&mut self) {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.running.store(false, Ordering::Release);
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("worker panicked");
            }
        }
        self.logger.shutdown();
        tracing::info!("exchange stopped");
    }
}

impl Drop for Exchange {
    fn drop(&mut self) {
        self.stop();
    }
}
