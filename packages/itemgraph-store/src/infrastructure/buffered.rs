//! Buffered background writer
//!
//! Wraps any [`TargetGraphSink`] and moves the actual writes onto a dedicated
//! thread. Items are grouped into batches bounded by count and by estimated
//! payload size; full batches travel over a bounded channel, so a slow sink
//! applies back-pressure to the producer instead of growing memory.
//!
//! A failure on the writer thread is recorded and reported by the next call
//! on the writer. From then on every call fails.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

use crate::domain::{Item, TargetGraphSink};
use crate::error::{Result, StorageError};

/// Batching limits for [`BufferedItemWriter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Maximum items per batch
    pub batch_size: usize,
    /// Maximum estimated characters per batch
    pub batch_char_size: usize,
    /// Batches that may wait in the channel while the worker is busy
    pub pipe_length: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            batch_char_size: 10_000_000,
            pipe_length: 1,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(StorageError::config("batch_size must be at least 1"));
        }
        if self.batch_char_size == 0 {
            return Err(StorageError::config("batch_char_size must be at least 1"));
        }
        if self.pipe_length == 0 {
            return Err(StorageError::config("pipe_length must be at least 1"));
        }
        Ok(())
    }
}

enum Message {
    Batch(Vec<Item>),
    Close,
}

/// Failure state shared with the worker thread
#[derive(Debug, Default)]
enum Problem {
    #[default]
    None,
    /// Failed, not yet handed to the caller
    Pending(StorageError),
    /// Already reported once; later calls get the message only
    Reported(String),
}

impl Problem {
    fn record(&mut self, err: StorageError) {
        if matches!(self, Problem::None) {
            *self = Problem::Pending(err);
        }
    }

    fn check(&mut self) -> Result<()> {
        match std::mem::take(self) {
            Problem::None => Ok(()),
            Problem::Pending(err) => {
                *self = Problem::Reported(err.to_string());
                Err(err)
            }
            Problem::Reported(message) => {
                let err = StorageError::worker(format!("writer previously failed: {}", message));
                *self = Problem::Reported(message);
                Err(err)
            }
        }
    }
}

/// Sink that batches items and writes them on a background thread
///
/// `close` flushes the last batch, waits for the worker and then closes the
/// inner sink. Dropping the writer without `close` stops the worker without
/// closing the inner sink, so an aborted run never commits.
pub struct BufferedItemWriter {
    config: BatchConfig,
    batch: Vec<Item>,
    batch_chars: usize,
    sender: Option<SyncSender<Message>>,
    worker: Option<thread::JoinHandle<()>>,
    problem: Arc<Mutex<Problem>>,
}

impl BufferedItemWriter {
    /// Wrap `sink` with the default batching limits
    pub fn new<W>(sink: W) -> Self
    where
        W: TargetGraphSink + 'static,
    {
        Self::spawn(sink, BatchConfig::default())
    }

    /// Wrap `sink` with explicit batching limits
    pub fn with_config<W>(sink: W, config: BatchConfig) -> Result<Self>
    where
        W: TargetGraphSink + 'static,
    {
        config.validate()?;
        Ok(Self::spawn(sink, config))
    }

    fn spawn<W>(sink: W, config: BatchConfig) -> Self
    where
        W: TargetGraphSink + 'static,
    {
        let (sender, receiver) = sync_channel(config.pipe_length);
        let problem = Arc::new(Mutex::new(Problem::None));

        let worker_problem = problem.clone();
        let worker = thread::spawn(move || {
            Self::process_batches(sink, receiver, worker_problem);
        });

        Self {
            config,
            batch: Vec::new(),
            batch_chars: 0,
            sender: Some(sender),
            worker: Some(worker),
            problem,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn process_batches<W: TargetGraphSink>(
        mut sink: W,
        receiver: Receiver<Message>,
        problem: Arc<Mutex<Problem>>,
    ) {
        let mut failed = false;

        for message in receiver {
            match message {
                Message::Batch(items) => {
                    if failed {
                        continue;
                    }
                    let count = items.len();
                    match sink.store_all(items) {
                        Ok(()) => debug!(count, "Committed item batch"),
                        Err(err) => {
                            warn!(error = %err, count, "Item batch failed");
                            problem.lock().record(err);
                            failed = true;
                        }
                    }
                }
                Message::Close => {
                    if !failed {
                        if let Err(err) = sink.close() {
                            warn!(error = %err, "Closing inner sink failed");
                            problem.lock().record(err);
                        }
                    }
                    break;
                }
            }
        }
    }

    fn check_problem(&self) -> Result<()> {
        self.problem.lock().check()
    }

    fn flush(&mut self) -> Result<()> {
        self.check_problem()?;
        if self.batch.is_empty() {
            return Ok(());
        }

        let batch = std::mem::take(&mut self.batch);
        self.batch_chars = 0;

        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| StorageError::writer_closed("store after close"))?;
        sender
            .send(Message::Batch(batch))
            .map_err(|_| StorageError::worker("background writer stopped"))
    }

    fn join_worker(&mut self) -> Result<()> {
        if let Some(handle) = self.worker.take() {
            handle
                .join()
                .map_err(|_| StorageError::worker("background writer panicked"))?;
        }
        Ok(())
    }
}

impl TargetGraphSink for BufferedItemWriter {
    fn store(&mut self, item: Item) -> Result<()> {
        self.check_problem()?;
        if self.sender.is_none() {
            return Err(StorageError::writer_closed("store after close"));
        }

        self.batch_chars += item.estimated_size();
        self.batch.push(item);

        if self.batch.len() >= self.config.batch_size
            || self.batch_chars >= self.config.batch_char_size
        {
            self.flush()?;
        }
        Ok(())
    }

    fn store_all(&mut self, items: Vec<Item>) -> Result<()> {
        for item in items {
            self.store(item)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.sender.is_none() {
            return self.check_problem();
        }

        let flushed = self.flush();
        if let Some(sender) = self.sender.take() {
            if flushed.is_ok() {
                // A send error means the worker is gone; join reports it.
                let _ = sender.send(Message::Close);
            }
        }
        self.join_worker()?;

        flushed?;
        self.check_problem()
    }
}

impl Drop for BufferedItemWriter {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Background writer panicked");
            }
        }
    }
}
