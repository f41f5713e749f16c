//! Buffering decorator
//!
//! Records queue up in memory and reach the inner sink in batches: either
//! when the queue hits capacity, or when no write has arrived for the flush
//! delay. The idle flush runs on a timer thread owned by the sink. Writers
//! only hold the queue lock while pushing; arming the timer is a channel send
//! made after the lock is released, so the timer can never block on a lock
//! held by the write that armed it.

use crate::core::logger::stderr_diagnostic;
use crate::core::{Record, Result, Sink, SinkError};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default number of records held before a forced flush
pub const DEFAULT_CAPACITY: usize = 100;

/// Default idle time before buffered records are flushed
pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_secs(5);

struct Queue {
    records: Vec<Record>,
    /// Bumped on every enqueue; ties timer commands to queue generations
    seq: u64,
}

struct Shared {
    inner: Arc<dyn Sink>,
    capacity: usize,
    queue: Mutex<Queue>,
    /// Serializes drains so batches reach the inner sink in enqueue order
    drain: Mutex<()>,
}

enum TimerCommand {
    /// Flush at `deadline` unless a later write or a flush supersedes it
    Arm { seq: u64, deadline: Instant },
    /// Everything up to `seq` has been flushed
    Disarm { seq: u64 },
    Shutdown,
}

impl Shared {
    /// Drain the queue into the inner sink
    ///
    /// Returns the queue generation that was drained. On the first inner
    /// failure the rest of the batch is discarded and the error returned.
    fn drain(&self) -> Result<Option<u64>> {
        let _drain = self.drain.lock();

        let (batch, seq) = {
            let mut queue = self.queue.lock();
            if queue.records.is_empty() {
                return Ok(None);
            }
            (std::mem::take(&mut queue.records), queue.seq)
        };

        for record in &batch {
            self.inner.write(record)?;
        }
        Ok(Some(seq))
    }
}

/// Decorator that batches writes to an inner sink
///
/// # Example
///
/// ```
/// use multisink_logger::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let memory = Arc::new(MemorySink::new());
/// let buffered = BufferedSink::new(memory.clone(), 3, Duration::from_secs(5)).unwrap();
/// let ctx = LogContext::new();
///
/// buffered.write(&Record::new(LogLevel::Info, "one", &ctx)).unwrap();
/// buffered.write(&Record::new(LogLevel::Info, "two", &ctx)).unwrap();
/// assert!(memory.is_empty());
///
/// buffered.write(&Record::new(LogLevel::Info, "three", &ctx)).unwrap();
/// assert_eq!(memory.len(), 3);
/// ```
pub struct BufferedSink {
    shared: Arc<Shared>,
    flush_delay: Duration,
    commands: Sender<TimerCommand>,
    timer: Mutex<Option<thread::JoinHandle<()>>>,
    closed: AtomicBool,
}

impl BufferedSink {
    /// Wrap `inner`, flushing at `capacity` records or after `flush_delay` idle
    ///
    /// A capacity of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns error if the flush timer thread cannot be spawned
    pub fn new(inner: Arc<dyn Sink>, capacity: usize, flush_delay: Duration) -> Result<Self> {
        let capacity = capacity.max(1);
        let shared = Arc::new(Shared {
            inner,
            capacity,
            queue: Mutex::new(Queue {
                records: Vec::with_capacity(capacity),
                seq: 0,
            }),
            drain: Mutex::new(()),
        });

        let (commands, receiver) = unbounded();
        let timer_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("buffered-sink-flush".to_string())
            .spawn(move || run_timer(timer_shared, receiver))
            .map_err(|e| {
                SinkError::io_operation("spawn flush timer", "Failed to start timer thread", e)
            })?;

        Ok(Self {
            shared,
            flush_delay,
            commands,
            timer: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
        })
    }

    /// Wrap `inner` with [`DEFAULT_CAPACITY`] and [`DEFAULT_FLUSH_DELAY`]
    pub fn with_defaults(inner: Arc<dyn Sink>) -> Result<Self> {
        Self::new(inner, DEFAULT_CAPACITY, DEFAULT_FLUSH_DELAY)
    }

    /// Number of records waiting for a flush
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().records.len()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn flush_delay(&self) -> Duration {
        self.flush_delay
    }

    fn send(&self, command: TimerCommand) {
        // Only fails once the timer has shut down, when there is nothing to arm
        let _ = self.commands.send(command);
    }

    fn flush_pending(&self) -> Result<()> {
        if let Some(seq) = self.shared.drain()? {
            self.send(TimerCommand::Disarm { seq });
        }
        Ok(())
    }

    fn stop_timer(&self) {
        self.send(TimerCommand::Shutdown);
        if let Some(handle) = self.timer.lock().take() {
            if handle.join().is_err() {
                stderr_diagnostic(format_args!(
                    "[LOGGER ERROR] Buffered sink flush timer panicked"
                ));
            }
        }
    }
}

fn run_timer(shared: Arc<Shared>, commands: Receiver<TimerCommand>) {
    let mut armed: Option<(u64, Instant)> = None;

    loop {
        let command = match armed {
            Some((_, deadline)) => commands.recv_deadline(deadline),
            None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match command {
            Ok(TimerCommand::Arm { seq, deadline }) => {
                if armed.map_or(true, |(current, _)| seq >= current) {
                    armed = Some((seq, deadline));
                }
            }
            Ok(TimerCommand::Disarm { seq }) => {
                if armed.is_some_and(|(current, _)| current <= seq) {
                    armed = None;
                }
            }
            Ok(TimerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                armed = None;
                if let Err(e) = shared.drain() {
                    stderr_diagnostic(format_args!(
                        "[LOGGER ERROR] Buffered sink idle flush failed: {}",
                        e
                    ));
                }
            }
        }
    }
}

impl Sink for BufferedSink {
    fn write(&self, record: &Record) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::closed(self.name()));
        }

        let (seq, full) = {
            let mut queue = self.shared.queue.lock();
            queue.records.push(record.clone());
            queue.seq += 1;
            (queue.seq, queue.records.len() >= self.shared.capacity)
        };

        // Every write postpones the idle flush
        self.send(TimerCommand::Arm {
            seq,
            deadline: Instant::now() + self.flush_delay,
        });

        if full {
            self.flush_pending()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.flush_pending()?;
        self.shared.inner.flush()
    }

    /// Flush what is queued, stop the timer and close the inner sink
    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let flushed = self.flush_pending();
        self.stop_timer();
        // Inner sink is closed even when the final flush failed
        let closed = self.shared.inner.close();
        flushed?;
        closed
    }

    fn name(&self) -> &str {
        "buffered"
    }
}

impl Drop for BufferedSink {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            if let Err(e) = self.flush_pending() {
                stderr_diagnostic(format_args!(
                    "[LOGGER ERROR] Failed to flush buffered records on drop: {}",
                    e
                ));
            }
        }
        self.stop_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogContext, LogLevel};
    use crate::sinks::MemorySink;
    use std::sync::atomic::AtomicUsize;

    fn record(message: &str) -> Record {
        Record::new(LogLevel::Info, message, &LogContext::new())
    }

    /// Accepts `allow` writes, then fails every write
    struct FlakySink {
        allow: usize,
        seen: AtomicUsize,
        memory: MemorySink,
    }

    impl Sink for FlakySink {
        fn write(&self, record: &Record) -> Result<()> {
            if self.seen.fetch_add(1, Ordering::SeqCst) >= self.allow {
                return Err(SinkError::write(
                    "flaky",
                    std::io::Error::new(std::io::ErrorKind::Other, "unavailable"),
                ));
            }
            self.memory.write(record)
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[test]
    fn test_flushes_at_capacity_in_order() {
        let memory = Arc::new(MemorySink::new());
        let sink = BufferedSink::new(memory.clone(), 3, Duration::from_secs(5)).unwrap();

        sink.write(&record("message 1")).unwrap();
        sink.write(&record("message 2")).unwrap();
        assert!(memory.is_empty());
        assert_eq!(sink.pending(), 2);

        sink.write(&record("message 3")).unwrap();
        let messages: Vec<String> = memory
            .records()
            .iter()
            .map(|r| r.message().to_string())
            .collect();
        assert_eq!(messages, vec!["message 1", "message 2", "message 3"]);
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn test_idle_flush_after_delay() {
        let memory = Arc::new(MemorySink::new());
        let sink = BufferedSink::new(memory.clone(), 10, Duration::from_millis(50)).unwrap();

        sink.write(&record("idle 1")).unwrap();
        sink.write(&record("idle 2")).unwrap();
        assert!(memory.is_empty());

        thread::sleep(Duration::from_millis(400));
        assert_eq!(memory.len(), 2);
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn test_each_write_postpones_idle_flush() {
        let memory = Arc::new(MemorySink::new());
        let sink = BufferedSink::new(memory.clone(), 10, Duration::from_millis(500)).unwrap();

        sink.write(&record("first")).unwrap();
        thread::sleep(Duration::from_millis(300));
        sink.write(&record("second")).unwrap();
        thread::sleep(Duration::from_millis(300));

        // 600ms after the first write, but only 300ms after the second
        assert!(memory.is_empty());

        thread::sleep(Duration::from_millis(800));
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_explicit_flush() {
        let memory = Arc::new(MemorySink::new());
        let sink = BufferedSink::new(memory.clone(), 10, Duration::from_secs(5)).unwrap();

        sink.write(&record("Message 1")).unwrap();
        sink.write(&record("Message 2")).unwrap();
        sink.write(&record("Message 3")).unwrap();

        sink.flush().unwrap();
        assert_eq!(memory.len(), 3);

        // Flushing an empty queue is a no-op
        sink.flush().unwrap();
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn test_failed_flush_discards_remainder() {
        let flaky = Arc::new(FlakySink {
            allow: 1,
            seen: AtomicUsize::new(0),
            memory: MemorySink::new(),
        });
        let sink = BufferedSink::new(flaky.clone(), 3, Duration::from_secs(5)).unwrap();

        sink.write(&record("delivered")).unwrap();
        sink.write(&record("fails")).unwrap();
        let err = sink.write(&record("discarded")).unwrap_err();

        assert!(matches!(err, SinkError::Write { .. }));
        assert_eq!(flaky.memory.len(), 1);
        assert_eq!(flaky.memory.records()[0].message(), "delivered");
        assert_eq!(sink.pending(), 0);
        // Only the first two records were attempted
        assert_eq!(flaky.seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_close_flushes_and_rejects_writes() {
        let memory = Arc::new(MemorySink::new());
        let sink = BufferedSink::new(memory.clone(), 10, Duration::from_secs(5)).unwrap();

        sink.write(&record("pending")).unwrap();
        sink.close().unwrap();

        assert_eq!(memory.len(), 1);
        assert!(matches!(
            sink.write(&record("late")),
            Err(SinkError::Closed { .. })
        ));
        // Second close is a no-op
        sink.close().unwrap();
    }

    #[test]
    fn test_drop_flushes_pending() {
        let memory = Arc::new(MemorySink::new());
        {
            let sink = BufferedSink::new(memory.clone(), 10, Duration::from_secs(5)).unwrap();
            sink.write(&record("kept on drop")).unwrap();
        }
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_zero_capacity_flushes_every_write() {
        let memory = Arc::new(MemorySink::new());
        let sink = BufferedSink::new(memory.clone(), 0, Duration::from_secs(5)).unwrap();
        assert_eq!(sink.capacity(), 1);

        sink.write(&record("immediate")).unwrap();
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_concurrent_writers() {
        let memory = Arc::new(MemorySink::new());
        let sink = Arc::new(
            BufferedSink::new(memory.clone(), 7, Duration::from_millis(20)).unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..25 {
                        sink.write(&record(&format!("t{} m{}", t, i))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        sink.flush().unwrap();
        assert_eq!(memory.len(), 100);
    }

    /// Rejects every write and remembers whether it was closed
    #[derive(Default)]
    struct RejectingSink {
        closed: AtomicBool,
    }

    impl Sink for RejectingSink {
        fn write(&self, _record: &Record) -> Result<()> {
            Err(SinkError::write(
                "rejecting",
                std::io::Error::new(std::io::ErrorKind::Other, "unavailable"),
            ))
        }

        fn close(&self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "rejecting"
        }
    }

    #[test]
    fn test_close_closes_inner_even_when_final_flush_fails() {
        let inner = Arc::new(RejectingSink::default());
        let sink = BufferedSink::new(inner.clone(), 10, Duration::from_secs(5)).unwrap();

        sink.write(&record("never delivered")).unwrap();
        let err = sink.close().unwrap_err();

        assert!(matches!(err, SinkError::Write { .. }));
        assert!(inner.closed.load(Ordering::SeqCst));
        assert_eq!(sink.pending(), 0);
    }
}
