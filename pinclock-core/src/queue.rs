//! Bounded event queue shared between an interrupt producer and a task consumer

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use static_cell::StaticCell;

#[cfg(feature = "embassy-time")]
use crate::hal::Duration;
use crate::types::Pipeline;

/// Result of a push attempted from interrupt context
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PushOutcome {
    /// Item accepted; `woke_consumer` is set when the queue was empty, i.e. a
    /// consumer blocked in `pop` becomes ready
    Queued { woke_consumer: bool },
    /// Queue was full and the item was discarded
    Dropped,
}

impl PushOutcome {
    pub const fn is_queued(&self) -> bool {
        matches!(self, PushOutcome::Queued { .. })
    }

    pub const fn woke_consumer(&self) -> bool {
        matches!(self, PushOutcome::Queued { woke_consumer: true })
    }
}

/// Fixed-capacity FIFO mailbox
///
/// `push` never blocks and never allocates, so it may be called from an
/// interrupt handler. The pop operations suspend the calling task only.
pub struct EventQueue<T, const N: usize> {
    channel: Channel<CriticalSectionRawMutex, T, N>,
}

impl<T, const N: usize> EventQueue<T, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without blocking; returns false and drops `item` when full
    pub fn push(&self, item: T) -> bool {
        self.channel.try_send(item).is_ok()
    }

    /// Enqueue without blocking and report whether a waiting consumer was woken
    pub fn push_from_isr(&self, item: T) -> PushOutcome {
        let was_empty = self.channel.is_empty();
        if self.push(item) {
            PushOutcome::Queued { woke_consumer: was_empty }
        } else {
            PushOutcome::Dropped
        }
    }

    /// Dequeue the oldest item if one is ready
    pub fn try_pop(&self) -> Option<T> {
        self.channel.try_receive().ok()
    }

    /// Wait as long as it takes for the next item
    pub async fn pop_wait(&self) -> T {
        self.channel.receive().await
    }

    /// Wait for the next item, giving up after `timeout` (`None` waits forever)
    #[cfg(feature = "embassy-time")]
    pub async fn pop(&self, timeout: Option<Duration>) -> Option<T> {
        match timeout {
            Some(limit) => embassy_time::with_timeout(limit, self.channel.receive())
                .await
                .ok(),
            None => Some(self.channel.receive().await),
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for EventQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Startup resource failures
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineError {
    /// The pipeline's queue storage could not be claimed
    QueueUnavailable(Pipeline),
}

#[cfg(feature = "std")]
impl core::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PipelineError::QueueUnavailable(p) => write!(f, "{} queue could not be created", p.name()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PipelineError {}

/// Claim the static storage for a pipeline's queue
///
/// Each cell yields a queue exactly once; a second claim fails and the
/// caller must not start the pipeline's consumer.
pub fn create_queue<T, const N: usize>(
    cell: &'static StaticCell<EventQueue<T, N>>,
    pipeline: Pipeline,
) -> Result<&'static EventQueue<T, N>, PipelineError> {
    match cell.try_init(EventQueue::new()) {
        Some(queue) => Ok(&*queue),
        None => {
            #[cfg(feature = "defmt")]
            defmt::error!("{} queue creation failed", pipeline.name());
            Err(PipelineError::QueueUnavailable(pipeline))
        }
    }
}

/// Where a consumer task gets its events from
#[allow(async_fn_in_trait)]
pub trait EventSource<T> {
    /// Suspend until the next event; `None` means the wait timed out
    async fn next_event(&mut self) -> Option<T>;
}

/// Consumer side of an [`EventQueue`]
pub struct QueueSource<'a, T, const N: usize> {
    queue: &'a EventQueue<T, N>,
    #[cfg(feature = "embassy-time")]
    timeout: Option<Duration>,
}

impl<'a, T, const N: usize> QueueSource<'a, T, N> {
    /// Source that waits forever for each event
    pub fn blocking(queue: &'a EventQueue<T, N>) -> Self {
        Self {
            queue,
            #[cfg(feature = "embassy-time")]
            timeout: None,
        }
    }

    /// Source that reports a timeout when no event arrives within `timeout`
    #[cfg(feature = "embassy-time")]
    pub fn with_timeout(queue: &'a EventQueue<T, N>, timeout: Duration) -> Self {
        Self {
            queue,
            timeout: Some(timeout),
        }
    }
}

impl<T, const N: usize> EventSource<T> for QueueSource<'_, T, N> {
    async fn next_event(&mut self) -> Option<T> {
        #[cfg(feature = "embassy-time")]
        {
            self.queue.pop(self.timeout).await
        }
        #[cfg(not(feature = "embassy-time"))]
        {
            Some(self.queue.pop_wait().await)
        }
    }
}
