//! Progress notifications for a running document.
//!
//! One [`ProgressEvent::Progress`] is emitted per completed chunk, then exactly one
//! [`ProgressEvent::Complete`] marker, then exactly one [`ProgressEvent::Summary`] carrying the
//! aggregate. Percentages count completed chunks only, failures included.

use futures_core::Stream;
use futures_util::{StreamExt, pin_mut};
use tokio::sync::mpsc;

use super::types::{AggregateSummary, ChunkResult};

/// Literal payload of the terminal marker.
pub const COMPLETION_MARKER: &str = "DONE";

/// A single observable notification on the progress channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Percentage of chunks completed, `1..=100`.
    Progress(u8),
    /// No further percentage events follow.
    Complete,
    /// The authoritative aggregate summary.
    Summary(String),
}

impl ProgressEvent {
    /// Wire payload: the integer percentage, the completion marker, or the summary text.
    pub fn payload(&self) -> String {
        match self {
            Self::Progress(percent) => percent.to_string(),
            Self::Complete => COMPLETION_MARKER.to_string(),
            Self::Summary(text) => text.clone(),
        }
    }
}

/// `ceil(completed / total * 100)` using integer arithmetic, capped at 100.
pub fn percent_complete(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total);
    let percent = (completed * 100).div_ceil(total);
    percent as u8
}

/// Turns chunk completions into percentage events and closes the sequence.
#[derive(Debug)]
pub struct ProgressEmitter {
    total: usize,
    completed: usize,
}

impl ProgressEmitter {
    /// Track progress over `total` chunks.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
        }
    }

    /// Count one finished chunk and return its percentage event.
    pub fn record_completion(&mut self) -> ProgressEvent {
        debug_assert!(self.completed < self.total, "more completions than chunks");
        self.completed = (self.completed + 1).min(self.total);
        ProgressEvent::Progress(percent_complete(self.completed, self.total))
    }

    /// Chunks counted so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Close the sequence: the terminal marker followed by the aggregate summary.
    ///
    /// Consumes the emitter so no percentage can follow the marker.
    pub fn finish(self, aggregate: &AggregateSummary) -> [ProgressEvent; 2] {
        debug_assert_eq!(self.completed, self.total, "finished before every chunk completed");
        [
            ProgressEvent::Complete,
            ProgressEvent::Summary(aggregate.text().to_string()),
        ]
    }
}

/// Best-effort delivery of events to one streaming consumer.
///
/// Once the consumer is gone, further events are dropped silently; the disconnect is logged
/// once.
pub struct EventSink {
    sender: mpsc::Sender<ProgressEvent>,
    document: String,
    connected: bool,
}

impl EventSink {
    /// Wrap the sending half of a progress channel for `document`.
    pub fn new(sender: mpsc::Sender<ProgressEvent>, document: impl Into<String>) -> Self {
        Self {
            sender,
            document: document.into(),
            connected: true,
        }
    }

    /// Deliver an event if the consumer is still listening.
    pub async fn send(&mut self, event: ProgressEvent) {
        if !self.connected {
            return;
        }
        if self.sender.send(event).await.is_err() {
            self.connected = false;
            tracing::info!(
                document = %self.document,
                "Progress consumer disconnected; finishing run without streaming"
            );
        }
    }

    /// Whether the consumer was still connected at the last send.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Drain chunk results, emitting one percentage event per result.
///
/// Returns the results in the order they arrived, which is chunk index order.
pub async fn relay_progress<S>(
    results: S,
    emitter: &mut ProgressEmitter,
    sink: &mut EventSink,
) -> Vec<ChunkResult>
where
    S: Stream<Item = ChunkResult>,
{
    pin_mut!(results);
    let mut collected = Vec::new();
    while let Some(result) = results.next().await {
        collected.push(result);
        sink.send(emitter.record_completion()).await;
    }
    collected
}
