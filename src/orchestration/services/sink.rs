//! Append-only output channel shared by the orchestrator and the generation
//! loop, with a single consumer reading in emission order.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use crate::orchestration::domain::StreamEvent;

/// Writer half of a run's event channel.
///
/// The sink is not `Clone` and [`EventSink::finish`] consumes it, so a run
/// can terminate its stream only once. A sink dropped during a panic emits
/// `done` on the way out; an ordinary drop closes the stream silently.
#[derive(Debug)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl EventSink {
    /// Creates a connected sink and stream.
    #[must_use]
    pub fn channel() -> (Self, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self { tx },
            EventStream {
                inner: UnboundedReceiverStream::new(rx),
            },
        )
    }

    /// Appends an event. A disconnected client is not an error; the run
    /// carries on so history still reaches the store.
    pub fn emit(&self, event: StreamEvent) {
        if self.tx.send(event).is_err() {
            debug!("event stream receiver dropped");
        }
    }

    /// Emits the terminal `done` event and closes the channel.
    pub fn finish(self) {
        self.emit(StreamEvent::Done);
    }
}

impl Drop for EventSink {
    /// A run that panics still terminates its stream.
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!("run panicked; closing event stream");
            self.emit(StreamEvent::Done);
        }
    }
}

/// Reader half of a run's event channel.
#[derive(Debug)]
pub struct EventStream {
    inner: UnboundedReceiverStream<StreamEvent>,
}

impl Stream for EventStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn delivers_events_in_emission_order_then_closes() {
        let (sink, stream) = EventSink::channel();
        sink.emit(StreamEvent::TokenDelta {
            text: "Hel".to_owned(),
        });
        sink.emit(StreamEvent::TokenDelta {
            text: "lo".to_owned(),
        });
        sink.finish();

        let events: Vec<StreamEvent> = stream.collect().await;
        assert_eq!(events.len(), 3);
        assert!(events.last().is_some_and(StreamEvent::is_done));
    }

    #[rstest]
    #[tokio::test]
    async fn plain_drop_closes_without_done() {
        let (sink, stream) = EventSink::channel();
        sink.emit(StreamEvent::TokenDelta {
            text: "partial".to_owned(),
        });
        drop(sink);

        let events: Vec<StreamEvent> = stream.collect().await;
        assert_eq!(events.len(), 1);
        assert!(!events.iter().any(StreamEvent::is_done));
    }

    #[rstest]
    #[tokio::test]
    async fn panicking_holder_still_emits_done() {
        let (sink, stream) = EventSink::channel();
        let crashed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            sink.emit(StreamEvent::TokenDelta {
                text: "partial".to_owned(),
            });
            panic!("executor crashed");
        }));
        assert!(crashed.is_err());

        let events: Vec<StreamEvent> = stream.collect().await;
        assert_eq!(events.len(), 2);
        assert!(events.last().is_some_and(StreamEvent::is_done));
    }

    #[rstest]
    fn emitting_after_receiver_dropped_is_harmless() {
        let (sink, stream) = EventSink::channel();
        drop(stream);
        sink.emit(StreamEvent::Done);
    }
}
