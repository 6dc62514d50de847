//! Transfer session state machine and upload backpressure gate.
//!
//! # Phases
//!
//! ```text
//!            ┌──────────────► Direct ─────────┐
//!   Init ────┤                                ├──► Streaming ──► Done
//!            └──► AwaitingRedirect ───────────┘         │
//!                                                        └──────► Failed
//! ```
//!
//! Any phase can move to `Failed`. `Done` and `Failed` are terminal: once a
//! session reaches either, every further transition is a no-op. That is what
//! makes failure delivery exactly-once even when both the locate and the data
//! request fail, or a transport error races a remote error.
//!
//! # Gate
//!
//! [`GatedSource`] wraps the caller's byte source and refuses to poll it until
//! the owning session releases the paired [`GateHandle`]. The handle is not
//! cloneable and only the session holds it, so nothing else can start the
//! flow early.

use crate::error::WebHdfsError;
use bytes::Bytes;
use futures::stream::Stream;
use futures::task::AtomicWaker;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Phase of a transfer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing sent yet.
    Init,
    /// Locate request sent, waiting for the redirect decision.
    AwaitingRedirect,
    /// The locate request answered with data directly (downloads only).
    Direct,
    /// Payload is flowing.
    Streaming,
    /// Terminal success.
    Done,
    /// Terminal failure.
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

/// Lifecycle of one upload or download invocation.
///
/// Owned by exactly one session and never shared across invocations.
#[derive(Debug)]
pub struct TransferSession {
    label: &'static str,
    phase: Phase,
    logging: bool,
}

impl TransferSession {
    /// New session in `Init`. Transitions are traced only when `logging` is set.
    pub fn new(label: &'static str, logging: bool) -> Self {
        TransferSession {
            label,
            phase: Phase::Init,
            logging,
        }
    }

    pub fn logging(&self) -> bool {
        self.logging
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Move to a non-terminal phase. Returns false if the session already ended.
    pub fn advance(&mut self, next: Phase) -> bool {
        debug_assert!(!next.is_terminal(), "use finish() or fail()");
        if self.is_terminal() {
            return false;
        }
        if self.logging {
            tracing::debug!(session = self.label, from = ?self.phase, to = ?next, "transfer phase");
        }
        self.phase = next;
        true
    }

    /// Enter `Done`. Returns false if the session already ended.
    pub fn finish(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if self.logging {
            tracing::debug!(session = self.label, "transfer finished");
        }
        self.phase = Phase::Done;
        true
    }

    /// Enter `Failed`, handing the error back only on the first call.
    ///
    /// Later failures are logged and swallowed.
    pub fn fail(&mut self, err: WebHdfsError) -> Option<WebHdfsError> {
        if self.is_terminal() {
            if self.logging {
                tracing::debug!(session = self.label, error = %err, "dropping error after terminal state");
            }
            return None;
        }
        if self.logging {
            tracing::warn!(session = self.label, error = %err, "transfer failed");
        }
        self.phase = Phase::Failed;
        Some(err)
    }
}

#[derive(Debug, Default)]
struct GateInner {
    released: AtomicBool,
    waker: AtomicWaker,
}

/// Session-owned switch for a [`GatedSource`].
#[derive(Debug)]
pub struct GateHandle {
    inner: Arc<GateInner>,
}

impl GateHandle {
    /// Open the gate. Returns true only for the call that actually opened it.
    pub fn release(&self) -> bool {
        let first = !self.inner.released.swap(true, Ordering::AcqRel);
        if first {
            self.inner.waker.wake();
        }
        first
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }
}

/// Byte source held shut until its [`GateHandle`] is released.
///
/// Polling before release registers the waker and returns `Pending` without
/// touching the inner source.
pub struct GatedSource<S> {
    inner: S,
    gate: Arc<GateInner>,
}

impl<S> GatedSource<S> {
    /// Wrap `source` in a closed gate.
    pub fn new(source: S) -> (Self, GateHandle) {
        let gate = Arc::new(GateInner::default());
        let handle = GateHandle { inner: gate.clone() };
        (GatedSource { inner: source, gate }, handle)
    }
}

impl<S> Stream for GatedSource<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if !self.gate.released.load(Ordering::Acquire) {
            self.gate.waker.register(cx.waker());
            // release() may have run between the load and the register
            if !self.gate.released.load(Ordering::Acquire) {
                return Poll::Pending;
            }
        }
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::AtomicUsize;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_terminal_states_are_sticky() {
        let mut session = TransferSession::new("test", true);
        assert!(session.advance(Phase::AwaitingRedirect));
        assert!(session.advance(Phase::Streaming));
        assert!(session.finish());
        assert_eq!(session.phase(), Phase::Done);

        assert!(!session.finish());
        assert!(!session.advance(Phase::Streaming));
        assert!(session.fail(WebHdfsError::protocol("late")).is_none());
        assert_eq!(session.phase(), Phase::Done);
    }

    #[test]
    fn test_fail_is_exactly_once() {
        let mut session = TransferSession::new("test", true);
        assert!(session.fail(WebHdfsError::protocol("first")).is_some());
        assert!(session.fail(WebHdfsError::protocol("second")).is_none());
        assert!(!session.finish());
        assert_eq!(session.phase(), Phase::Failed);
    }

    #[test]
    fn test_gate_holds_source_until_released() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let source = futures::stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(b"abc"))]).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let (mut gated, handle) = GatedSource::new(source);
        let mut next = task::spawn(gated.next());

        assert_pending!(next.poll());
        assert_pending!(next.poll());
        assert_eq!(pulled.load(Ordering::SeqCst), 0);

        assert!(handle.release());
        assert!(next.is_woken());
        let item = assert_ready!(next.poll());
        assert_eq!(item.unwrap().unwrap(), Bytes::from_static(b"abc"));
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_gate_releases_once() {
        let (_gated, handle) = GatedSource::new(futures::stream::empty::<io::Result<Bytes>>());
        assert!(!handle.is_released());
        assert!(handle.release());
        assert!(!handle.release());
        assert!(handle.is_released());
    }

    /// Counts every event that reaches the subscriber.
    struct EventCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCounter {
        fn on_event(&self, _event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn events_for_lifecycle(logging: bool) -> usize {
        use tracing_subscriber::layer::SubscriberExt;

        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(EventCounter(count.clone()));
        tracing::subscriber::with_default(subscriber, || {
            let mut session = TransferSession::new("test", logging);
            session.advance(Phase::Streaming);
            session.fail(WebHdfsError::protocol("first"));
            session.fail(WebHdfsError::protocol("second"));
        });
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_logging_flag_silences_transitions() {
        assert_eq!(events_for_lifecycle(false), 0);
        assert_eq!(events_for_lifecycle(true), 3);
    }
}
