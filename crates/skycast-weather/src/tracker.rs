//! Latest-request-wins bookkeeping.
//!
//! Every request gets a ticket with a monotonically increasing id and its
//! own cancellation token. Starting a new request cancels the previous
//! ticket, and a result is only accepted while its ticket is the latest.

use std::future::Future;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Handle for one in-flight request
#[derive(Debug, Clone)]
pub struct RequestTicket {
    id: u64,
    token: CancellationToken,
}

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Result of running a request through the tracker
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The request was still the latest when it finished.
    Latest(T),
    /// A newer request started first; the result was discarded.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn into_latest(self) -> Option<T> {
        match self {
            Outcome::Latest(v) => Some(v),
            Outcome::Superseded => None,
        }
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    latest: u64,
    token: Option<CancellationToken>,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    state: Mutex<TrackerState>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, cancelling whichever one was latest before.
    pub fn begin(&self) -> RequestTicket {
        let mut state = self.state.lock();
        if let Some(previous) = state.token.take() {
            previous.cancel();
        }

        state.latest += 1;
        let token = CancellationToken::new();
        state.token = Some(token.clone());

        tracing::trace!(id = state.latest, "Request started");
        RequestTicket {
            id: state.latest,
            token,
        }
    }

    pub fn is_latest(&self, ticket: &RequestTicket) -> bool {
        self.state.lock().latest == ticket.id
    }

    /// Id of the most recently started request (0 before any).
    pub fn latest_id(&self) -> u64 {
        self.state.lock().latest
    }

    /// Hand back `value` only if `ticket` is still the latest request.
    pub fn accept<T>(&self, ticket: &RequestTicket, value: T) -> Option<T> {
        if self.is_latest(ticket) {
            Some(value)
        } else {
            tracing::debug!(
                id = ticket.id,
                latest = self.latest_id(),
                "Discarding stale response"
            );
            None
        }
    }

    /// Cancel the latest request; any result still in flight is discarded.
    pub fn cancel_all(&self) {
        let mut state = self.state.lock();
        if let Some(token) = state.token.take() {
            token.cancel();
        }
        state.latest += 1;
    }

    /// Run `request` under a fresh ticket, abandoning it as soon as a newer
    /// request starts.
    pub async fn run<T, F>(&self, request: F) -> Outcome<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.begin();
        self.run_with(&ticket, request).await
    }

    /// Like [`run`](Self::run) for a ticket the caller already holds.
    pub async fn run_with<T, F>(&self, ticket: &RequestTicket, request: F) -> Outcome<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = ticket.token.cancelled() => Outcome::Superseded,
            value = request => match self.accept(ticket, value) {
                Some(v) => Outcome::Latest(v),
                None => Outcome::Superseded,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_ids_increase() {
        let tracker = RequestTracker::new();
        let a = tracker.begin();
        let b = tracker.begin();
        let c = tracker.begin();
        assert!(a.id() < b.id() && b.id() < c.id());
        assert_eq!(tracker.latest_id(), c.id());
    }

    #[test]
    fn test_new_request_cancels_previous() {
        let tracker = RequestTracker::new();
        let first = tracker.begin();
        assert!(!first.is_cancelled());

        let second = tracker.begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_only_latest_is_accepted() {
        let tracker = RequestTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        assert_eq!(tracker.accept(&first, "old"), None);
        assert_eq!(tracker.accept(&second, "new"), Some("new"));
    }

    #[test]
    fn test_cancel_all_discards_in_flight() {
        let tracker = RequestTracker::new();
        let ticket = tracker.begin();
        tracker.cancel_all();

        assert!(ticket.is_cancelled());
        assert!(!tracker.is_latest(&ticket));
    }

    #[tokio::test]
    async fn test_run_returns_latest_value() {
        let tracker = RequestTracker::new();
        let outcome = tracker.run(async { 42 }).await;
        assert_eq!(outcome, Outcome::Latest(42));
    }

    #[tokio::test]
    async fn test_slow_request_superseded_by_fast_one() {
        let tracker = Arc::new(RequestTracker::new());

        let slow = {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                tracker
                    .run(async {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        "slow"
                    })
                    .await
            })
        };

        // Let the slow request take its ticket first
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fast = tracker.run(async { "fast" }).await;

        assert_eq!(fast, Outcome::Latest("fast"));
        assert_eq!(slow.await.unwrap(), Outcome::Superseded);
    }

    #[test]
    fn test_outcome_into_latest() {
        assert_eq!(Outcome::Latest(1).into_latest(), Some(1));
        assert_eq!(Outcome::<i32>::Superseded.into_latest(), None);
    }
}
