//! Bounded polling for a video conference join link.
//!
//! Calendars that create a conference asynchronously return the event before
//! the join link exists. The link is polled a fixed number of times at a
//! fixed interval; if it never shows up the booking still succeeds with an
//! empty link.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::GatewayResult;

/// Polling policy for the join link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinLinkPoll {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for JoinLinkPoll {
    fn default() -> Self {
        Self {
            attempts: Self::DEFAULT_ATTEMPTS,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

impl JoinLinkPoll {
    pub const DEFAULT_ATTEMPTS: u32 = 5;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Polls `fetch` until it yields a non-empty link or attempts run out.
    ///
    /// Each attempt sleeps `interval` first. Fetch errors are logged and
    /// count as an attempt. Returns an empty string when no link appeared.
    pub async fn run<F, Fut>(&self, mut fetch: F) -> String
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = GatewayResult<Option<String>>>,
    {
        for attempt in 1..=self.attempts {
            tokio::time::sleep(self.interval).await;

            match fetch(attempt).await {
                Ok(Some(link)) if !link.is_empty() => {
                    debug!(attempt, "join link ready");
                    return link;
                }
                Ok(_) => debug!(attempt, "join link not ready yet"),
                Err(e) => debug!(attempt, error = %e, "join link poll failed"),
            }
        }

        debug!(attempts = self.attempts, "join link did not materialize");
        String::new()
    }
}
