//! Bounded-wait decorator.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use access::AccessError;

/// Races `call` against a hard deadline.
///
/// The call is spawned as an independent task; if the timer fires first the
/// caller gets [`AccessError::Timeout`] immediately while the task runs on
/// detached — the in-flight work is NOT cancelled, its socket is held until
/// it naturally completes, and its eventual result is discarded. Only
/// decorate idempotent operations (reads) with this: a timed-out write may
/// still mutate remote state.
pub async fn with_deadline<T, F>(limit: Duration, call: F) -> Result<T, AccessError>
where
    F: Future<Output = Result<T, AccessError>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(call);
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(AccessError::Transport {
            message: format!("bounded call aborted: {join}"),
        }),
        Err(_elapsed) => {
            warn!(?limit, "bounded call exceeded its deadline, abandoning in-flight work");
            Err(AccessError::Timeout { limit })
        }
    }
}
