//! Concurrent trial runner.
//!
//! [`run_trials`] maps `0..n` through an async closure with at most
//! `concurrency` trials in flight, and collects every outcome. It knows
//! nothing about games; the harness layers policy on top.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Default concurrency: the machine's available parallelism.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Run `n` independent trials on the tokio runtime.
///
/// Each trial is spawned as its own task and receives its index. Results
/// come back in completion order, which is unrelated to the index. A
/// trial that panics is reported through `on_panic` instead of tearing
/// down the batch.
pub async fn run_trials<T, E, F, Fut>(
    n: usize,
    concurrency: usize,
    trial: F,
    on_panic: impl Fn(tokio::task::JoinError) -> E,
) -> Vec<Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut set = JoinSet::new();

    for index in 0..n {
        let permits = permits.clone();
        let fut = trial(index);
        set.spawn(async move {
            // The semaphore is never closed, so acquire cannot fail.
            let _permit = permits.acquire_owned().await;
            debug!("Trial {index} started");
            fut.await
        });
    }

    let mut results = Vec::with_capacity(n);
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!("Trial task failed to join: {e}");
                results.push(Err(on_panic(e)));
            }
        }
    }
    results
}
