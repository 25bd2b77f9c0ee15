//! Worker-pool sizing for the channel fan-out.
//!
//! Reads an environment variable override, validates it, and falls back to
//! the host's physical parallelism on an unset or unparsable value. The pool
//! built here is scoped to one orchestrator call, never installed globally,
//! so repeated or nested calls never contend over global rayon state.

use std::str::FromStr;

const WORKER_COUNT_ENV: &str = "NCC_KERNEL_NUM_WORKERS";

/// Resolve the maximum number of workers to use for one orchestrator call,
/// capped at `n_channels` since there is never useful work for more workers
/// than there are channels.
pub fn resolve_worker_count(n_channels: usize) -> usize {
    let available = std::env::var(WORKER_COUNT_ENV).map_or_else(
        |_| num_cpus::get_physical(),
        |s| {
            usize::from_str(&s).unwrap_or_else(|_| {
                log::warn!(
                    "{WORKER_COUNT_ENV} is not set to a valid integer ({s:?}); falling back to physical core count"
                );
                num_cpus::get_physical()
            })
        },
    );
    let resolved = available.clamp(1, n_channels.max(1));
    log::debug!(
        "worker pool sizing: requested={available} n_channels={n_channels} resolved={resolved}"
    );
    resolved
}

/// Build a scoped thread pool sized for one orchestrator call.
pub fn build_scoped_pool(n_channels: usize) -> rayon::ThreadPool {
    let workers = resolve_worker_count(n_channels);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("failed to build a {workers}-thread pool ({e}); falling back to 1 worker");
            rayon::ThreadPoolBuilder::new()
                .num_threads(1)
                .build()
                .expect("single-threaded rayon pool must always build")
        })
}
