// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Bounded re-polling for upstream data that is still being computed.
///
/// GitHub answers statistics endpoints with `202 Accepted` until the numbers
/// are cached. The helper here repeats an operation a fixed number of times
/// with a fixed delay while its result is still pending, then returns
/// whatever the last attempt produced.
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for pending-result re-polling.
#[derive(Debug, Clone,)]
pub struct RetryConfig
{
    /// Total number of attempts including the first one (default: 2).
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds (default: 2000).
    pub delay_ms:     u64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 2, delay_ms: 2000,
        }
    }
}

impl RetryConfig
{
    /// Default attempt budget (a single re-poll) after `delay`.
    pub fn once_after(delay: Duration,) -> Self
    {
        Self {
            delay_ms: u64::try_from(delay.as_millis(),).unwrap_or(u64::MAX,), ..Self::default()
        }
    }
}

/// Runs `f` until `is_pending` rejects its result or attempts run out.
///
/// The last result is returned even when it is still pending; callers decide
/// how to report that.
///
/// # Arguments
///
/// * `config` - Attempt budget and delay
/// * `operation_name` - Name of the operation for logging
/// * `is_pending` - Predicate selecting results worth another attempt
/// * `f` - Async operation to repeat
///
/// # Example
///
/// ```no_run
/// use repo_insights::retry::{RetryConfig, repoll_while_pending};
///
/// # async fn example() {
/// let config = RetryConfig::default();
/// let status = repoll_while_pending(&config, "stats", |status: &u16| *status == 202, || async {
///     200u16
/// },)
/// .await;
/// assert_eq!(status, 200);
/// # }
/// ```
pub async fn repoll_while_pending<F, Fut, P, T,>(
    config: &RetryConfig,
    operation_name: &str,
    is_pending: P,
    mut f: F,
) -> T
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = T,>,
    P: Fn(&T,) -> bool,
{
    let mut attempt = 1;

    loop {
        let result = f().await;

        if !is_pending(&result,) {
            if attempt > 1 {
                debug!("{} became available on attempt {}", operation_name, attempt);
            }
            return result;
        }

        if attempt >= config.max_attempts.max(1,) {
            warn!("{} still pending after {} attempts", operation_name, attempt);
            return result;
        }

        debug!(
            "{} pending on attempt {}/{}. Re-polling in {}ms...",
            operation_name, attempt, config.max_attempts, config.delay_ms
        );

        sleep(Duration::from_millis(config.delay_ms,),).await;
        attempt += 1;
    }
}
