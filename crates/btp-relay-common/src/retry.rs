//! Generic backoff retry helper, used by CLI-adjacent I/O (config loading, RPC bootstrap)
//! that needs a couple of attempts before giving up — distinct from the Sender's own 1s
//! resend cadence, which is part of the relay protocol itself, not ambient plumbing.

use std::{thread::sleep, time::Duration};

use tracing::{error, warn};

/// Default maximum number of retries for ambient I/O calls (not relay protocol retries).
pub const DEFAULT_CALL_MAX_RETRIES: u16 = 4;

/// Runs a fallible operation with a backoff retry.
///
/// Retries `operation` up to `max_retries` times with delays increasing according to
/// `backoff`. Logs a warning on each failure and an error once retries are exhausted.
pub fn retry_with_backoff<R, E, F>(
    name: &str,
    max_retries: u16,
    backoff: &impl Backoff,
    operation: F,
) -> Result<R, E>
where
    F: FnMut() -> Result<R, E>,
    E: std::fmt::Debug,
{
    retry_with_backoff_inner(name, max_retries, backoff, operation, sleep)
}

/// Inner method, generic on the sleep function so tests don't have to actually wait.
fn retry_with_backoff_inner<R, E, F, S>(
    name: &str,
    max_retries: u16,
    backoff: &impl Backoff,
    mut operation: F,
    mut sleep_fn: S,
) -> Result<R, E>
where
    F: FnMut() -> Result<R, E>,
    E: std::fmt::Debug,
    S: FnMut(Duration),
{
    let mut delay = backoff.base_delay_ms();

    for attempt in 0..=max_retries {
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries => {
                warn!(
                    "attempt {} failed with {:?} while running {}, retrying in {:?}",
                    attempt + 1,
                    err,
                    name,
                    delay
                );
                sleep_fn(Duration::from_millis(delay));
                delay = backoff.next_delay_ms(delay);
            }
            Err(err) => {
                error!("max retries exceeded while running {}", name);
                return Err(err);
            }
        }
    }

    unreachable!()
}

pub trait Backoff {
    fn base_delay_ms(&self) -> u64;
    fn next_delay_ms(&self, curr_delay_ms: u64) -> u64;
}

/// Fixed-point exponential backoff: `multiplier / multiplier_base` scales the delay after
/// each attempt, avoiding floating-point math.
pub struct ExponentialBackoff {
    base_delay_ms: u64,
    multiplier: u64,
    multiplier_base: u64,
}

impl ExponentialBackoff {
    pub fn new(base_delay_ms: u64, multiplier: u64, multiplier_base: u64) -> Self {
        assert!(multiplier_base != 0);
        Self {
            base_delay_ms,
            multiplier,
            multiplier_base,
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            multiplier: 15,
            multiplier_base: 10,
        }
    }
}

impl Backoff for ExponentialBackoff {
    fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    fn next_delay_ms(&self, curr_delay_ms: u64) -> u64 {
        curr_delay_ms * self.multiplier / self.multiplier_base
    }
}
