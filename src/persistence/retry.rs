//! Bounded retry for idempotent writes

use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

/// How a retried operation ended when it did not succeed
#[derive(Debug)]
pub enum RetryFailure<E> {
    /// Transient failures on every attempt
    Exhausted { attempts: u32, last: E },
    /// A failure that is not worth retrying
    Fatal(E),
}

/// Retry policy for writes. Reads are never retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Sleep before retry `n` is `backoff * n`
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Run `op` until it succeeds, fails fatally, or the retries run out.
    ///
    /// Blocks the calling thread between attempts.
    pub fn run<T, E, F, P>(&self, what: &str, mut op: F, is_transient: P) -> Result<T, RetryFailure<E>>
    where
        F: FnMut() -> Result<T, E>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut retries = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if !is_transient(&e) => return Err(RetryFailure::Fatal(e)),
                Err(e) if retries >= self.max_retries => {
                    return Err(RetryFailure::Exhausted {
                        attempts: retries + 1,
                        last: e,
                    })
                }
                Err(e) => {
                    retries += 1;
                    warn!("{} failed ({}), retry {}/{}", what, e, retries, self.max_retries);
                    if !self.backoff.is_zero() {
                        std::thread::sleep(self.backoff * retries);
                    }
                }
            }
        }
    }
}
