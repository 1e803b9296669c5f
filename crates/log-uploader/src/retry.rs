// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::transport::TransportError;
use std::time::Duration;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then try again.
    Retry(Duration),
    /// The failure is retryable but every retry has been used.
    Exhausted,
    /// The failure must not be retried.
    Fatal,
}

/// Linear backoff over connection-level failures.
///
/// Retry `n` (1-indexed) waits `n * delay_unit`, so a 10s unit gives 10s,
/// 20s, 30s, ... At most `max_retries + 1` attempts are made. Responses that
/// reached the caller are never retried: without an idempotency key a second
/// POST could be ingested twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay_unit: Duration) -> Self {
        Self {
            max_retries,
            delay_unit,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay_unit(&self) -> Duration {
        self.delay_unit
    }

    /// Wait before retry number `retry` (1-indexed).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.delay_unit.saturating_mul(retry)
    }

    /// Decides what follows a failure, given how many retries were already made.
    pub fn decide(&self, retries_done: u32, err: &TransportError) -> RetryDecision {
        if !err.is_retryable() {
            RetryDecision::Fatal
        } else if retries_done < self.max_retries {
            RetryDecision::Retry(self.backoff(retries_done + 1))
        } else {
            RetryDecision::Exhausted
        }
    }
}
