// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use tracing::{debug, error, warn};

use crate::credentials::CredentialSupplier;
use crate::error::UploadError;
use crate::request::UploadRequest;
use crate::response;
use crate::retry::{RetryDecision, RetryPolicy};
use crate::transport::Transport;

/// Sends an [`UploadRequest`] until it is answered, retrying connection-level
/// failures according to a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct TransferExecutor {
    retry_policy: RetryPolicy,
    credentials: CredentialSupplier,
}

impl TransferExecutor {
    pub fn new(retry_policy: RetryPolicy, credentials: CredentialSupplier) -> Self {
        Self {
            retry_policy,
            credentials,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Runs the attempts for one upload.
    ///
    /// Attempts never overlap. The credential supplier is asked again before
    /// every attempt so a token that expired during backoff is replaced.
    pub async fn execute(
        &self,
        transport: &dyn Transport,
        request: &UploadRequest,
    ) -> Result<(), UploadError> {
        let mut retries: u32 = 0;

        loop {
            let attempt = retries + 1;
            let authorization = self.credentials.get_credential().await;
            let http_request = request.to_http_request(&authorization)?;

            debug!(attempt, url = %request.url(), "sending log upload");
            let err = match transport.send(http_request).await {
                Ok(resp) => return response::interpret(resp).await,
                Err(err) => err,
            };

            match self.retry_policy.decide(retries, &err) {
                RetryDecision::Retry(delay) => {
                    retries += 1;
                    warn!(
                        attempt,
                        delay_secs = delay.as_secs_f64(),
                        "log upload attempt failed, retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Exhausted => {
                    error!(attempts = attempt, "log upload failed, retries exhausted: {err}");
                    return Err(UploadError::TransportExhausted {
                        attempts: attempt,
                        source: err,
                    });
                }
                RetryDecision::Fatal => {
                    error!(attempt, "log upload failed: {err}");
                    return Err(UploadError::Transport(err));
                }
            }
        }
    }
}
