// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::Url;
use std::env;
use std::time::Duration;

use crate::error::UploadError;

/// Path of the upload endpoint, resolved against the root of the base URL.
pub const UPLOAD_PATH: &str = "/final-log/upload";

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_DELAY_SECS: u64 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for a [`crate::LogUploader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Base URL of the log-ingestion service
    pub base_url: String,
    /// Number of retries after a connection-level failure
    pub max_retries: u32,
    /// Backoff unit; retry `n` waits `n * delay`
    pub delay: Duration,
    /// Timeout for each attempt
    pub timeout: Duration,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
}

impl UploaderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            https_proxy: None,
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, UploadError> {
        let base_url = env::var("LOG_UPLOAD_URL").map_err(|_| {
            UploadError::Config("LOG_UPLOAD_URL environment variable is not set".to_string())
        })?;
        let max_retries = env::var("LOG_UPLOAD_MAX_RETRIES")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let delay_secs = env::var("LOG_UPLOAD_DELAY_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_DELAY_SECS);
        let timeout_secs = env::var("LOG_UPLOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let https_proxy = env::var("LOG_UPLOAD_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();

        let config = Self {
            base_url,
            max_retries,
            delay: Duration::from_secs(delay_secs),
            timeout: Duration::from_secs(timeout_secs),
            https_proxy,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), UploadError> {
        self.upload_url()?;

        if self.timeout.is_zero() {
            return Err(UploadError::Config(
                "upload timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_retries > 0 && self.delay.is_zero() {
            return Err(UploadError::Config(
                "retry delay must be greater than 0 when retries are enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// `base_url` with its path replaced by [`UPLOAD_PATH`].
    pub fn upload_url(&self) -> Result<Url, UploadError> {
        let base = Url::parse(self.base_url.trim()).map_err(|e| {
            UploadError::Config(format!("invalid base URL '{}': {e}", self.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(UploadError::Config(format!(
                "base URL must be http or https, got '{}'",
                base.scheme()
            )));
        }
        base.join(UPLOAD_PATH)
            .map_err(|e| UploadError::Config(format!("invalid upload URL: {e}")))
    }
}
