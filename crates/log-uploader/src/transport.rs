// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport seam.
//!
//! A [`Connector`] opens a fresh [`Transport`] for each upload call. The
//! transport is used for every attempt of that call and dropped with it, so
//! connection pools never outlive the upload that created them.

use async_trait::async_trait;
use reqwest::{ClientBuilder, Request, Response};
use std::error::Error;
use std::time::Duration;
use tracing::debug;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Failure to complete an HTTP exchange.
///
/// A received response, whatever its status, is never a `TransportError`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connect, TLS, timeout, reset or body I/O failure. Retryable.
    #[error("connection error: {0}")]
    Connection(#[source] BoxError),

    /// The client or request could not be built, or the redirect policy
    /// refused the exchange. Not retryable.
    #[error("request error: {0}")]
    Request(#[source] BoxError),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() || err.is_redirect() {
            Self::Request(Box::new(err))
        } else {
            Self::Connection(Box::new(err))
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one HTTP exchange.
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

pub trait Connector: Send + Sync {
    /// Opens a transport scoped to a single upload call.
    fn connect(&self) -> Result<Box<dyn Transport>, TransportError>;
}

/// `reqwest`-backed transport.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        Ok(self.client.execute(request).await?)
    }
}

/// Builds a new `reqwest::Client` per upload call.
#[derive(Debug, Clone)]
pub struct ReqwestConnector {
    timeout: Duration,
    https_proxy: Option<String>,
}

impl ReqwestConnector {
    pub fn new(timeout: Duration, https_proxy: Option<String>) -> Self {
        Self {
            timeout,
            https_proxy,
        }
    }
}

impl Connector for ReqwestConnector {
    fn connect(&self) -> Result<Box<dyn Transport>, TransportError> {
        let client = build_client(self.https_proxy.as_deref(), self.timeout)
            .map_err(TransportError::Request)?;
        debug!(timeout_secs = self.timeout.as_secs_f64(), "opened upload transport");
        Ok(Box::new(ReqwestTransport { client }))
    }
}

fn create_reqwest_client_builder() -> ClientBuilder {
    reqwest::Client::builder().use_rustls_tls()
}

pub fn build_client(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, BoxError> {
    let mut builder = create_reqwest_client_builder().timeout(timeout);
    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }
    Ok(builder.build()?)
}
