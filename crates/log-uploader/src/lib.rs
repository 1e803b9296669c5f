// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client for shipping finished logs to the log-ingestion endpoint.
//!
//! An upload is a single sequential pipeline:
//!
//! 1. **Checksum**: the payload is read once through a [`ChecksumStream`] to
//!    compute its MD5 digest.
//! 2. **Assemble**: a [`RequestAssembler`] packs the digest, the
//!    [`LogMetadata`] fields and the payload into a gzip-compressed
//!    multipart body.
//! 3. **Transfer**: the [`TransferExecutor`] submits the request through a
//!    per-call [`Transport`], retrying connection-level failures with linear
//!    backoff according to the [`RetryPolicy`].
//! 4. **Interpret**: the response is accepted on `200` and rejected otherwise.
//!
//! [`LogUploader`] wires the four stages together.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod checksum;
pub mod config;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod metadata;
pub mod request;
pub mod response;
pub mod retry;
pub mod transport;
pub mod uploader;

pub use checksum::{ChecksumError, ChecksumStream, Md5Digest};
pub use config::UploaderConfig;
pub use credentials::CredentialSupplier;
pub use error::{UploadError, UploadErrorKind};
pub use executor::TransferExecutor;
pub use metadata::LogMetadata;
pub use request::{Payload, RequestAssembler, UploadRequest};
pub use retry::{RetryDecision, RetryPolicy};
pub use transport::{Connector, ReqwestConnector, Transport, TransportError};
pub use uploader::LogUploader;
