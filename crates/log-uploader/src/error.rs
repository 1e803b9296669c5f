// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::checksum::ChecksumError;
use crate::transport::TransportError;

/// Coarse classification of an [`UploadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    Checksum,
    Payload,
    InvalidRequest,
    Transport,
    TransportExhausted,
    ServerRejection,
    ResponseDecoding,
    Config,
}

/// The single failure type returned by an upload call.
///
/// Nothing here is retried by the caller-facing API; only connection-level
/// failures are retried internally, and [`UploadError::TransportExhausted`]
/// reports that those retries ran out.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("could not compute log checksum: {0}")]
    Checksum(#[from] ChecksumError),

    #[error("could not read log payload: {0}")]
    Payload(#[source] std::io::Error),

    #[error("invalid request header: {0}")]
    InvalidHeader(String),

    #[error("failed to upload log: {0}")]
    Transport(#[source] TransportError),

    #[error("failed to upload log after {attempts} attempts: {source}")]
    TransportExhausted {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("failed to upload log, status {status} message: {message}")]
    ServerRejection { status: u16, message: String },

    #[error("failed to read upload response: {0}")]
    ResponseDecoding(#[source] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl UploadError {
    pub fn kind(&self) -> UploadErrorKind {
        match self {
            Self::Checksum(_) => UploadErrorKind::Checksum,
            Self::Payload(_) => UploadErrorKind::Payload,
            Self::InvalidHeader(_) => UploadErrorKind::InvalidRequest,
            Self::Transport(_) => UploadErrorKind::Transport,
            Self::TransportExhausted { .. } => UploadErrorKind::TransportExhausted,
            Self::ServerRejection { .. } => UploadErrorKind::ServerRejection,
            Self::ResponseDecoding(_) => UploadErrorKind::ResponseDecoding,
            Self::Config(_) => UploadErrorKind::Config,
        }
    }

    /// HTTP status of a rejected upload.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerRejection { status, .. } => Some(*status),
            _ => None,
        }
    }
}
