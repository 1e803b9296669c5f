// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::checksum::{self, ChecksumError};
use crate::config::UploaderConfig;
use crate::credentials::CredentialSupplier;
use crate::error::UploadError;
use crate::executor::TransferExecutor;
use crate::metadata::LogMetadata;
use crate::request::{Payload, RequestAssembler};
use crate::retry::RetryPolicy;
use crate::transport::{Connector, ReqwestConnector};

/// Uploads finished logs to the log-ingestion service.
///
/// Every call is self-contained: it computes the checksum (unless one is
/// given), assembles the request, opens its own transport and runs the
/// attempts. Concurrent calls share only this immutable configuration.
#[derive(Clone)]
pub struct LogUploader {
    assembler: RequestAssembler,
    executor: TransferExecutor,
    connector: Arc<dyn Connector>,
}

impl LogUploader {
    pub fn new(
        config: &UploaderConfig,
        credentials: CredentialSupplier,
    ) -> Result<Self, UploadError> {
        let connector = ReqwestConnector::new(config.timeout, config.https_proxy.clone());
        Self::with_connector(config, credentials, Arc::new(connector))
    }

    pub fn with_connector(
        config: &UploaderConfig,
        credentials: CredentialSupplier,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, UploadError> {
        config.validate()?;
        let upload_url = config.upload_url()?;
        Ok(Self {
            assembler: RequestAssembler::new(upload_url),
            executor: TransferExecutor::new(
                RetryPolicy::new(config.max_retries, config.delay),
                credentials,
            ),
            connector,
        })
    }

    /// Replaces the request assembler, e.g. to pin the multipart boundary.
    #[must_use]
    pub fn with_assembler(mut self, assembler: RequestAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Uploads a log file, reading it once first to compute its checksum.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        metadata: &LogMetadata,
    ) -> Result<(), UploadError> {
        let path = path.as_ref().to_path_buf();
        let md5sum = file_md5(path.clone()).await?;
        self.upload_file_with_checksum(path, metadata, &md5sum).await
    }

    /// Uploads a log file with a checksum the caller already computed.
    pub async fn upload_file_with_checksum(
        &self,
        path: impl AsRef<Path>,
        metadata: &LogMetadata,
        md5sum: &str,
    ) -> Result<(), UploadError> {
        let payload = Payload::File(path.as_ref().to_path_buf());
        self.upload(&payload, metadata, md5sum).await
    }

    /// Uploads an in-memory log.
    pub async fn upload_string(
        &self,
        log: &str,
        metadata: &LogMetadata,
    ) -> Result<(), UploadError> {
        let md5sum = checksum::compute_md5(log.as_bytes())?.to_hex();
        self.upload_string_with_checksum(log, metadata, &md5sum).await
    }

    /// Uploads an in-memory log with a checksum the caller already computed.
    pub async fn upload_string_with_checksum(
        &self,
        log: &str,
        metadata: &LogMetadata,
        md5sum: &str,
    ) -> Result<(), UploadError> {
        let payload = Payload::Text(log.to_string());
        self.upload(&payload, metadata, md5sum).await
    }

    async fn upload(
        &self,
        payload: &Payload,
        metadata: &LogMetadata,
        md5sum: &str,
    ) -> Result<(), UploadError> {
        let request = self.assembler.assemble(metadata, payload, md5sum).await?;

        // Dropped on every return path below, releasing its connections.
        let transport = self.connector.connect().map_err(UploadError::Transport)?;
        let result = self.executor.execute(transport.as_ref(), &request).await;

        if result.is_ok() {
            debug!(
                logger_name = metadata.logger_name(),
                tag = metadata.tag(),
                "log uploaded"
            );
        }
        result
    }
}

async fn file_md5(path: PathBuf) -> Result<String, UploadError> {
    let digest = tokio::task::spawn_blocking(move || checksum::compute_file_md5(&path))
        .await
        .map_err(|e| ChecksumError::Io(std::io::Error::other(e)))??;
    Ok(digest.to_hex())
}
