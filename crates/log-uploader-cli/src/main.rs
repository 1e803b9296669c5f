// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, process::ExitCode};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use log_uploader::{CredentialSupplier, LogMetadata, LogUploader, UploaderConfig};

const DEFAULT_LOGGER_NAME: &str = "log-uploader";

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = env::var("LOG_UPLOAD_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match UploaderConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating log uploader config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let credentials = match credentials_from_token(env::var("LOG_UPLOAD_TOKEN").ok()) {
        Some(c) => c,
        None => {
            error!("LOG_UPLOAD_TOKEN is not set, refusing to upload without credentials");
            return ExitCode::FAILURE;
        }
    };

    let uploader = match LogUploader::new(&config, credentials) {
        Ok(u) => u,
        Err(e) => {
            error!("Error creating log uploader: {e}");
            return ExitCode::FAILURE;
        }
    };

    let metadata = metadata_from_env();

    let result = match env::args().nth(1) {
        Some(path) => {
            debug!(path = %path, "uploading log file");
            uploader.upload_file(&path, &metadata).await
        }
        None => {
            let mut log = String::new();
            if let Err(e) = tokio::io::stdin().read_to_string(&mut log).await {
                error!("Failed to read log from stdin: {e}");
                return ExitCode::FAILURE;
            }
            debug!(bytes = log.len(), "uploading log from stdin");
            uploader.upload_string(&log, &metadata).await
        }
    };

    match result {
        Ok(()) => {
            info!(
                logger_name = metadata.logger_name(),
                tag = metadata.tag(),
                "Log uploaded"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = ?e.kind(), "{e}");
            ExitCode::FAILURE
        }
    }
}

/// The `Authorization` value to send; `None` when unset or blank.
fn credentials_from_token(token: Option<String>) -> Option<CredentialSupplier> {
    token
        .filter(|token| !token.trim().is_empty())
        .map(|token| CredentialSupplier::new(&token))
}

fn metadata_from_env() -> LogMetadata {
    let logger_name =
        env::var("LOG_UPLOAD_LOGGER_NAME").unwrap_or_else(|_| DEFAULT_LOGGER_NAME.to_string());
    let tag = env::var("LOG_UPLOAD_TAG").unwrap_or_default();

    let mut metadata = LogMetadata::new(chrono::Utc::now(), logger_name, tag);
    if let Ok(value) = env::var("LOG_UPLOAD_PROCESS_CONTEXT") {
        metadata = metadata.with_process_context(value);
    }
    if let Ok(value) = env::var("LOG_UPLOAD_PROCESS_CONTEXT_VARIANT") {
        metadata = metadata.with_process_context_variant(value);
    }
    if let Ok(value) = env::var("LOG_UPLOAD_TMP") {
        metadata = metadata.with_tmp(value.to_lowercase() == "true");
    }
    if let Ok(value) = env::var("LOG_UPLOAD_REQUEST_CONTEXT") {
        metadata = metadata.with_request_context(value);
    }
    metadata
}
