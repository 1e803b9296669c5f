// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::{Response, StatusCode};
use tracing::{debug, error};

use crate::error::UploadError;

/// Classifies a received upload response.
///
/// Only `200` counts as accepted; its body is drained and ignored. Any other
/// status is a terminal rejection carrying the body as the server's message.
pub async fn interpret(response: Response) -> Result<(), UploadError> {
    let status = response.status();
    if status == StatusCode::OK {
        let body = response
            .bytes()
            .await
            .map_err(UploadError::ResponseDecoding)?;
        debug!(status = status.as_u16(), body_bytes = body.len(), "log upload accepted");
        return Ok(());
    }

    let message = response
        .text()
        .await
        .map_err(UploadError::ResponseDecoding)?;
    error!(
        status = status.as_u16(),
        "Failed to upload log: {}", message
    );
    Err(UploadError::ServerRejection {
        status: status.as_u16(),
        message,
    })
}
