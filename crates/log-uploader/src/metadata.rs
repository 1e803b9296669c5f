// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, SecondsFormat, Utc};

/// Header carrying the identifier of the process that produced the log.
pub const HEADER_PROCESS_CONTEXT: &str = "log-process-context";
/// Header carrying the variant of the producing process context.
pub const HEADER_PROCESS_CONTEXT_VARIANT: &str = "process-context-variant";
/// Header marking the log as temporary.
pub const HEADER_TMP: &str = "log-tmp";
/// Header carrying the request-context identifier.
pub const HEADER_REQUEST_CONTEXT: &str = "log-request-context";

/// Descriptive fields sent alongside a log payload.
///
/// `headers` keeps insertion order; entries are added to the upload request
/// verbatim, before `Authorization`. Fields are not validated: empty values
/// are forwarded as-is and the ingestion service decides what to accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMetadata {
    end_time: DateTime<Utc>,
    logger_name: String,
    tag: String,
    headers: Vec<(String, String)>,
}

impl LogMetadata {
    pub fn new(
        end_time: DateTime<Utc>,
        logger_name: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            end_time,
            logger_name: logger_name.into(),
            tag: tag.into(),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_process_context(self, value: impl Into<String>) -> Self {
        self.with_header(HEADER_PROCESS_CONTEXT, value)
    }

    #[must_use]
    pub fn with_process_context_variant(self, value: impl Into<String>) -> Self {
        self.with_header(HEADER_PROCESS_CONTEXT_VARIANT, value)
    }

    #[must_use]
    pub fn with_tmp(self, tmp: bool) -> Self {
        self.with_header(HEADER_TMP, tmp.to_string())
    }

    #[must_use]
    pub fn with_request_context(self, value: impl Into<String>) -> Self {
        self.with_header(HEADER_REQUEST_CONTEXT, value)
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// `end_time` as sent in the `endTime` field, e.g. `2024-05-01T10:15:30Z`.
    pub fn end_time_string(&self) -> String {
        self.end_time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
