// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Assembly of the gzip-compressed multipart upload body.

use bytes::Bytes;
use flate2::{write::GzEncoder, Compression};
use reqwest::header::{
    HeaderName, HeaderValue, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE,
};
use reqwest::{Method, Url};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::UploadError;
use crate::metadata::LogMetadata;

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=UTF-8";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// The log content to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Sent inline as a UTF-8 text part.
    Text(String),
    /// Sent as a file attachment named after the file.
    File(PathBuf),
}

/// A fully assembled upload, ready to be turned into one request per attempt.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    url: Url,
    headers: Vec<(String, String)>,
    content_type: String,
    body: Bytes,
}

impl UploadRequest {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Caller-supplied headers, in order. `Authorization` is not included.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// `multipart/form-data` with its boundary.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The gzip-compressed multipart body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Builds the HTTP request for one attempt.
    ///
    /// The body is shared, not copied. `authorization` is appended after the
    /// caller headers.
    pub fn to_http_request(&self, authorization: &str) -> Result<reqwest::Request, UploadError> {
        let mut request = reqwest::Request::new(Method::POST, self.url.clone());
        let headers = request.headers_mut();
        let content_type = HeaderValue::from_str(&self.content_type)
            .map_err(|_| UploadError::InvalidHeader(CONTENT_TYPE.to_string()))?;
        headers.insert(CONTENT_TYPE, content_type);
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        for (name, value) in &self.headers {
            // Report the name only, never the value.
            let invalid = || UploadError::InvalidHeader(name.clone());
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.append(header_name, header_value);
        }
        let mut authorization = HeaderValue::from_str(authorization)
            .map_err(|_| UploadError::InvalidHeader(AUTHORIZATION.to_string()))?;
        authorization.set_sensitive(true);
        headers.append(AUTHORIZATION, authorization);

        *request.body_mut() = Some(self.body.clone().into());
        Ok(request)
    }
}

/// Packs metadata, digest and payload into an [`UploadRequest`].
#[derive(Debug, Clone)]
pub struct RequestAssembler {
    url: Url,
    boundary: Option<String>,
}

impl RequestAssembler {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            boundary: None,
        }
    }

    /// Uses a fixed multipart boundary instead of a random one per request.
    #[must_use]
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Builds the request for one upload call.
    ///
    /// The multipart body is written straight into a gzip encoder. A file
    /// payload is streamed from disk on the blocking pool, so only the
    /// compressed body is ever held in memory.
    pub async fn assemble(
        &self,
        metadata: &LogMetadata,
        payload: &Payload,
        md5sum: &str,
    ) -> Result<UploadRequest, UploadError> {
        let boundary = self
            .boundary
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        let fields = vec![
            ("md5sum", md5sum.to_string()),
            ("endTime", metadata.end_time_string()),
            ("loggerName", metadata.logger_name().to_string()),
            ("tag", metadata.tag().to_string()),
        ];

        let (body, raw_len) = match payload {
            Payload::Text(log) => encode_form(&boundary, &fields, LogPart::<io::Empty>::Text(log)),
            Payload::File(path) => {
                let boundary = boundary.clone();
                let path = path.clone();
                tokio::task::spawn_blocking(move || {
                    let file = File::open(&path)?;
                    encode_form(&boundary, &fields, LogPart::File(&file_name(&path), file))
                })
                .await
                .map_err(|e| UploadError::Payload(io::Error::other(e)))?
            }
        }
        .map_err(UploadError::Payload)?;

        debug!(
            url = %self.url,
            raw_bytes = raw_len,
            compressed_bytes = body.len(),
            "assembled log upload"
        );

        Ok(UploadRequest {
            url: self.url.clone(),
            headers: metadata.headers().to_vec(),
            content_type: format!("multipart/form-data; boundary={boundary}"),
            body: Bytes::from(body),
        })
    }
}

/// Content of the `logfile` part.
enum LogPart<'a, R> {
    Text(&'a str),
    File(&'a str, R),
}

/// Writes the whole form through a gzip encoder, returning the compressed
/// body and the uncompressed length.
fn encode_form<R: Read>(
    boundary: &str,
    fields: &[(&str, String)],
    log: LogPart<'_, R>,
) -> io::Result<(Vec<u8>, u64)> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut form = MultipartForm::new(boundary, encoder);
    for (name, value) in fields {
        form.text(name, value)?;
    }
    match log {
        LogPart::Text(log) => form.text("logfile", log)?,
        LogPart::File(filename, mut reader) => form.file("logfile", filename, &mut reader)?,
    }
    let (encoder, raw_len) = form.finish()?;
    Ok((encoder.finish()?, raw_len))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "logfile".to_string())
}

/// `multipart/form-data` writer (RFC 7578).
struct MultipartForm<'a, W> {
    boundary: &'a str,
    out: W,
    written: u64,
}

impl<'a, W: Write> MultipartForm<'a, W> {
    fn new(boundary: &'a str, out: W) -> Self {
        Self {
            boundary,
            out,
            written: 0,
        }
    }

    fn text(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.part_header(
            &format!("form-data; name=\"{}\"", escape_quoted(name)),
            TEXT_PLAIN_UTF8,
        )?;
        self.write(value.as_bytes())?;
        self.write(b"\r\n")
    }

    fn file<R: Read>(&mut self, name: &str, filename: &str, content: &mut R) -> io::Result<()> {
        self.part_header(
            &format!(
                "form-data; name=\"{}\"; filename=\"{}\"",
                escape_quoted(name),
                escape_quoted(filename)
            ),
            APPLICATION_OCTET_STREAM,
        )?;
        self.written += io::copy(content, &mut self.out)?;
        self.write(b"\r\n")
    }

    fn part_header(&mut self, disposition: &str, content_type: &str) -> io::Result<()> {
        let header = format!(
            "--{}\r\nContent-Disposition: {disposition}\r\nContent-Type: {content_type}\r\n\r\n",
            self.boundary
        );
        self.write(header.as_bytes())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn finish(mut self) -> io::Result<(W, u64)> {
        let closing = format!("--{}--\r\n", self.boundary);
        self.write(closing.as_bytes())?;
        Ok((self.out, self.written))
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
