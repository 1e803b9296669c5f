// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chrono::{TimeZone, Utc};
use log_uploader::{
    CredentialSupplier, LogMetadata, LogUploader, UploadError, UploadErrorKind, UploaderConfig,
};
use mockito::{Matcher, Server};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn metadata() -> LogMetadata {
    LogMetadata::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 30).unwrap(),
        "L",
        "build-1",
    )
    .with_process_context("build-42")
    .with_request_context("req-7")
}

fn config(base_url: String, max_retries: u32) -> UploaderConfig {
    UploaderConfig {
        max_retries,
        delay: Duration::from_millis(1),
        timeout: Duration::from_secs(5),
        ..UploaderConfig::new(base_url)
    }
}

#[tokio::test]
async fn uploads_string_with_headers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/final-log/upload")
        .match_header("authorization", "Bearer abc")
        .match_header("content-encoding", "gzip")
        .match_header(
            "content-type",
            Matcher::Regex(r"^multipart/form-data; boundary=\w+$".to_string()),
        )
        .match_header("log-process-context", "build-42")
        .match_header("log-request-context", "req-7")
        .with_status(200)
        .with_body("stored")
        .expect(1)
        .create_async()
        .await;

    let uploader = LogUploader::new(
        &config(server.url(), 3),
        CredentialSupplier::new("Bearer abc"),
    )
    .expect("failed to create uploader");

    uploader
        .upload_string("hello", &metadata())
        .await
        .expect("upload should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn uploads_file() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/final-log/upload")
        .match_header("authorization", "Bearer file-token")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let mut logfile = tempfile::NamedTempFile::new().expect("failed to create temp file");
    logfile
        .write_all(b"[INFO] build finished\n")
        .expect("failed to write log");

    let uploader = LogUploader::new(
        &config(server.url(), 3),
        CredentialSupplier::new("Bearer file-token"),
    )
    .expect("failed to create uploader");

    uploader
        .upload_file(logfile.path(), &metadata())
        .await
        .expect("upload should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn base_url_path_is_replaced() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/final-log/upload")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let uploader = LogUploader::new(
        &config(format!("{}/some/prefix/", server.url()), 0),
        CredentialSupplier::new("Bearer abc"),
    )
    .expect("failed to create uploader");

    uploader
        .upload_string("hello", &metadata())
        .await
        .expect("upload should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn service_unavailable_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/final-log/upload")
        .with_status(503)
        .with_body("Service Unavailable")
        .expect(1)
        .create_async()
        .await;

    let uploader = LogUploader::new(
        &config(server.url(), 3),
        CredentialSupplier::new("Bearer abc"),
    )
    .expect("failed to create uploader");

    let result = uploader.upload_string("hello", &metadata()).await;

    match result {
        Err(UploadError::ServerRejection { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("Expected ServerRejection with status 503, got {other:?}"),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn rejection_message_is_surfaced() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/final-log/upload")
        .with_status(400)
        .with_body("md5sum mismatch")
        .expect(1)
        .create_async()
        .await;

    let uploader = LogUploader::new(
        &config(server.url(), 3),
        CredentialSupplier::new("Bearer abc"),
    )
    .expect("failed to create uploader");

    let err = uploader
        .upload_string_with_checksum("hello", &metadata(), "00000000000000000000000000000000")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to upload log, status 400 message: md5sum mismatch"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_endpoint_exhausts_retries() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let addr = listener.local_addr().expect("failed to get local addr");
    drop(listener);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let credentials = CredentialSupplier::from_fn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        "Bearer abc".to_string()
    });

    let uploader = LogUploader::new(&config(format!("http://{addr}"), 2), credentials)
        .expect("failed to create uploader");

    let err = uploader
        .upload_string("hello", &metadata())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), UploadErrorKind::TransportExhausted);
    match err {
        UploadError::TransportExhausted { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("Expected TransportExhausted, got {other:?}"),
    }
    // One credential lookup per attempt.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// Reads one HTTP/1.1 request, headers and `Content-Length` body.
async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending a full request");
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length: usize = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|value| value.trim().parse().unwrap())
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            return buf;
        }
    }
}

#[tokio::test]
async fn truncated_response_body_is_a_decoding_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let accepted = Arc::clone(&connections);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            accepted.fetch_add(1, Ordering::SeqCst);
            read_request(&mut stream).await;
            // Promises 100 bytes of body but only sends 5.
            stream
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 100\r\n\r\nshort")
                .await
                .unwrap();
            stream.shutdown().await.ok();
        }
    });

    let uploader = LogUploader::new(
        &config(format!("http://{addr}"), 3),
        CredentialSupplier::new("Bearer abc"),
    )
    .expect("failed to create uploader");

    let err = uploader
        .upload_string("hello", &metadata())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), UploadErrorKind::ResponseDecoding, "{err}");
    assert!(matches!(err, UploadError::ResponseDecoding(_)));
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_uploads_are_independent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/final-log/upload")
        .with_status(200)
        .expect(4)
        .create_async()
        .await;

    let uploader = LogUploader::new(
        &config(server.url(), 0),
        CredentialSupplier::new("Bearer abc"),
    )
    .expect("failed to create uploader");

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let uploader = uploader.clone();
            tokio::spawn(async move {
                uploader
                    .upload_string(&format!("log {i}"), &metadata())
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle
            .await
            .expect("task panicked")
            .expect("upload should succeed");
    }

    mock.assert_async().await;
}
