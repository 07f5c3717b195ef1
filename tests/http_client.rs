// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! HTTP client tests against a mock build server

use flate2::read::GzDecoder;
use futures::StreamExt;
use std::fs;
use std::io::Read;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use runway::archive;
use runway::client::{BuildServer, HttpClient, Pipe};
use runway::events::{BuildStatus, EventConsumer, EventSource, StreamMessage};
use runway::plan::{Plan, PlanBuilder};
use runway::target::{Target, TargetToken};
use runway::{RunwayError, TaskConfig};

fn client(server: &MockServer) -> HttpClient {
    HttpClient::new(&Target::from_url(&server.uri())).unwrap()
}

fn pipe(server: &MockServer, id: &str) -> Pipe {
    let url = format!("{}/api/v1/pipes/{}", server.uri(), id);
    Pipe {
        id: id.into(),
        write_url: url.clone(),
        read_url: url,
    }
}

fn plan() -> Plan {
    let task = TaskConfig::from_yaml("run: {path: ls}").unwrap();
    PlanBuilder::new().build(&task, false, &[], &[])
}

fn sse(messages: &[(&str, &str)]) -> ResponseTemplate {
    let mut body = String::new();
    for (i, (name, data)) in messages.iter().enumerate() {
        body.push_str(&format!("id: {}\nevent: {}\n", i, name));
        if !data.is_empty() {
            body.push_str(&format!("data: {}\n", data));
        }
        body.push('\n');
    }

    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

#[tokio::test]
async fn test_create_pipe() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pipes"))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"some-pipe-id"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server).create_pipe().await.unwrap();
    assert_eq!(created, pipe(&server, "some-pipe-id"));
}

#[tokio::test]
async fn test_token_sent_on_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pipes"))
        .and(header("authorization", "Bearer some-token"))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"p"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let target = Target {
        url: server.uri(),
        insecure: false,
        token: Some(TargetToken {
            kind: "Bearer".into(),
            value: "some-token".into(),
        }),
    };

    HttpClient::new(&target).unwrap().create_pipe().await.unwrap();
}

#[tokio::test]
async fn test_rejected_plan_message_is_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/builds"))
        .respond_with(ResponseTemplate::new(400).set_body_string("task config is invalid: no image"))
        .mount(&server)
        .await;

    let err = client(&server).submit_build(&plan()).await.unwrap_err();
    assert!(matches!(err, RunwayError::BuildConfigInvalid { .. }));
    assert_eq!(err.to_string(), "task config is invalid: no image");
}

#[tokio::test]
async fn test_server_error_on_submit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/builds"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).submit_build(&plan()).await.unwrap_err();
    assert!(matches!(err, RunwayError::BuildSubmissionFailed { .. }));
}

#[tokio::test]
async fn test_session_cookie_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/builds"))
        .and(body_string_contains("one-off"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("set-cookie", "Some-Cookie=some-cookie-data; Path=/")
                .set_body_string(r#"{"id":128}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/builds/128/abort"))
        .and(header("cookie", "Some-Cookie=some-cookie-data"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let build = client.submit_build(&plan()).await.unwrap();
    assert_eq!(build.id, 128);
    client.abort_build(build.id).await.unwrap();
}

#[tokio::test]
async fn test_event_stream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/128/events"))
        .respond_with(sse(&[
            (
                "event",
                r#"{"event":"log","version":"5.0","data":{"payload":"sup"}}"#,
            ),
            (
                "event",
                r#"{"event":"status","version":"1.0","data":{"status":"failed","time":1}}"#,
            ),
            ("end", ""),
        ]))
        .mount(&server)
        .await;

    let mut events = client(&server).build_events(128).await.unwrap();
    let mut consumer = EventConsumer::new(Vec::new(), Vec::new());
    let status = consumer.consume(128, events.as_mut()).await.unwrap();

    assert_eq!(status, BuildStatus::Failed);
    let (out, _) = consumer.into_inner();
    assert_eq!(out, b"sup");
}

#[tokio::test]
async fn test_undecodable_event_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/128/events"))
        .respond_with(sse(&[
            (
                "event",
                r#"{"event":"status","version":"1.0","data":{"status":"exploded","time":1}}"#,
            ),
            (
                "event",
                r#"{"event":"status","version":"1.0","data":{"status":"failed","time":2}}"#,
            ),
            ("end", ""),
        ]))
        .mount(&server)
        .await;

    let mut events = client(&server).build_events(128).await.unwrap();
    let mut consumer = EventConsumer::new(Vec::new(), Vec::new());
    let status = consumer.consume(128, events.as_mut()).await.unwrap();

    assert_eq!(status, BuildStatus::Failed);
}

#[tokio::test]
async fn test_event_stream_closed_without_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/128/events"))
        .respond_with(sse(&[(
            "event",
            r#"{"event":"log","version":"5.0","data":{"payload":"sup"}}"#,
        )]))
        .mount(&server)
        .await;

    let mut events = client(&server).build_events(128).await.unwrap();
    assert!(matches!(
        events.next_message().await.unwrap(),
        StreamMessage::Event(_)
    ));
    assert!(matches!(
        events.next_message().await,
        Err(RunwayError::EventStreamInterrupted { build_id: 128, .. })
    ));
}

#[tokio::test]
async fn test_write_pipe_streams_archive() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/pipes/input-pipe"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("task.yml"), "run: {path: ls}").unwrap();

    client(&server)
        .write_pipe(
            pipe(&server, "input-pipe"),
            archive::pack_stream(dir.path().to_path_buf()),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let mut tarball = tar::Archive::new(GzDecoder::new(requests[0].body.as_slice()));
    let names: Vec<String> = tarball
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names[0], "./");
    assert!(names[1].ends_with("task.yml"));
}

#[tokio::test]
async fn test_read_pipe() {
    let produced = TempDir::new().unwrap();
    fs::write(produced.path().join("result"), b"hello").unwrap();
    let body = archive::pack(produced.path(), Vec::new()).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/pipes/output-pipe"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let mut stream = client(&server)
        .read_pipe(pipe(&server, "output-pipe"))
        .await
        .unwrap();
    let mut received = Vec::new();
    while let Some(chunk) = stream.next().await {
        received.extend(chunk.unwrap());
    }
    assert_eq!(received, body);

    let mut contents = String::new();
    let mut tarball = tar::Archive::new(GzDecoder::new(received.as_slice()));
    for entry in tarball.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.path().unwrap().ends_with("result") {
            entry.read_to_string(&mut contents).unwrap();
        }
    }
    assert_eq!(contents, "hello");
}

#[tokio::test]
async fn test_missing_pipe() {
    let server = MockServer::start().await;

    let result = client(&server).read_pipe(pipe(&server, "gone")).await;
    assert!(matches!(result, Err(RunwayError::PipeReadFailed { .. })));
}
