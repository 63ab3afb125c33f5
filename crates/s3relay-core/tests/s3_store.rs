use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, Method, StatusCode, Uri};
use s3relay_core::storage::{ObjectStore, S3Store};
use s3relay_core::{Config, PutObject};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

const LIST_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>b</Name>
  <Prefix></Prefix>
  <KeyCount>2</KeyCount>
  <MaxKeys>2</MaxKeys>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>page-2</NextContinuationToken>
  <Contents><Key>a.txt</Key><Size>3</Size></Contents>
  <Contents><Key>b.txt</Key><Size>5</Size></Contents>
</ListBucketResult>"#;

const DENIED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message><RequestId>req-1</RequestId></Error>"#;

#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    path: String,
    query: String,
    headers: HeaderMap,
    body: Bytes,
}

type Log = Arc<Mutex<Vec<Captured>>>;

async fn fake_s3(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    log.lock().unwrap().push(Captured {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        headers,
        body,
    });

    if uri.path().starts_with("/denied") {
        return (
            StatusCode::FORBIDDEN,
            [("content-type", "application/xml")],
            DENIED_XML,
        )
            .into_response();
    }
    match method {
        Method::PUT => (
            StatusCode::OK,
            [("etag", "\"5d41402abc4b2a76b9719d911017c592\"")],
        )
            .into_response(),
        Method::GET => (
            StatusCode::OK,
            [("content-type", "application/xml")],
            LIST_XML,
        )
            .into_response(),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn start_fake_s3() -> (SocketAddr, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(fake_s3).with_state(log.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, log)
}

fn config_for(endpoint: String) -> Config {
    Config {
        endpoint,
        path_style: true,
        access_key: "TESTAKID".into(),
        secret_key: "TESTSECRET".into(),
        ..Config::default()
    }
}

fn cause_of(err: &s3relay_core::RelayError) -> String {
    err.envelope().cause.expect("upstream failures carry a cause")
}

#[tokio::test]
async fn test_put_sends_acl_disposition_and_type() {
    let (addr, log) = start_fake_s3().await;
    let store = S3Store::connect(&config_for(format!("http://{addr}"))).await;

    store
        .put_object(PutObject::public_inline("b", "a.png", Bytes::from_static(b"\x89PNG")))
        .await
        .unwrap();

    let captured = log.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    let put = &captured[0];
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.path, "/b/a.png");
    assert_eq!(put.headers["x-amz-acl"], "public-read");
    assert_eq!(put.headers["content-disposition"], "inline");
    assert_eq!(put.headers["content-type"], "image/png");
    assert_eq!(&put.body[..], b"\x89PNG");
    assert!(
        put.headers
            .keys()
            .all(|name| !name.as_str().starts_with("x-amz-checksum")
                && name.as_str() != "x-amz-sdk-checksum-algorithm"),
        "unexpected checksum headers: {:?}",
        put.headers
    );
}

#[tokio::test]
async fn test_list_reads_only_the_first_page() {
    let (addr, log) = start_fake_s3().await;
    let store = S3Store::connect(&config_for(format!("http://{addr}"))).await;

    let objects = store.list_objects("b").await.unwrap();
    let keys: Vec<_> = objects.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, ["a.txt", "b.txt"]);
    assert_eq!(objects[1].size, 5);

    let captured = log.lock().unwrap().clone();
    assert_eq!(captured.len(), 1, "listing must not follow continuation tokens");
    let list = &captured[0];
    assert_eq!(list.method, Method::GET);
    assert!(list.path == "/b" || list.path == "/b/", "path was {}", list.path);
    assert!(list.query.contains("list-type=2"));
    assert!(!list.query.contains("continuation-token"));
}

#[tokio::test]
async fn test_service_error_reports_code_and_message() {
    let (addr, _log) = start_fake_s3().await;
    let store = S3Store::connect(&config_for(format!("http://{addr}"))).await;

    let err = store.list_objects("denied").await.unwrap_err();
    assert_eq!(err.kind(), "UpstreamFailure");
    assert_eq!(cause_of(&err), "AccessDenied: Access Denied");

    let err = store
        .put_object(PutObject::public_inline("denied", "a.txt", Bytes::from_static(b"x")))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to store object a.txt");
    assert_eq!(cause_of(&err), "AccessDenied: Access Denied");
}

#[tokio::test]
async fn test_unreachable_endpoint_cause_has_no_sdk_structure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = S3Store::connect(&config_for(format!("http://{addr}"))).await;
    let err = store.list_objects("b").await.unwrap_err();
    let cause = cause_of(&err);

    assert!(!cause.is_empty());
    assert!(!cause.contains('{'), "cause leaks debug output: {cause}");
    assert!(!cause.contains("DispatchFailure("), "cause leaks debug output: {cause}");
}
