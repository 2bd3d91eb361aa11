//! Multi-listener lifecycle and fatal error propagation.

use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use httpdump::config::ConfigError;
use httpdump::net::ListenerError;
use httpdump::{DumpConfig, RecordSink, Supervisor};

mod common;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn one_listener_per_address() {
    let (addrs, buffer, _running) = common::start_loopback(3, false).await;
    assert_eq!(addrs.len(), 3);
    assert!(addrs[0] != addrs[1] && addrs[1] != addrs[2] && addrs[0] != addrs[2]);

    let client = common::client();
    for (i, addr) in addrs.iter().enumerate() {
        client
            .post(format!("http://{addr}/listener/{i}"))
            .body(format!("payload {i}"))
            .send()
            .await
            .unwrap();
    }

    let mut records = buffer.wait_for_records(3, WAIT).await;
    records.sort_by(|a, b| a.url.cmp(&b.url));
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.url, format!("/listener/{i}"));
        assert_eq!(record.body_text(), format!("payload {i}"));
    }
}

#[tokio::test]
async fn stalled_listener_does_not_block_others() {
    let (addrs, buffer, _running) = common::start_loopback(2, false).await;

    // default 10s read timeout keeps this request open for the whole test
    let mut stalled = TcpStream::connect(addrs[0]).await.unwrap();
    stalled
        .write_all(b"POST /stalled HTTP/1.1\r\nHost: a\r\nContent-Length: 100\r\n\r\npartial")
        .await
        .unwrap();

    let res = tokio::time::timeout(
        Duration::from_secs(2),
        common::client()
            .post(format!("http://{}/other", addrs[1]))
            .body("fine")
            .send(),
    )
    .await
    .expect("second listener answered while the first was busy")
    .unwrap();
    assert_eq!(res.status(), 200);

    let records = buffer.wait_for_records(1, WAIT).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "/other");
    drop(stalled);
}

#[tokio::test]
async fn bind_conflict_is_fatal() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let taken_addr = taken.local_addr().unwrap().to_string();

    let config = DumpConfig::with_addresses(["127.0.0.1:0".to_string(), taken_addr.clone()]);
    let running = Supervisor::new(config, RecordSink::new(common::SharedBuffer::default()))
        .start()
        .unwrap();

    let err = tokio::time::timeout(WAIT, running.wait())
        .await
        .expect("fatal error reported");
    match &err {
        ListenerError::Bind { address, .. } => assert_eq!(address, &taken_addr),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with(&format!("listen tcp {taken_addr}: ")));
}

#[tokio::test]
async fn bound_addrs_reports_bind_failure() {
    let config = DumpConfig::with_addresses(["127.0.0.1:0", "definitely not an address"]);
    let mut running = Supervisor::new(config, RecordSink::new(common::SharedBuffer::default()))
        .start()
        .unwrap();

    let err = tokio::time::timeout(WAIT, running.bound_addrs())
        .await
        .expect("bind outcome known")
        .unwrap_err();
    assert!(matches!(err, ListenerError::Bind { .. }));
}

#[tokio::test]
async fn empty_address_list_refuses_to_start() {
    let result = Supervisor::new(
        DumpConfig::default(),
        RecordSink::new(common::SharedBuffer::default()),
    )
    .start();
    assert!(matches!(result, Err(ConfigError::NoAddresses)));
}

#[tokio::test]
async fn healthy_listeners_never_report() {
    let (_addrs, _buffer, running) = common::start_loopback(2, false).await;
    let waited = tokio::time::timeout(Duration::from_millis(300), running.wait()).await;
    assert!(waited.is_err(), "no fatal error expected");
}
