//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use httpdump::lifecycle::Running;
use httpdump::{DumpConfig, RecordSink, Supervisor};

/// In-memory output stream standing in for stdout.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One parsed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: OffsetDateTime,
    pub url: String,
    pub body: Vec<u8>,
}

impl Record {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl SharedBuffer {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    /// Records written so far. Bodies must not contain a blank line or end
    /// with a newline.
    pub fn records(&self) -> Vec<Record> {
        parse_records(&self.bytes())
    }

    /// Poll until at least `count` records have been written.
    pub async fn wait_for_records(&self, count: usize, timeout: Duration) -> Vec<Record> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let records = self.records();
            if records.len() >= count {
                return records;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {count} records, got {}: {:?}",
                records.len(),
                String::from_utf8_lossy(&self.bytes())
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

fn parse_records(mut rest: &[u8]) -> Vec<Record> {
    let mut records = Vec::new();
    while let Some(header_end) = rest.iter().position(|b| *b == b'\n') {
        let after = &rest[header_end + 1..];
        let Some(body_end) = after.windows(2).position(|w| w == b"\n\n") else {
            break;
        };

        let header = std::str::from_utf8(&rest[..header_end]).expect("record header is UTF-8");
        let header = header.strip_prefix('[').expect("record header starts with [");
        let (stamp, url) = header.split_once("] ").expect("record header has timestamp and url");
        let timestamp = OffsetDateTime::parse(stamp, &Rfc3339).expect("RFC 3339 timestamp");

        records.push(Record {
            timestamp,
            url: url.to_string(),
            body: after[..body_end].to_vec(),
        });
        rest = &after[body_end + 2..];
    }
    records
}

/// Start a supervisor with records captured in memory.
pub async fn start(config: DumpConfig) -> (Vec<SocketAddr>, SharedBuffer, Running) {
    let buffer = SharedBuffer::default();
    let mut running = Supervisor::new(config, RecordSink::new(buffer.clone()))
        .start()
        .expect("configuration is valid");
    let addrs = running.bound_addrs().await.expect("listeners bound");
    (addrs, buffer, running)
}

/// Start listeners on `count` ephemeral loopback ports.
pub async fn start_loopback(count: usize, full_dump: bool) -> (Vec<SocketAddr>, SharedBuffer, Running) {
    let config = DumpConfig {
        full_dump,
        ..DumpConfig::with_addresses(vec!["127.0.0.1:0"; count])
    };
    start(config).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
