//! Dump Handler.
//!
//! # Responsibilities
//! - Render the optional full-dump preamble (protocol, method, URI, headers)
//! - Read the whole request body, keeping whatever arrived on failure
//! - Emit one record per request and answer with an empty `200 OK`
//!
//! # Design Decisions
//! - Nothing is retained between requests
//! - Body read failures never become HTTP errors
//! - `Host` is not listed with the headers; header order is the header
//!   map's key order, not sorted

use axum::{
    body::Body,
    extract::{Request, State},
    http::{request::Parts, HeaderMap, StatusCode, Uri, Version},
};
use futures_util::StreamExt;
use std::io::Write;
use time::UtcOffset;

use crate::http::record::RequestRecord;
use crate::http::sink::RecordSink;

/// State shared by every invocation of the handler.
#[derive(Debug, Clone)]
pub struct DumpState {
    pub full_dump: bool,
    pub utc_offset: UtcOffset,
    pub sink: RecordSink,
}

/// Dump the request to the record sink.
pub async fn dump_handler(State(state): State<DumpState>, request: Request) -> StatusCode {
    let (parts, body) = request.into_parts();

    let mut buf = if state.full_dump {
        render_preamble(&parts)
    } else {
        Vec::new()
    };
    read_body(body, &mut buf).await;

    let url = request_target(&parts.uri, parts.version);
    tracing::debug!(method = %parts.method, url = %url, bytes = buf.len(), "Dumping request");

    state
        .sink
        .emit(&RequestRecord::now(state.utc_offset, url, buf));
    StatusCode::OK
}

/// Append the body to `buf`, stopping silently at the first read error.
async fn read_body(body: Body, buf: &mut Vec<u8>) {
    let mut stream = body.into_data_stream();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => buf.extend_from_slice(&bytes),
            Err(err) => {
                tracing::debug!(error = %err, read = buf.len(), "Request body read failed");
                break;
            }
        }
    }
}

/// `<proto> <method> <uri>` followed by one `Name: [values]` line per header.
pub fn render_preamble(parts: &Parts) -> Vec<u8> {
    let mut out = Vec::new();
    // writes into a Vec cannot fail
    let _ = writeln!(
        out,
        "{:?} {} {}",
        parts.version,
        parts.method,
        request_target(&parts.uri, parts.version)
    );
    out.extend_from_slice(&render_headers(&parts.headers));
    out
}

fn render_headers(headers: &HeaderMap) -> Vec<u8> {
    let mut out = Vec::new();
    for name in headers.keys() {
        if *name == axum::http::header::HOST {
            continue;
        }
        let values: Vec<_> = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
            .collect();
        let _ = writeln!(
            out,
            "{}: [{}]",
            canonical_header_name(name.as_str()),
            values.join(" ")
        );
    }
    out
}

/// The request target as the client sent it.
///
/// HTTP/2 requests carry scheme and authority as pseudo-headers, so only the
/// path and query are reported for them.
pub fn request_target(uri: &Uri, version: Version) -> String {
    if version == Version::HTTP_2 || version == Version::HTTP_3 {
        uri.path_and_query()
            .map_or_else(|| "/".to_string(), |pq| pq.as_str().to_string())
    } else {
        uri.to_string()
    }
}

/// `x-forwarded-for` → `X-Forwarded-For`.
pub fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}
