//! Per-connection state machine.
//!
//! `READ_PRELUDE → { HTTP1 | HTTP2_FRAMES } → RESPOND`. The first 24 bytes
//! decide the protocol: the exact HTTP/2 preface switches to frame
//! observation, anything else is treated as an HTTP/1 request.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{info, warn};

use crate::config::Config;
use crate::capture::CaptureMap;
use crate::error::FrameError;
use crate::http2::{self, ParsedFrame, PREFACE};
use crate::server::http1;
use crate::server::response::{Http1Details, Http2Details, Response, TlsDetails};
use crate::server::router;
use crate::sink::FingerprintSink;

/// Read beyond the prelude for HTTP/1 requests, mirroring the 1024-byte
/// legacy window.
const HTTP1_READ: usize = 1024 - PREFACE.len();

pub struct ConnectionContext {
    pub config: Arc<Config>,
    pub capture: Arc<CaptureMap>,
    pub sink: Arc<dyn FingerprintSink>,
}

/// Drive one connection to completion over an established TLS stream.
///
/// Returns `Ok` when a response was written or the local-development
/// "unknown certificate" exception applied; any error closes the socket.
pub async fn drive<S>(
    stream: &mut S,
    tls: TlsDetails,
    peer: SocketAddr,
    ctx: &ConnectionContext,
) -> Result<(), FrameError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut prelude = [0u8; PREFACE.len()];
    if let Err(e) = stream.read_exact(&mut prelude).await {
        // Browsers tear the connection down when they reject a self-signed
        // certificate; during local development that is routine, not fatal.
        if ctx.config.local && e.to_string().ends_with("unknown certificate") {
            info!(%peer, "local development certificate rejection, keeping connection");
            return Ok(());
        }
        return Err(e.into());
    }

    let response = if prelude == *PREFACE {
        let frames = match http2::observe(stream).await {
            Ok(frames) => frames,
            Err(FrameError::Io(e))
                if ctx.config.local && e.to_string().ends_with("unknown certificate") =>
            {
                info!(%peer, "local development certificate rejection, keeping connection");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        build_http2_response(frames, tls, peer, ctx)
    } else {
        let mut rest = vec![0u8; HTTP1_READ];
        let n = stream.read(&mut rest).await?;
        let mut raw = prelude.to_vec();
        raw.extend_from_slice(&rest[..n]);
        build_http1_response(&raw, tls, peer, ctx)
    };

    info!(
        %peer,
        method = %response.method,
        http_version = %response.http_version,
        path = %response.path,
        ja3_hash = %response.tls.ja3_hash,
        "request"
    );

    let cors = response.method == "OPTIONS";
    let (body, content_type) = if cors {
        (Vec::new(), router::CONTENT_TYPE_JSON)
    } else {
        router::route(&response.path, &response)
    };

    if response.http_version == "h2" {
        let stream_id = response
            .http2
            .as_ref()
            .and_then(|h2| {
                h2.sent_frames
                    .iter()
                    .find(|f| f.frame_type == "HEADERS")
                    .map(|f| f.stream_id)
            })
            .unwrap_or(1);
        http2::responder::respond(stream, stream_id, &body, content_type, cors).await?;
    } else {
        http1::respond(stream, &body, content_type, cors).await?;
    }

    ctx.sink.record(&response);
    Ok(())
}

fn build_http2_response(
    frames: Vec<ParsedFrame>,
    tls: TlsDetails,
    peer: SocketAddr,
    ctx: &ConnectionContext,
) -> Response {
    let mut method = String::new();
    let mut path = String::new();
    let mut user_agent = None;
    if let Some(headers) = frames
        .iter()
        .find(|f| f.frame_type == "HEADERS")
        .map(|f| &f.headers)
    {
        for header in headers {
            if let Some(value) = header.strip_prefix(":method: ") {
                method = value.to_string();
            } else if let Some(value) = header.strip_prefix(":path: ") {
                path = value.to_string();
            } else if let Some(value) = header.strip_prefix("user-agent: ") {
                user_agent = Some(value.to_string());
            }
        }
    }

    Response {
        donate: ctx.config.donate.clone(),
        ip: peer.to_string(),
        http_version: "h2".to_string(),
        path,
        method,
        user_agent,
        tls,
        http2: Some(Http2Details::build(frames)),
        tcpip: ctx.capture.snapshot(peer),
        ..Response::default()
    }
}

fn build_http1_response(
    raw: &[u8],
    tls: TlsDetails,
    peer: SocketAddr,
    ctx: &ConnectionContext,
) -> Response {
    let request = http1::parse_request(raw);
    if request.method == "--" {
        warn!(%peer, "unparseable HTTP/1 request line");
    }
    Response {
        donate: ctx.config.donate.clone(),
        ip: peer.to_string(),
        http_version: request.version,
        path: request.path,
        method: request.method,
        user_agent: request.user_agent,
        tls,
        http1: Some(Http1Details {
            headers: request.headers,
        }),
        tcpip: ctx.capture.snapshot(peer),
        ..Response::default()
    }
}
