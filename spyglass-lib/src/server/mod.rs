pub mod connection;
pub mod http1;
pub mod response;
pub mod router;
pub mod stream;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;
use tokio_rustls::rustls::ProtocolVersion;
use tokio_rustls::TlsAcceptor;
use tracing::{info, warn};

use crate::capture::CaptureMap;
use crate::config::Config;
use crate::error::Result;
use crate::fingerprint::Transport;
use crate::server::connection::ConnectionContext;
use crate::server::response::TlsDetails;
use crate::server::stream::PrefixedStream;
use crate::sink::{FingerprintSink, JsonlSink, NoopSink};
use crate::tls::{build_tls_acceptor, ClientHello};

/// Ceiling on the READ_PRELUDE + HTTP2_FRAMES phase.
const CONNECTION_DEADLINE: Duration = Duration::from_secs(15);

/// Upper bound on the buffered ClientHello record.
const MAX_CLIENT_HELLO: usize = 64 * 1024;

pub struct Server {
    config: Arc<Config>,
    acceptor: Arc<TlsAcceptor>,
    capture: Arc<CaptureMap>,
    sink: Arc<dyn FingerprintSink>,
}

impl Server {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let acceptor = build_tls_acceptor(&config.tls.cert_file, &config.tls.key_file)?;
        let sink: Arc<dyn FingerprintSink> = match &config.sink {
            Some(sink_cfg) => Arc::new(JsonlSink::open(&sink_cfg.path)?),
            None => Arc::new(NoopSink),
        };
        Ok(Server {
            config,
            acceptor,
            capture: Arc::new(CaptureMap::default()),
            sink,
        })
    }

    /// The capture sidecar writes its per-peer records here.
    pub fn capture_map(&self) -> Arc<CaptureMap> {
        self.capture.clone()
    }

    pub async fn run(&self, shutdown: &mut watch::Receiver<bool>) -> Result<()> {
        let listener = TcpListener::bind(self.config.listen).await?;
        info!(addr = ?self.config.listen, "tls listener bound");

        if let Some(redirect) = self.config.redirect.clone() {
            tokio::spawn(async move {
                if let Err(e) = run_redirect(redirect.listen, redirect.target).await {
                    warn!(error = %e, "redirect listener exited");
                }
            });
        }

        loop {
            let accept_fut = listener.accept();
            let result = tokio::select! {
                res = accept_fut => res,
                res = shutdown.changed() => {
                    if res.is_ok() {
                        info!("shutdown signal received, stopping accept loop");
                        break;
                    } else {
                        continue;
                    }
                }
            };
            let (client, addr) = match result {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };
            if self.config.is_blocked(addr.ip()) {
                info!(%addr, "blocked peer dropped");
                continue;
            }

            let ctx = ConnectionContext {
                config: self.config.clone(),
                capture: self.capture.clone(),
                sink: self.sink.clone(),
            };
            let acceptor = self.acceptor.clone();
            let handle = tokio::spawn(async move {
                handle_connection(client, addr, acceptor, ctx).await;
            });
            // Connection tasks are isolated; a panic is logged here instead
            // of propagating into the accept loop.
            tokio::spawn(async move {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        warn!(%addr, "connection task panicked");
                    }
                }
            });
        }
        Ok(())
    }
}

/// Top-level entry used by the binary: build the server and run until
/// shutdown.
pub async fn run(config: Arc<Config>, shutdown: &mut watch::Receiver<bool>) -> Result<()> {
    Server::new(config)?.run(shutdown).await
}

async fn handle_connection(
    mut client: TcpStream,
    addr: std::net::SocketAddr,
    acceptor: Arc<TlsAcceptor>,
    ctx: ConnectionContext,
) {
    let record = match read_client_hello_record(&mut client).await {
        Ok(record) => record,
        Err(e) => {
            warn!(%addr, error = %e, "failed to read ClientHello record");
            return;
        }
    };

    let hello = match ClientHello::parse(&record[5..]) {
        Ok(hello) => hello,
        Err(e) => {
            warn!(%addr, error = %e, "failed to parse ClientHello");
            return;
        }
    };

    // Replay the consumed record so rustls drives the handshake normally.
    let replay = PrefixedStream::new(record, client);
    let mut tls_stream = match acceptor.accept(replay).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(%addr, error = %e, "tls handshake failed");
            return;
        }
    };

    let negotiated = match tls_stream.get_ref().1.protocol_version() {
        Some(ProtocolVersion::TLSv1_3) => 772,
        Some(ProtocolVersion::TLSv1_2) => 771,
        _ => 0,
    };
    let details = TlsDetails::build(&hello, negotiated, Transport::Tcp);

    match timeout(
        CONNECTION_DEADLINE,
        connection::drive(&mut tls_stream, details, addr, &ctx),
    )
    .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            info!(%addr, error = %e, "connection ended with error");
        }
        Err(_) => {
            info!(%addr, "connection deadline exceeded");
        }
    }
    let _ = tls_stream.shutdown().await;
}

/// Consume the first TLS record off the socket and return it whole
/// (header included). The handshake message inside starts at byte 5.
async fn read_client_hello_record(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(4096);
    loop {
        if buf.len() >= 5 {
            if buf[0] != 0x16 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "not a TLS handshake record",
                ));
            }
            let record_len = u16::from_be_bytes([buf[3], buf[4]]) as usize;
            if buf.len() >= record_len + 5 {
                return Ok(buf);
            }
        }
        if buf.len() > MAX_CLIENT_HELLO {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "ClientHello record too large",
            ));
        }
        let read = stream.read_buf(&mut buf).await?;
        if read == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before ClientHello completed",
            ));
        }
    }
}

/// Plain-HTTP listener that shoves clients over to the TLS endpoint.
async fn run_redirect(addr: std::net::SocketAddr, target: String) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = ?addr, target = %target, "redirect listener bound");
    loop {
        let (mut stream, _peer) = listener.accept().await?;
        let target = target.clone();
        tokio::spawn(async move {
            let mut discard = [0u8; 1024];
            let _ = stream.read(&mut discard).await;
            let response = format!(
                "HTTP/1.1 301 Moved Permanently\r\nLocation: {target}\r\nContent-Length: 0\r\n\r\n"
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });
    }
}
