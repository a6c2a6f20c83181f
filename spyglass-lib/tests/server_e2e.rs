#![forbid(unsafe_code)]

use std::fs;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;
use spyglass_lib::config::{Config, SinkConfig, TlsConfig};
use spyglass_lib::Server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn pick_free_port() -> TestResult<SocketAddr> {
    let listener = StdTcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

struct TestServer {
    addr: SocketAddr,
    connector: TlsConnector,
    sink_path: PathBuf,
    _dir: tempfile::TempDir,
    _shutdown: watch::Sender<bool>,
}

async fn spawn_server(blocked: Vec<&str>) -> TestResult<TestServer> {
    let dir = tempfile::tempdir()?;
    let cert_path = dir.path().join("test.crt");
    let key_path = dir.path().join("test.key");
    let sink_path = dir.path().join("prints.jsonl");

    let rcgen::CertifiedKey { cert, signing_key } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()])?;
    fs::write(&cert_path, cert.pem())?;
    fs::write(&key_path, signing_key.serialize_pem())?;

    let addr = pick_free_port()?;
    let config = Config {
        listen: addr,
        tls: TlsConfig {
            cert_file: cert_path,
            key_file: key_path,
        },
        redirect: None,
        local: false,
        donate: "test".to_string(),
        blocked_networks: blocked.iter().map(|n| n.parse().unwrap()).collect(),
        sink: Some(SinkConfig {
            path: sink_path.clone(),
        }),
    };

    let server = Server::new(Arc::new(config))?;
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = server.run(&mut shutdown_rx).await;
    });
    sleep(Duration::from_millis(50)).await;

    let mut roots = RootCertStore::empty();
    roots.add(cert.der().clone())?;
    let client_cfg = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(client_cfg));

    Ok(TestServer {
        addr,
        connector,
        sink_path,
        _dir: dir,
        _shutdown: shutdown_tx,
    })
}

async fn tls_connect(
    server: &TestServer,
) -> TestResult<tokio_rustls::client::TlsStream<TcpStream>> {
    let stream = TcpStream::connect(server.addr).await?;
    let name = ServerName::try_from("localhost")?;
    Ok(server.connector.connect(name, stream).await?)
}

fn frame(frame_type: u8, flags: u8, stream_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(9 + payload.len());
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
    out.push(frame_type);
    out.push(flags);
    out.extend_from_slice(&stream_id.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// HPACK literal-without-indexing encoding, enough for a request block.
fn literal_headers(pairs: &[(&str, &str)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in pairs {
        out.push(0x00);
        out.push(name.len() as u8);
        out.extend_from_slice(name.as_bytes());
        out.push(value.len() as u8);
        out.extend_from_slice(value.as_bytes());
    }
    out
}

#[tokio::test]
#[serial]
async fn http1_request_returns_fingerprints() -> TestResult<()> {
    let server = spawn_server(vec![]).await?;
    let mut stream = tls_connect(&server).await?;

    stream
        .write_all(b"GET /api/clean HTTP/1.1\r\nHost: localhost\r\nUser-Agent: e2e-test\r\n\r\n")
        .await?;
    let mut response = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut response)).await??;

    let text = String::from_utf8_lossy(&response);
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"), "{text}");
    assert!(text.contains("\"ja3\""), "{text}");
    assert!(text.contains("\"peetprint_hash\""), "{text}");
    assert!(text.contains("\"akamai\": \"-\""), "{text}");

    // The sink sees every completed request.
    sleep(Duration::from_millis(50)).await;
    let recorded = fs::read_to_string(&server.sink_path)?;
    assert_eq!(recorded.lines().count(), 1);
    Ok(())
}

#[tokio::test]
#[serial]
async fn http2_request_returns_akamai_fingerprint() -> TestResult<()> {
    let server = spawn_server(vec![]).await?;
    let mut stream = tls_connect(&server).await?;

    let mut request = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n".to_vec();
    let settings = [
        0x00u8, 0x01, 0x00, 0x01, 0x00, 0x00, // HEADER_TABLE_SIZE = 65536
        0x00, 0x04, 0x00, 0x60, 0x00, 0x00, // INITIAL_WINDOW_SIZE = 6291456
    ];
    request.extend_from_slice(&frame(0x4, 0, 0, &settings));
    request.extend_from_slice(&frame(0x8, 0, 0, &15_663_105u32.to_be_bytes()));
    let headers = literal_headers(&[
        (":method", "GET"),
        (":authority", "localhost"),
        (":scheme", "https"),
        (":path", "/api/all"),
        ("user-agent", "e2e-test"),
    ]);
    // EndStream | EndHeaders
    request.extend_from_slice(&frame(0x1, 0x1 | 0x4, 1, &headers));
    stream.write_all(&request).await?;

    let mut response = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut response)).await??;
    let text = String::from_utf8_lossy(&response);

    assert!(
        text.contains("1:65536;4:6291456|15663105|0|m,a,s,p"),
        "akamai fingerprint missing from {text}"
    );
    assert!(text.contains("\"sent_frames\""), "{text}");
    assert!(text.contains("\"user_agent\": \"e2e-test\""), "{text}");
    Ok(())
}

#[tokio::test]
#[serial]
async fn unknown_route_answers_error_json() -> TestResult<()> {
    let server = spawn_server(vec![]).await?;
    let mut stream = tls_connect(&server).await?;

    stream
        .write_all(b"GET /nope HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await?;
    let mut response = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut response)).await??;

    let text = String::from_utf8_lossy(&response);
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"), "{text}");
    assert!(text.contains("page not found"), "{text}");
    Ok(())
}

#[tokio::test]
#[serial]
async fn blocked_peer_is_dropped_before_tls() -> TestResult<()> {
    let server = spawn_server(vec!["127.0.0.0/8"]).await?;
    let result = tls_connect(&server).await;
    assert!(result.is_err(), "handshake should fail for blocked peers");
    Ok(())
}

#[tokio::test]
#[serial]
async fn garbage_bytes_close_without_response() -> TestResult<()> {
    let server = spawn_server(vec![]).await?;
    let mut stream = TcpStream::connect(server.addr).await?;
    stream.write_all(b"definitely not a tls record").await?;

    let mut buf = Vec::new();
    match timeout(Duration::from_secs(5), stream.read_to_end(&mut buf)).await? {
        Ok(n) => assert_eq!(n, 0, "server must close without responding"),
        Err(_) => {} // reset is also a close
    }
    Ok(())
}
