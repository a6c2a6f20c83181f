#![forbid(unsafe_code)]

//! Passive TLS/HTTP fingerprinting server.
//!
//! Clients connect over TLS; the raw ClientHello and the HTTP/2 framing
//! preamble they emit are parsed into a canonical representation, from which
//! JA3, JA4, PeetPrint and the Akamai HTTP/2 fingerprint are derived and
//! echoed back as JSON.

pub mod capture;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod http2;
pub mod server;
pub mod sink;
pub mod tls;

pub use capture::{CaptureMap, TcpIpDetails};
pub use config::{load_from_path, Config};
pub use error::{FrameError, ParseError, Result, ServerError};
pub use fingerprint::{Ja3, Ja4, Transport};
pub use server::response::{Response, SmallResponse, TlsDetails};
pub use server::{run, Server};
pub use sink::{FingerprintSink, JsonlSink, NoopSink};
pub use tls::{build_tls_acceptor, ClientHello};
