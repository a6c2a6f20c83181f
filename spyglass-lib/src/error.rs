use thiserror::Error;

/// Errors raised while parsing a raw ClientHello.
///
/// No partial fingerprint is ever produced from a hello that failed to
/// parse; callers close the connection on any of these.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unsupported handshake message type: 0x{0:02x}")]
    UnsupportedMessageType(u8),

    #[error("unsupported TLS version: 0x{0:04x}")]
    UnsupportedVersion(u16),

    #[error("truncated ClientHello at offset {offset}")]
    Truncated { offset: usize },
}

/// Errors raised while observing the HTTP/2 frame preamble.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed {frame} frame: {reason}")]
    Malformed {
        frame: &'static str,
        reason: &'static str,
    },

    #[error("HPACK decode error: {0}")]
    Hpack(String),
}

/// Errors raised by the server runtime.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No private key found in key file")]
    NoPrivateKey,
}

pub type Result<T> = std::result::Result<T, ServerError>;
