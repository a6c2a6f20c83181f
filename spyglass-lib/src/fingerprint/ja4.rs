//! JA4: `ja4a_ja4b_ja4c` plus the un-hashed `_r` variant.
//!
//! ja4a is positional metadata, ja4b hashes the sorted cipher list, ja4c
//! hashes the sorted extension list together with the signature algorithms.

use crate::fingerprint::ja3::Ja3;
use crate::fingerprint::sha256_trunc12;
use crate::tls::client_hello::ClientHello;
use crate::tls::grease::is_grease;

/// Transport the hello arrived over; QUIC front-ends reuse the calculator
/// with `Quic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Tcp,
    Quic,
}

impl Transport {
    fn code(self) -> char {
        match self {
            Transport::Tcp => 't',
            Transport::Quic => 'q',
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ja4 {
    pub ja4: String,
    pub ja4_r: String,
}

impl Ja4 {
    /// `negotiated_version` is the version the TLS library settled on
    /// (771/772); the hello and the JA3 intermediates supply everything
    /// else.
    pub fn compute(
        transport: Transport,
        negotiated_version: u16,
        hello: &ClientHello,
        ja3: &Ja3,
    ) -> Self {
        let a = ja4a(transport, negotiated_version, hello, ja3);
        let b_r = ja4b_r(ja3);
        let c_r = ja4c_r(hello, ja3);
        Ja4 {
            ja4: format!("{a}_{}_{}", sha256_trunc12(&b_r), sha256_trunc12(&c_r)),
            ja4_r: format!("{a}_{b_r}_{c_r}"),
        }
    }
}

fn ja4a(transport: Transport, negotiated_version: u16, hello: &ClientHello, ja3: &Ja3) -> String {
    let tls_version = match negotiated_version {
        769 => "10".to_string(),
        770 => "11".to_string(),
        771 => "12".to_string(),
        772 => "13".to_string(),
        other => other.to_string(),
    };
    // SNI is always a domain for this server.
    let sni_mode = 'd';
    let first_alpn = match hello.alpn.first().map(String::as_str) {
        Some("h2") => "h2".to_string(),
        Some("h3") => "h3".to_string(),
        Some("http/0.9" | "http/1.0" | "http/1.1") => "h1".to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    format!(
        "{}{}{}{:02}{:02}{}",
        transport.code(),
        tls_version,
        sni_mode,
        ja3.ciphers.len(),
        ja3.extensions.len(),
        first_alpn,
    )
}

/// Sorted-ascending, 4-hex-digit cipher list.
fn ja4b_r(ja3: &Ja3) -> String {
    let mut ciphers = ja3.ciphers.clone();
    ciphers.sort_unstable();
    join_hex(&ciphers)
}

/// Sorted extension list (SNI, ALPN and padding filtered) joined with the
/// signature algorithms in receipt order.
fn ja4c_r(hello: &ClientHello, ja3: &Ja3) -> String {
    let mut extensions: Vec<u16> = ja3
        .extensions
        .iter()
        .copied()
        .filter(|e| !matches!(e, 0x0000 | 0x0010 | 0x0015))
        .collect();
    extensions.sort_unstable();

    let sig_algs: Vec<u16> = hello
        .signature_algorithms
        .iter()
        .copied()
        .filter(|a| !is_grease(*a))
        .collect();

    format!("{}_{}", join_hex(&extensions), join_hex(&sig_algs))
}

fn join_hex(values: &[u16]) -> String {
    values
        .iter()
        .map(|v| format!("{v:04x}"))
        .collect::<Vec<_>>()
        .join(",")
}
