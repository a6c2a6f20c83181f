//! Response types. Field names are a wire contract; existing consumers
//! parse them.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;

use crate::capture::TcpIpDetails;
use crate::fingerprint::{akamai, peetprint, Ja3, Ja4, Transport};
use crate::http2::ParsedFrame;
use crate::tls::ClientHello;

#[derive(Debug, Clone, Serialize, Default)]
pub struct TlsDetails {
    pub ciphers: Vec<String>,
    pub extensions: Vec<serde_json::Value>,
    pub tls_version_record: String,
    pub tls_version_negotiated: String,
    pub ja3: String,
    pub ja3_hash: String,
    pub ja3_padding: String,
    pub ja3_hash_padding: String,
    pub ja4: String,
    pub ja4_r: String,
    pub peetprint: String,
    pub peetprint_hash: String,
    pub client_random: String,
    pub session_id: String,
    /// Raw handshake bytes, exposed only through the raw surface.
    #[serde(skip)]
    pub raw: Vec<u8>,
}

impl TlsDetails {
    /// Derive every TLS fingerprint from the parsed hello. Pure function of
    /// its inputs; the negotiated version comes from the TLS library.
    pub fn build(hello: &ClientHello, negotiated_version: u16, transport: Transport) -> Self {
        let ja3 = Ja3::compute(hello);
        let peet = peetprint::compute(hello);
        let ja4 = Ja4::compute(transport, negotiated_version, hello, &ja3);

        TlsDetails {
            ciphers: ja3.readable_ciphers,
            extensions: hello.readable_extensions(),
            tls_version_record: hello.record_version.to_string(),
            tls_version_negotiated: negotiated_version.to_string(),
            peetprint_hash: peetprint::hash(&peet),
            peetprint: peet,
            ja3_hash: ja3.ja3_hash,
            ja3: ja3.ja3,
            ja3_padding: ja3.ja3_padding,
            ja3_hash_padding: ja3.ja3_hash_padding,
            ja4: ja4.ja4,
            ja4_r: ja4.ja4_r,
            client_random: hello.client_random.clone(),
            session_id: hello.session_id.clone(),
            raw: hello.raw.clone(),
        }
    }

    /// `{hex, base64}` body for the raw surface.
    pub fn raw_surface(&self) -> serde_json::Value {
        serde_json::json!({
            "hex": hex::encode(&self.raw),
            "base64": BASE64.encode(&self.raw),
        })
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Http1Details {
    pub headers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Http2Details {
    pub akamai_fingerprint: String,
    pub akamai_fingerprint_hash: String,
    pub sent_frames: Vec<ParsedFrame>,
}

impl Http2Details {
    pub fn build(frames: Vec<ParsedFrame>) -> Self {
        let fingerprint = akamai::compute(&frames);
        Http2Details {
            akamai_fingerprint_hash: akamai::hash(&fingerprint),
            akamai_fingerprint: fingerprint,
            sent_frames: frames,
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Response {
    pub donate: String,
    pub ip: String,
    pub http_version: String,
    #[serde(skip)]
    pub path: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub tls: TlsDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http1: Option<Http1Details>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http2: Option<Http2Details>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcpip: Option<TcpIpDetails>,
}

impl Response {
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(self).unwrap_or_else(|_| b"{}".to_vec())
    }
}

/// Compact form for `/api/clean`.
#[derive(Debug, Clone, Serialize)]
pub struct SmallResponse {
    pub ja3: String,
    pub ja3_hash: String,
    pub ja4: String,
    pub ja4_r: String,
    pub akamai: String,
    pub akamai_hash: String,
    pub peetprint: String,
    pub peetprint_hash: String,
    pub http_version: String,
}

impl From<&Response> for SmallResponse {
    fn from(res: &Response) -> Self {
        let (akamai, akamai_hash) = match &res.http2 {
            Some(h2) => (
                h2.akamai_fingerprint.clone(),
                h2.akamai_fingerprint_hash.clone(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        SmallResponse {
            ja3: res.tls.ja3.clone(),
            ja3_hash: res.tls.ja3_hash.clone(),
            ja4: res.tls.ja4.clone(),
            ja4_r: res.tls.ja4_r.clone(),
            akamai,
            akamai_hash,
            peetprint: res.tls.peetprint.clone(),
            peetprint_hash: res.tls.peetprint_hash.clone(),
            http_version: res.http_version.clone(),
        }
    }
}
