//! Byte-level ClientHello parser.
//!
//! Consumes the raw handshake message (starting at the handshake header, as
//! surfaced by the TLS transport before the handshake is driven) and produces
//! the canonical intermediate representation every fingerprint derives from.
//!
//! Sequence order is preserved exactly as received. GREASE values are kept in
//! place; fingerprints filter them according to their own rules.

use crate::error::ParseError;
use crate::tls::extensions::{Extension, ExtensionPayload};
use crate::tls::grease::is_grease;

pub const EXT_SUPPORTED_GROUPS: u16 = 10;
pub const EXT_EC_POINT_FORMATS: u16 = 11;
pub const EXT_SIGNATURE_ALGORITHMS: u16 = 13;
pub const EXT_ALPN: u16 = 16;
pub const EXT_PADDING: u16 = 21;
pub const EXT_COMPRESS_CERTIFICATE: u16 = 27;
pub const EXT_SUPPORTED_VERSIONS: u16 = 43;
pub const EXT_PSK_KEY_EXCHANGE_MODES: u16 = 45;

/// Bounds-checked cursor over a byte slice.
///
/// Every read failure carries the absolute offset at which the input ran
/// out, so `ParseError::Truncated` pinpoints the malformed field.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    /// A reader over a sub-slice that reports offsets relative to the
    /// original input.
    pub(crate) fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    pub(crate) fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, ParseError> {
        let b = self.read_bytes(1)?;
        Ok(b[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, ParseError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_u24(&mut self) -> Result<u32, ParseError> {
        let b = self.read_bytes(3)?;
        Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        if self.remaining() < n {
            return Err(ParseError::Truncated { offset: self.offset() });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }
}

/// Structured ClientHello.
///
/// `extensions_in_order` is the source of truth for extension ordering; the
/// per-extension fields (`supported_groups`, `alpn`, ...) are populated only
/// by their respective extension handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientHello {
    /// legacy_version field; 0x0303 or 0x0304, anything else fails parsing.
    pub record_version: u16,
    /// 32 bytes, hex-encoded.
    pub client_random: String,
    /// 0-32 bytes, hex-encoded.
    pub session_id: String,
    /// GREASE preserved in order.
    pub cipher_suites: Vec<u16>,
    /// Raw hex.
    pub compression_methods: String,
    /// Every extension id as received, GREASE preserved.
    pub extensions_in_order: Vec<u16>,
    /// Typed extension payloads, same order as `extensions_in_order`.
    pub extensions: Vec<Extension>,
    pub supported_groups: Vec<u16>,
    pub ec_point_formats: Vec<u8>,
    pub alpn: Vec<String>,
    pub supported_versions: Vec<u16>,
    pub signature_algorithms: Vec<u16>,
    pub psk_key_exchange_mode: Option<u8>,
    pub cert_compression_algorithms: Vec<u16>,
    /// The raw handshake message, kept for the raw surface.
    pub raw: Vec<u8>,
}

impl ClientHello {
    /// Parse a handshake message. The input must begin with the handshake
    /// type byte (0x01 for ClientHello).
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let mut r = Reader::new(raw);

        let msg_type = r.read_u8()?;
        if msg_type != 0x01 {
            return Err(ParseError::UnsupportedMessageType(msg_type));
        }
        let _body_len = r.read_u24()?;

        let record_version = r.read_u16()?;
        if record_version != 0x0303 && record_version != 0x0304 {
            return Err(ParseError::UnsupportedVersion(record_version));
        }

        let client_random = hex::encode(r.read_bytes(32)?);

        let sid_len = r.read_u8()? as usize;
        let session_id = hex::encode(r.read_bytes(sid_len)?);

        let suites_len = r.read_u16()? as usize;
        let suites_base = r.offset();
        let mut suites = Reader::with_base(r.read_bytes(suites_len)?, suites_base);
        let mut cipher_suites = Vec::with_capacity(suites_len / 2);
        while suites.remaining() > 0 {
            cipher_suites.push(suites.read_u16()?);
        }

        let comp_len = r.read_u8()? as usize;
        let compression_methods = hex::encode(r.read_bytes(comp_len)?);

        let mut hello = ClientHello {
            record_version,
            client_random,
            session_id,
            cipher_suites,
            compression_methods,
            raw: raw.to_vec(),
            ..ClientHello::default()
        };

        // The extensions block is optional in the wire format, but every
        // modern hello carries one.
        if r.remaining() > 0 {
            let ext_len = r.read_u16()? as usize;
            let ext_base = r.offset();
            let mut exts = Reader::with_base(r.read_bytes(ext_len)?, ext_base);
            while exts.remaining() > 0 {
                let id = exts.read_u16()?;
                let data_len = exts.read_u16()? as usize;
                let data_base = exts.offset();
                let data = exts.read_bytes(data_len)?;
                hello.extensions_in_order.push(id);
                let payload = if is_grease(id) {
                    ExtensionPayload::Grease
                } else {
                    ExtensionPayload::decode(id, data, data_base)?
                };
                hello.apply(id, &payload);
                hello.extensions.push(Extension { id, payload });
            }
        }

        Ok(hello)
    }

    /// Populate the derived per-extension fields.
    fn apply(&mut self, id: u16, payload: &ExtensionPayload) {
        match (id, payload) {
            (EXT_SUPPORTED_GROUPS, ExtensionPayload::SupportedGroups { groups }) => {
                self.supported_groups = groups.clone();
            }
            (EXT_EC_POINT_FORMATS, ExtensionPayload::EcPointFormats { formats }) => {
                self.ec_point_formats = formats.clone();
            }
            (EXT_ALPN, ExtensionPayload::Alpn { protocols }) => {
                self.alpn = protocols.clone();
            }
            (EXT_SUPPORTED_VERSIONS, ExtensionPayload::SupportedVersions { versions }) => {
                self.supported_versions = versions.clone();
            }
            (EXT_SIGNATURE_ALGORITHMS, ExtensionPayload::SignatureAlgorithms { algorithms }) => {
                self.signature_algorithms = algorithms.clone();
            }
            (EXT_PSK_KEY_EXCHANGE_MODES, ExtensionPayload::PskKeyExchangeModes { modes }) => {
                self.psk_key_exchange_mode = modes.first().copied();
            }
            (EXT_COMPRESS_CERTIFICATE, ExtensionPayload::CompressCertificate { algorithms }) => {
                self.cert_compression_algorithms = algorithms.clone();
            }
            _ => {}
        }
    }

    /// Readable JSON forms of the parsed extensions, in receipt order.
    pub fn readable_extensions(&self) -> Vec<serde_json::Value> {
        self.extensions.iter().map(Extension::readable).collect()
    }
}
