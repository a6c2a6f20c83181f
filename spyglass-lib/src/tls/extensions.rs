//! Typed extension registry.
//!
//! One variant per extension the fingerprints care about, plus `Grease` and
//! `Unknown`. Decoding an unsupported extension never fails parsing; it is
//! kept verbatim under `Unknown`.

use serde_json::{json, Value};

use crate::error::ParseError;
use crate::tls::client_hello::Reader;
use crate::tls::grease::is_grease;
use crate::tls::names::{
    cert_compression_name, curve_name, extension_name, signature_algorithm_name,
};

/// A single extension as received: the wire id plus its decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub id: u16,
    pub payload: ExtensionPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionPayload {
    /// server_name (0)
    ServerName { names: Vec<String> },
    /// status_request (5) / status_request_v2 (17)
    StatusRequest {
        cert_status_type: u8,
        responder_id_list_length: u16,
        request_extensions_length: u16,
    },
    /// supported_groups (10)
    SupportedGroups { groups: Vec<u16> },
    /// ec_point_formats (11)
    EcPointFormats { formats: Vec<u8> },
    /// signature_algorithms (13) / signature_algorithms_cert (50)
    SignatureAlgorithms { algorithms: Vec<u16> },
    /// application_layer_protocol_negotiation (16)
    Alpn { protocols: Vec<String> },
    /// signed_certificate_timestamp (18); name-only
    SignedCertificateTimestamp,
    /// padding (21)
    Padding { length: usize },
    /// extended_master_secret (23); empty on the wire for every real client
    ExtendedMasterSecret { data: Vec<u8> },
    /// compress_certificate (27)
    CompressCertificate { algorithms: Vec<u16> },
    /// delegated_credentials (34)
    DelegatedCredentials { algorithms: Vec<u16> },
    /// supported_versions (43); GREASE kept in place
    SupportedVersions { versions: Vec<u16> },
    /// psk_key_exchange_modes (45)
    PskKeyExchangeModes { modes: Vec<u8> },
    /// key_share (51); key material itself is not retained
    KeyShare { entries: Vec<KeyShareEntry> },
    /// application_settings (17513 / 17613)
    ApplicationSettings { protocols: Vec<String> },
    /// Any id matching the GREASE pattern
    Grease,
    /// Everything else, kept verbatim
    Unknown { data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyShareEntry {
    pub group: u16,
    pub key_length: u16,
}

impl ExtensionPayload {
    /// Decode one extension payload. `base` is the absolute offset of the
    /// payload within the handshake message, used for truncation reporting.
    pub fn decode(id: u16, data: &[u8], base: usize) -> Result<Self, ParseError> {
        let mut r = Reader::with_base(data, base);
        let payload = match id {
            0 => {
                // list(u16) of {name_type(u8), name(u16-len bytes)}
                let list_len = r.read_u16()? as usize;
                let mut list = Reader::with_base(r.read_bytes(list_len)?, base + 2);
                let mut names = Vec::new();
                while list.remaining() > 0 {
                    let _name_type = list.read_u8()?;
                    let name_len = list.read_u16()? as usize;
                    let name = list.read_bytes(name_len)?;
                    names.push(String::from_utf8_lossy(name).into_owned());
                }
                Self::ServerName { names }
            }
            5 | 17 => Self::StatusRequest {
                cert_status_type: r.read_u8()?,
                responder_id_list_length: r.read_u16()?,
                request_extensions_length: r.read_u16()?,
            },
            10 => Self::SupportedGroups {
                groups: read_u16_list(&mut r)?,
            },
            11 => {
                let len = r.read_u8()? as usize;
                Self::EcPointFormats {
                    formats: r.read_bytes(len)?.to_vec(),
                }
            }
            13 | 50 => Self::SignatureAlgorithms {
                algorithms: read_u16_list(&mut r)?,
            },
            16 => {
                let list_len = r.read_u16()? as usize;
                let mut list = Reader::with_base(r.read_bytes(list_len)?, base + 2);
                let mut protocols = Vec::new();
                while list.remaining() > 0 {
                    let proto_len = list.read_u8()? as usize;
                    let proto = list.read_bytes(proto_len)?;
                    protocols.push(String::from_utf8_lossy(proto).into_owned());
                }
                Self::Alpn { protocols }
            }
            18 => Self::SignedCertificateTimestamp,
            21 => Self::Padding { length: data.len() },
            23 => Self::ExtendedMasterSecret {
                data: data.to_vec(),
            },
            27 => {
                let len = r.read_u8()? as usize;
                let mut list = Reader::with_base(r.read_bytes(len)?, base + 1);
                let mut algorithms = Vec::new();
                while list.remaining() > 0 {
                    algorithms.push(list.read_u16()?);
                }
                Self::CompressCertificate { algorithms }
            }
            34 => Self::DelegatedCredentials {
                algorithms: read_u16_list(&mut r)?,
            },
            43 => {
                let len = r.read_u8()? as usize;
                let mut list = Reader::with_base(r.read_bytes(len)?, base + 1);
                let mut versions = Vec::new();
                while list.remaining() > 0 {
                    versions.push(list.read_u16()?);
                }
                Self::SupportedVersions { versions }
            }
            45 => {
                let len = r.read_u8()? as usize;
                Self::PskKeyExchangeModes {
                    modes: r.read_bytes(len)?.to_vec(),
                }
            }
            51 => {
                let list_len = r.read_u16()? as usize;
                let mut list = Reader::with_base(r.read_bytes(list_len)?, base + 2);
                let mut entries = Vec::new();
                while list.remaining() > 0 {
                    let group = list.read_u16()?;
                    let key_length = list.read_u16()?;
                    list.read_bytes(key_length as usize)?;
                    entries.push(KeyShareEntry { group, key_length });
                }
                Self::KeyShare { entries }
            }
            17513 | 17613 => {
                let list_len = r.read_u16()? as usize;
                let mut list = Reader::with_base(r.read_bytes(list_len)?, base + 2);
                let mut protocols = Vec::new();
                while list.remaining() > 0 {
                    let proto_len = list.read_u8()? as usize;
                    let proto = list.read_bytes(proto_len)?;
                    protocols.push(String::from_utf8_lossy(proto).into_owned());
                }
                Self::ApplicationSettings { protocols }
            }
            _ => Self::Unknown {
                data: data.to_vec(),
            },
        };
        Ok(payload)
    }
}

fn read_u16_list(r: &mut Reader<'_>) -> Result<Vec<u16>, ParseError> {
    let len = r.read_u16()? as usize;
    let base = r.offset();
    let mut list = Reader::with_base(r.read_bytes(len)?, base);
    let mut out = Vec::with_capacity(len / 2);
    while list.remaining() >= 2 {
        out.push(list.read_u16()?);
    }
    Ok(out)
}

impl Extension {
    /// JSON rendering for the `extensions` section of the response.
    pub fn readable(&self) -> Value {
        let name = if is_grease(self.id) {
            format!("TLS_GREASE (0x{:04x})", self.id)
        } else {
            extension_name(self.id)
        };
        match &self.payload {
            ExtensionPayload::ServerName { names } => json!({
                "name": name,
                "server_name": names.first().cloned().unwrap_or_default(),
            }),
            ExtensionPayload::StatusRequest {
                cert_status_type,
                responder_id_list_length,
                request_extensions_length,
            } => json!({
                "name": name,
                "status_request": {
                    "cert_status_type": cert_status_type,
                    "responder_id_list_length": responder_id_list_length,
                    "request_extensions_length": request_extensions_length,
                },
            }),
            ExtensionPayload::SupportedGroups { groups } => json!({
                "name": name,
                "supported_groups": groups
                    .iter()
                    .map(|g| curve_name(*g))
                    .collect::<Vec<_>>(),
            }),
            ExtensionPayload::EcPointFormats { formats } => json!({
                "name": name,
                "elliptic_curves_point_formats": formats
                    .iter()
                    .map(|f| format!("0x{f:02x}"))
                    .collect::<Vec<_>>(),
            }),
            ExtensionPayload::SignatureAlgorithms { algorithms } => json!({
                "name": name,
                "signature_algorithms": algorithms
                    .iter()
                    .map(|a| signature_algorithm_name(*a))
                    .collect::<Vec<_>>(),
            }),
            ExtensionPayload::Alpn { protocols } => json!({
                "name": name,
                "protocols": protocols,
            }),
            ExtensionPayload::SignedCertificateTimestamp => json!({ "name": name }),
            ExtensionPayload::Padding { length } => json!({
                "name": name,
                "padding_data_length": length,
            }),
            ExtensionPayload::ExtendedMasterSecret { data } => json!({
                "name": name,
                "master_secret_data": hex::encode(data),
            }),
            ExtensionPayload::CompressCertificate { algorithms } => json!({
                "name": name,
                "algorithms": algorithms
                    .iter()
                    .map(|a| cert_compression_name(*a))
                    .collect::<Vec<_>>(),
            }),
            ExtensionPayload::DelegatedCredentials { algorithms } => json!({
                "name": name,
                "signature_hash_algorithms": algorithms
                    .iter()
                    .map(|a| signature_algorithm_name(*a))
                    .collect::<Vec<_>>(),
            }),
            ExtensionPayload::SupportedVersions { versions } => json!({
                "name": name,
                "versions": versions
                    .iter()
                    .map(|v| readable_tls_version(*v))
                    .collect::<Vec<_>>(),
            }),
            ExtensionPayload::PskKeyExchangeModes { modes } => json!({
                "name": name,
                "PSK_Key_Exchange_Mode": modes
                    .first()
                    .map(|m| psk_mode_name(*m))
                    .unwrap_or_default(),
            }),
            ExtensionPayload::KeyShare { entries } => json!({
                "name": name,
                "shared_keys": entries
                    .iter()
                    .map(|e| json!({ curve_name(e.group): e.key_length }))
                    .collect::<Vec<_>>(),
            }),
            ExtensionPayload::ApplicationSettings { protocols } => json!({
                "name": name,
                "protocols": protocols,
            }),
            ExtensionPayload::Grease => json!({ "name": name }),
            ExtensionPayload::Unknown { data } => json!({
                "name": name,
                "data": hex::encode(data),
            }),
        }
    }
}

fn readable_tls_version(v: u16) -> String {
    if is_grease(v) {
        return format!("TLS_GREASE (0x{v:04x})");
    }
    match v {
        0x0304 => "TLS 1.3".to_string(),
        0x0303 => "TLS 1.2".to_string(),
        0x0302 => "TLS 1.1".to_string(),
        0x0301 => "TLS 1.0".to_string(),
        _ => format!("0x{v:04x}"),
    }
}

fn psk_mode_name(mode: u8) -> String {
    match mode {
        0 => "PSK-KE (0)".to_string(),
        1 => "PSK-DHE-KE (1)".to_string(),
        _ => format!("0x{mode:02x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_name_decodes_utf8() {
        // list_len=12, type=0, name_len=9, "localhost"
        let mut data = vec![0x00, 0x0c, 0x00, 0x00, 0x09];
        data.extend_from_slice(b"localhost");
        let payload = ExtensionPayload::decode(0, &data, 0).unwrap();
        match payload {
            ExtensionPayload::ServerName { names } => assert_eq!(names, vec!["localhost"]),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn alpn_decodes_protocol_list() {
        let data = [
            0x00, 0x0c, 0x02, b'h', b'2', 0x08, b'h', b't', b't', b'p', b'/', b'1', b'.', b'1',
        ];
        let payload = ExtensionPayload::decode(16, &data, 0).unwrap();
        match payload {
            ExtensionPayload::Alpn { protocols } => {
                assert_eq!(protocols, vec!["h2", "http/1.1"]);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn key_share_skips_key_material() {
        // list_len=8, group=29, len=4, 4 bytes
        let data = [0x00, 0x08, 0x00, 0x1d, 0x00, 0x04, 1, 2, 3, 4];
        let payload = ExtensionPayload::decode(51, &data, 0).unwrap();
        match payload {
            ExtensionPayload::KeyShare { entries } => {
                assert_eq!(
                    entries,
                    vec![KeyShareEntry {
                        group: 29,
                        key_length: 4
                    }]
                );
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn truncated_known_extension_fails() {
        // supported_groups claiming 4 bytes but carrying 2
        let data = [0x00, 0x04, 0x00, 0x1d];
        let err = ExtensionPayload::decode(10, &data, 100).unwrap_err();
        assert_eq!(err, ParseError::Truncated { offset: 102 });
    }

    #[test]
    fn unknown_extension_kept_verbatim() {
        let payload = ExtensionPayload::decode(62, &[0xde, 0xad], 0).unwrap();
        match payload {
            ExtensionPayload::Unknown { data } => assert_eq!(data, vec![0xde, 0xad]),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
