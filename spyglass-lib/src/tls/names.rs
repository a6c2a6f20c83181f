//! Static id→name tables for readable output.
//!
//! Sources: the IANA TLS registries plus the BoringSSL additions; the tables
//! are part of the wire contract and render exactly these strings.

use crate::tls::grease::is_grease;

/// Extension id → registered name.
/// <https://www.iana.org/assignments/tls-extensiontype-values/tls-extensiontype-values.xhtml>
/// <https://boringssl.googlesource.com/boringssl/+/master/ssl/test/runner/common.go>
const EXTENSIONS: &[(u16, &str)] = &[
    (0, "server_name"),
    (1, "max_fragment_length"),
    (2, "client_certificate_url"),
    (3, "trusted_ca_keys"),
    (4, "truncated_hmac"),
    (5, "status_request"),
    (6, "user_mapping"),
    (7, "client_authz"),
    (8, "server_authz"),
    (9, "cert_type"),
    (10, "supported_groups"),
    (11, "ec_point_formats"),
    (12, "srp"),
    (13, "signature_algorithms"),
    (14, "use_srtp"),
    (15, "heartbeat"),
    (16, "application_layer_protocol_negotiation"),
    (17, "status_request_v2"),
    (18, "signed_certificate_timestamp"),
    (19, "client_certificate_type"),
    (20, "server_certificate_type"),
    (21, "padding"),
    (22, "encrypt_then_mac"),
    (23, "extended_master_secret"),
    (24, "token_binding"),
    (25, "cached_info"),
    (26, "tls_lts"),
    (27, "compress_certificate"),
    (28, "record_size_limit"),
    (29, "pwd_protect"),
    (30, "pwd_clear"),
    (31, "password_salt"),
    (32, "ticket_pinning"),
    (33, "tls_cert_with_extern_psk"),
    (34, "delegated_credentials"),
    (35, "session_ticket"),
    (36, "TLMSP"),
    (37, "TLMSP_proxying"),
    (38, "TLMSP_delegate"),
    (39, "supported_ekt_ciphers"),
    (40, "Reserved"),
    (41, "pre_shared_key"),
    (42, "early_data"),
    (43, "supported_versions"),
    (44, "cookie"),
    (45, "psk_key_exchange_modes"),
    (46, "Reserved"),
    (47, "certificate_authorities"),
    (48, "oid_filters"),
    (49, "post_handshake_auth"),
    (50, "signature_algorithms_cert"),
    (51, "key_share"),
    (52, "transparency_info"),
    (53, "connection_id (deprecated)"),
    (54, "connection_id"),
    (55, "external_id_hash"),
    (56, "external_session_id"),
    (57, "quic_transport_parameters"),
    (58, "ticket_request"),
    (59, "dnssec_chain"),
    (1234, "extensionCustom (boringssl)"),
    (13172, "extensionNextProtoNeg (boringssl)"),
    (17513, "extensionApplicationSettings (boringssl)"),
    (17613, "extensionApplicationSettingsNew (boringssl)"),
    (30032, "extensionChannelID (boringssl)"),
    (64768, "extensionECHOuterExtensions (boringssl)"),
    (65037, "extensionEncryptedClientHello (boringssl)"),
    (65281, "extensionRenegotiationInfo (boringssl)"),
    (65445, "extensionQUICTransportParamsLegacy (boringssl)"),
    (65535, "extensionDuplicate (boringssl)"),
];

/// Renders `name (id)` for registered extensions, `Unknown extension N`
/// otherwise.
pub fn extension_name(id: u16) -> String {
    match EXTENSIONS.iter().find(|(i, _)| *i == id) {
        Some((_, name)) => format!("{name} ({id})"),
        None => format!("Unknown extension {id}"),
    }
}

/// Cipher suite id → IANA name, including the BoringSSL-visible legacy set.
const CIPHER_SUITES: &[(u16, &str)] = &[
    (0x0001, "TLS_RSA_WITH_NULL_MD5"),
    (0x0002, "TLS_RSA_WITH_NULL_SHA"),
    (0x0004, "TLS_RSA_WITH_RC4_128_MD5"),
    (0x0005, "TLS_RSA_WITH_RC4_128_SHA"),
    (0x000a, "TLS_RSA_WITH_3DES_EDE_CBC_SHA"),
    (0x002f, "TLS_RSA_WITH_AES_128_CBC_SHA"),
    (0x0033, "TLS_DHE_RSA_WITH_AES_128_CBC_SHA"),
    (0x0035, "TLS_RSA_WITH_AES_256_CBC_SHA"),
    (0x0039, "TLS_DHE_RSA_WITH_AES_256_CBC_SHA"),
    (0x003c, "TLS_RSA_WITH_AES_128_CBC_SHA256"),
    (0x003d, "TLS_RSA_WITH_AES_256_CBC_SHA256"),
    (0x0067, "TLS_DHE_RSA_WITH_AES_128_CBC_SHA256"),
    (0x006b, "TLS_DHE_RSA_WITH_AES_256_CBC_SHA256"),
    (0x008c, "TLS_PSK_WITH_AES_128_CBC_SHA"),
    (0x008d, "TLS_PSK_WITH_AES_256_CBC_SHA"),
    (0x009c, "TLS_RSA_WITH_AES_128_GCM_SHA256"),
    (0x009d, "TLS_RSA_WITH_AES_256_GCM_SHA384"),
    (0x009e, "TLS_DHE_RSA_WITH_AES_128_GCM_SHA256"),
    (0x009f, "TLS_DHE_RSA_WITH_AES_256_GCM_SHA384"),
    (0x1301, "TLS_AES_128_GCM_SHA256"),
    (0x1302, "TLS_AES_256_GCM_SHA384"),
    (0x1303, "TLS_CHACHA20_POLY1305_SHA256"),
    (0x1304, "TLS_AES_128_CCM_SHA256"),
    (0x1305, "TLS_AES_128_CCM_8_SHA256"),
    (0xc007, "TLS_ECDHE_ECDSA_WITH_RC4_128_SHA"),
    (0xc008, "TLS_ECDHE_ECDSA_WITH_3DES_EDE_CBC_SHA"),
    (0xc009, "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA"),
    (0xc00a, "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA"),
    (0xc011, "TLS_ECDHE_RSA_WITH_RC4_128_SHA"),
    (0xc012, "TLS_ECDHE_RSA_WITH_3DES_EDE_CBC_SHA"),
    (0xc013, "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA"),
    (0xc014, "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA"),
    (0xc023, "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256"),
    (0xc024, "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384"),
    (0xc027, "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256"),
    (0xc028, "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384"),
    (0xc02b, "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256"),
    (0xc02c, "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384"),
    (0xc02f, "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"),
    (0xc030, "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384"),
    (0xc035, "TLS_ECDHE_PSK_WITH_AES_128_CBC_SHA"),
    (0xc036, "TLS_ECDHE_PSK_WITH_AES_256_CBC_SHA"),
    (0xcca8, "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256"),
    (0xcca9, "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256"),
    (0xccaa, "TLS_DHE_RSA_WITH_CHACHA20_POLY1305_SHA256"),
    (0xccac, "TLS_ECDHE_PSK_WITH_CHACHA20_POLY1305_SHA256"),
];

/// Renders the IANA name, `TLS_GREASE (0xNANA)` for GREASE values, or the
/// raw hex form for anything unregistered.
pub fn cipher_suite_name(id: u16) -> String {
    if is_grease(id) {
        return format!("TLS_GREASE (0x{id:04x})");
    }
    match CIPHER_SUITES.iter().find(|(i, _)| *i == id) {
        Some((_, name)) => (*name).to_string(),
        None => format!("0x{id:04X}"),
    }
}

/// Supported group (curve) id → name.
const CURVES: &[(u16, &str)] = &[
    (23, "Curve P-256 (23)"),
    (24, "Curve P-384 (24)"),
    (25, "Curve P-521 (25)"),
    (29, "Curve X25519 (29)"),
    (30, "Curve X448 (30)"),
    (256, "ffdhe2048 (256)"),
    (257, "ffdhe3072 (257)"),
    (4587, "SecP256r1MLKEM768 (4587)"),
    (4588, "X25519MLKEM768 (4588)"),
    (25497, "X25519Kyber768Draft00 (25497)"),
];

pub fn curve_name(id: u16) -> String {
    if is_grease(id) {
        return format!("TLS_GREASE (0x{id:04x})");
    }
    match CURVES.iter().find(|(i, _)| *i == id) {
        Some((_, name)) => (*name).to_string(),
        None => format!("Unknown curve {id}"),
    }
}

/// Signature scheme id → name (RFC 8446 §4.2.3 plus legacy values).
const SIGNATURE_ALGORITHMS: &[(u16, &str)] = &[
    (0x0201, "rsa_pkcs1_sha1"),
    (0x0203, "ecdsa_sha1"),
    (0x0401, "rsa_pkcs1_sha256"),
    (0x0403, "ecdsa_secp256r1_sha256"),
    (0x0501, "rsa_pkcs1_sha384"),
    (0x0503, "ecdsa_secp384r1_sha384"),
    (0x0601, "rsa_pkcs1_sha512"),
    (0x0603, "ecdsa_secp521r1_sha512"),
    (0x0804, "rsa_pss_rsae_sha256"),
    (0x0805, "rsa_pss_rsae_sha384"),
    (0x0806, "rsa_pss_rsae_sha512"),
    (0x0807, "ed25519"),
    (0x0808, "ed448"),
    (0x0809, "rsa_pss_pss_sha256"),
    (0x080a, "rsa_pss_pss_sha384"),
    (0x080b, "rsa_pss_pss_sha512"),
];

pub fn signature_algorithm_name(id: u16) -> String {
    if is_grease(id) {
        return format!("TLS_GREASE (0x{id:04x})");
    }
    match SIGNATURE_ALGORITHMS.iter().find(|(i, _)| *i == id) {
        Some((_, name)) => (*name).to_string(),
        None => format!("0x{id:04X}"),
    }
}

/// Certificate compression algorithm id → name (RFC 8879).
pub fn cert_compression_name(id: u16) -> String {
    match id {
        1 => "zlib (1)".to_string(),
        2 => "brotli (2)".to_string(),
        3 => "zstd (3)".to_string(),
        _ => format!("0x{id:04x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_names_render_id_suffix() {
        assert_eq!(extension_name(0), "server_name (0)");
        assert_eq!(extension_name(43), "supported_versions (43)");
        assert_eq!(extension_name(60), "Unknown extension 60");
    }

    #[test]
    fn grease_ciphers_render_grease() {
        assert_eq!(cipher_suite_name(0x8a8a), "TLS_GREASE (0x8a8a)");
        assert_eq!(cipher_suite_name(0x1301), "TLS_AES_128_GCM_SHA256");
        assert_eq!(cipher_suite_name(0xfff0), "0xFFF0");
    }

    #[test]
    fn curve_names() {
        assert_eq!(curve_name(29), "Curve X25519 (29)");
        assert_eq!(curve_name(9999), "Unknown curve 9999");
    }
}
