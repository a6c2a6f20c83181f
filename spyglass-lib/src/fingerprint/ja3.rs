//! JA3 fingerprint: `version,ciphers,extensions,curves,points`.
//!
//! Two variants are emitted for wire compatibility: the canonical form drops
//! the padding extension (21) along with GREASE, the legacy `ja3_padding`
//! form keeps padding.

use crate::fingerprint::md5_hex;
use crate::tls::client_hello::{ClientHello, EXT_PADDING};
use crate::tls::grease::is_grease;
use crate::tls::names::cipher_suite_name;

/// JA3 strings plus the GREASE-filtered intermediates that JA4 reuses.
#[derive(Debug, Clone, Default)]
pub struct Ja3 {
    pub ja3: String,
    pub ja3_hash: String,
    pub ja3_padding: String,
    pub ja3_hash_padding: String,

    /// Cipher ids, GREASE removed, receipt order.
    pub ciphers: Vec<u16>,
    /// Extension ids, GREASE and padding removed, receipt order.
    pub extensions: Vec<u16>,
    /// Group ids, GREASE removed, receipt order.
    pub curves: Vec<u16>,

    /// Cipher names for the readable response section, GREASE included.
    pub readable_ciphers: Vec<String>,
}

impl Ja3 {
    pub fn compute(hello: &ClientHello) -> Self {
        let ciphers: Vec<u16> = hello
            .cipher_suites
            .iter()
            .copied()
            .filter(|c| !is_grease(*c))
            .collect();
        let curves: Vec<u16> = hello
            .supported_groups
            .iter()
            .copied()
            .filter(|g| !is_grease(*g))
            .collect();
        let extensions: Vec<u16> = hello
            .extensions_in_order
            .iter()
            .copied()
            .filter(|e| !is_grease(*e) && *e != EXT_PADDING)
            .collect();
        let extensions_with_padding: Vec<u16> = hello
            .extensions_in_order
            .iter()
            .copied()
            .filter(|e| !is_grease(*e))
            .collect();

        let ja3 = canonical(hello, &ciphers, &extensions, &curves);
        let ja3_padding = canonical(hello, &ciphers, &extensions_with_padding, &curves);
        let ja3_hash = md5_hex(&ja3);
        let ja3_hash_padding = md5_hex(&ja3_padding);

        let readable_ciphers = hello
            .cipher_suites
            .iter()
            .map(|c| cipher_suite_name(*c))
            .collect();

        Ja3 {
            ja3,
            ja3_hash,
            ja3_padding,
            ja3_hash_padding,
            ciphers,
            extensions,
            curves,
            readable_ciphers,
        }
    }
}

fn canonical(hello: &ClientHello, ciphers: &[u16], extensions: &[u16], curves: &[u16]) -> String {
    format!(
        "{},{},{},{},{}",
        hello.record_version,
        join_decimal(ciphers),
        join_decimal(extensions),
        join_decimal(curves),
        hello
            .ec_point_formats
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("-"),
    )
}

fn join_decimal(values: &[u16]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-")
}
