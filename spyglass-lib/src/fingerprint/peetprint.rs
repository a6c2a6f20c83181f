//! PeetPrint: eight pipe-delimited fields, GREASE preserved as a literal
//! token, extensions sorted so browser randomisation cannot move the
//! fingerprint.

use crate::fingerprint::md5_hex;
use crate::tls::client_hello::ClientHello;
use crate::tls::grease::{is_grease, GREASE_TOKEN};

/// `tls_versions|alpn|groups|signature_algorithms|psk_mode|cert_compression|ciphers|extensions`
pub fn compute(hello: &ClientHello) -> String {
    let tls_versions = grease_or_decimal(&hello.supported_versions);

    let alpn = hello
        .alpn
        .iter()
        .filter_map(|p| match p.to_lowercase().as_str() {
            "h2" => Some("2"),
            "http/1.1" => Some("1.1"),
            "http/1.0" => Some("1.0"),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("-");

    let groups = grease_or_decimal(&hello.supported_groups);
    let signature_algorithms = grease_or_decimal(&hello.signature_algorithms);
    let psk_mode = hello.psk_key_exchange_mode.unwrap_or(0).to_string();
    let cert_compression = grease_or_decimal(&hello.cert_compression_algorithms);
    let ciphers = grease_or_decimal(&hello.cipher_suites);

    // Receipt order is randomised by browsers; sort the ids ascending and
    // keep the GREASE tokens at the tail so the field stays stable.
    let mut ids: Vec<u16> = hello
        .extensions_in_order
        .iter()
        .copied()
        .filter(|e| !is_grease(*e))
        .collect();
    ids.sort_unstable();
    let mut extensions: Vec<String> = ids.iter().map(|e| e.to_string()).collect();
    extensions.extend(
        hello
            .extensions_in_order
            .iter()
            .filter(|e| is_grease(**e))
            .map(|_| GREASE_TOKEN.to_string()),
    );
    let extensions = extensions.join("-");

    format!(
        "{tls_versions}|{alpn}|{groups}|{signature_algorithms}|{psk_mode}|{cert_compression}|{ciphers}|{extensions}"
    )
}

pub fn hash(peetprint: &str) -> String {
    md5_hex(peetprint)
}

fn grease_or_decimal(values: &[u16]) -> String {
    values
        .iter()
        .map(|v| {
            if is_grease(*v) {
                GREASE_TOKEN.to_string()
            } else {
                v.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
