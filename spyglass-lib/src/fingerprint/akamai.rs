//! Akamai-style HTTP/2 fingerprint: `S|WU|P|HO`.
//!
//! Based on the passive HTTP/2 client fingerprinting scheme described in
//! Shuster's Black Hat EU 2017 paper: the first SETTINGS frame, the first
//! WINDOW_UPDATE increment, every PRIORITY frame, and the pseudo-header
//! order of the request HEADERS.

use crate::fingerprint::md5_hex;
use crate::http2::frames::ParsedFrame;

pub fn compute(frames: &[ParsedFrame]) -> String {
    format!(
        "{}|{}|{}|{}",
        settings_section(frames),
        window_update_section(frames),
        priority_section(frames),
        header_order_section(frames),
    )
}

pub fn hash(fingerprint: &str) -> String {
    md5_hex(fingerprint)
}

/// Semicolon-joined `id:value` of the first SETTINGS frame, received order.
fn settings_section(frames: &[ParsedFrame]) -> String {
    frames
        .iter()
        .find(|f| f.frame_type == "SETTINGS")
        .map(|f| {
            f.settings
                .iter()
                .map(|s| format!("{}:{}", s.id, s.value))
                .collect::<Vec<_>>()
                .join(";")
        })
        .unwrap_or_default()
}

/// Only the first WINDOW_UPDATE counts; `00` when the client sent none.
fn window_update_section(frames: &[ParsedFrame]) -> String {
    frames
        .iter()
        .find_map(|f| f.increment)
        .map(|inc| inc.to_string())
        .unwrap_or_else(|| "00".to_string())
}

/// `stream:exclusive:dependency:weight` for each PRIORITY frame, or `0`.
fn priority_section(frames: &[ParsedFrame]) -> String {
    let parts: Vec<String> = frames
        .iter()
        .filter(|f| f.frame_type == "PRIORITY")
        .filter_map(|f| {
            f.priority.map(|p| {
                format!(
                    "{}:{}:{}:{}",
                    f.stream_id, p.exclusive, p.depends_on, p.weight
                )
            })
        })
        .collect();
    if parts.is_empty() {
        "0".to_string()
    } else {
        parts.join(",")
    }
}

/// One-letter code per pseudo-header of the first HEADERS frame, in arrival
/// order: `:method→m, :authority→a, :scheme→s, :path→p`.
fn header_order_section(frames: &[ParsedFrame]) -> String {
    frames
        .iter()
        .find(|f| f.frame_type == "HEADERS")
        .map(|f| {
            f.headers
                .iter()
                .filter(|h| h.starts_with(':'))
                .filter_map(|h| h.chars().nth(1))
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}
