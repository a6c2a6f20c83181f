//! Fingerprint calculators.
//!
//! All four are pure functions over the parsed [`ClientHello`] and the
//! observed HTTP/2 frames; nothing here re-reads the wire.

pub mod akamai;
pub mod ja3;
pub mod ja4;
pub mod peetprint;

pub use ja3::Ja3;
pub use ja4::{Ja4, Transport};

use md5::{Digest as _, Md5};
use sha2::{Digest as _, Sha256};

/// Lowercase hex MD5 of the canonical string.
pub fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

/// First 12 hex chars of the SHA-256, as used by the JA4 b/c sections.
pub fn sha256_trunc12(input: &str) -> String {
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_matches_known_vector() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn sha256_trunc_is_prefix() {
        // sha256("abc") = ba7816bf8f01...
        assert_eq!(sha256_trunc12("abc"), "ba7816bf8f01");
    }
}
