pub mod acceptor;
pub mod client_hello;
pub mod extensions;
pub mod grease;
pub mod names;

pub use acceptor::build_tls_acceptor;
pub use client_hello::ClientHello;
pub use extensions::{Extension, ExtensionPayload};
pub use grease::{is_grease, GREASE_TOKEN};

#[cfg(test)]
pub(crate) mod testdata {
    //! Synthetic ClientHello builders shared by the parser and fingerprint
    //! tests.

    fn ext(id: u16, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(body.len() + 4);
        out.extend_from_slice(&id.to_be_bytes());
        out.extend_from_slice(&(body.len() as u16).to_be_bytes());
        out.extend_from_slice(body);
        out
    }

    fn u16_list(values: &[u16]) -> Vec<u8> {
        let mut out = Vec::with_capacity(values.len() * 2 + 2);
        out.extend_from_slice(&((values.len() * 2) as u16).to_be_bytes());
        for v in values {
            out.extend_from_slice(&v.to_be_bytes());
        }
        out
    }

    /// Wrap a ClientHello body in the handshake header.
    pub fn handshake(body: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(body.len() + 4);
        out.push(0x01);
        out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        out.extend_from_slice(body);
        out
    }

    /// TLS 1.2, one cipher suite, no extensions.
    pub fn minimal_hello() -> Vec<u8> {
        let mut body = vec![0x03, 0x03];
        body.extend_from_slice(&[0x42; 32]);
        body.push(0x00); // session id
        body.extend_from_slice(&[0x00, 0x02, 0x13, 0x01]);
        body.extend_from_slice(&[0x01, 0x00]); // compression: null
        handshake(&body)
    }

    /// A Chrome-shaped hello: GREASE in suites, extensions, groups and
    /// versions; ALPN h2 + http/1.1; TLS 1.3 offered.
    pub fn chrome_like_hello() -> Vec<u8> {
        let mut body = vec![0x03, 0x03];
        body.extend_from_slice(&[0x42; 32]);
        body.push(0x20);
        body.extend_from_slice(&[0x24; 32]);

        let suites: &[u16] = &[0x0a0a, 0x1301, 0x1302, 0x1303, 0xc02b, 0xc02f];
        body.extend_from_slice(&((suites.len() * 2) as u16).to_be_bytes());
        for s in suites {
            body.extend_from_slice(&s.to_be_bytes());
        }
        body.extend_from_slice(&[0x01, 0x00]);

        let mut exts = Vec::new();
        exts.extend_from_slice(&ext(0x1a1a, &[]));
        let mut sni = vec![0x00, 0x0c, 0x00, 0x00, 0x09];
        sni.extend_from_slice(b"localhost");
        exts.extend_from_slice(&ext(0, &sni));
        exts.extend_from_slice(&ext(23, &[]));
        let alpn = {
            let mut body = vec![0x00, 0x0c, 0x02];
            body.extend_from_slice(b"h2");
            body.push(0x08);
            body.extend_from_slice(b"http/1.1");
            body
        };
        exts.extend_from_slice(&ext(16, &alpn));
        exts.extend_from_slice(&ext(10, &u16_list(&[0x2a2a, 29, 23, 24])));
        exts.extend_from_slice(&ext(11, &[0x01, 0x00]));
        exts.extend_from_slice(&ext(13, &u16_list(&[0x0403, 0x0804, 0x0401])));
        exts.extend_from_slice(&ext(43, &[0x06, 0x3a, 0x3a, 0x03, 0x04, 0x03, 0x03]));
        exts.extend_from_slice(&ext(45, &[0x01, 0x01]));
        let key_share = {
            let mut entries = Vec::new();
            entries.extend_from_slice(&0x2a2au16.to_be_bytes());
            entries.extend_from_slice(&[0x00, 0x01, 0x00]);
            entries.extend_from_slice(&29u16.to_be_bytes());
            entries.extend_from_slice(&[0x00, 0x20]);
            entries.extend_from_slice(&[0x77; 32]);
            let mut body = Vec::new();
            body.extend_from_slice(&(entries.len() as u16).to_be_bytes());
            body.extend_from_slice(&entries);
            body
        };
        exts.extend_from_slice(&ext(51, &key_share));
        exts.extend_from_slice(&ext(27, &[0x02, 0x00, 0x02]));
        exts.extend_from_slice(&ext(21, &[0x00; 16]));

        body.extend_from_slice(&(exts.len() as u16).to_be_bytes());
        body.extend_from_slice(&exts);
        handshake(&body)
    }
}
