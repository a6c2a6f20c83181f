use std::fs;
use std::path::Path;
use std::sync::Arc;

use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::error::{Result, ServerError};

/// Build the TLS acceptor from PEM cert and key files.
///
/// ALPN is offered as `h2` then `http/1.1`; the client's selection decides
/// which prelude the state machine will see.
pub fn build_tls_acceptor(cert_path: &Path, key_path: &Path) -> Result<Arc<TlsAcceptor>> {
    let certs = load_certs(cert_path)?;
    let key = load_key(key_path)?;

    let mut cfg = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Tls(format!("failed to build tls config: {e}")))?;
    cfg.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(TlsAcceptor::from(Arc::new(cfg))))
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let pem = read_pem(path)?;
    let certs = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ServerError::Tls(format!("bad certificate in {}: {e}", path.display())))?;
    if certs.is_empty() {
        return Err(ServerError::Tls(format!(
            "{} holds no certificates",
            path.display()
        )));
    }
    Ok(certs)
}

/// Accepts PKCS#8, RFC 5915 EC and legacy RSA keys in one pass over the
/// buffered PEM.
fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let pem = read_pem(path)?;
    rustls_pemfile::private_key(&mut pem.as_slice())
        .map_err(|e| ServerError::Tls(format!("bad key material in {}: {e}", path.display())))?
        .ok_or(ServerError::NoPrivateKey)
}
