use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use ipnet::IpNet;
use serde::Deserialize;

use crate::error::{Result, ServerError};

/// Main configuration structure, loaded from TOML.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Address and port of the TLS listener.
    pub listen: SocketAddr,
    /// TLS certificate material.
    pub tls: TlsConfig,
    /// Optional plain-HTTP listener that redirects to the TLS endpoint.
    #[serde(default)]
    pub redirect: Option<RedirectConfig>,
    /// Local development mode: keeps connections alive through the
    /// self-signed-certificate rejection browsers produce against
    /// localhost.
    #[serde(default)]
    pub local: bool,
    /// Text exposed in the `donate` response field.
    #[serde(default = "default_donate")]
    pub donate: String,
    /// Peers in these networks are dropped at accept time.
    #[serde(default)]
    pub blocked_networks: Vec<IpNet>,
    /// Optional JSON-lines sink for observed fingerprints.
    #[serde(default)]
    pub sink: Option<SinkConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TlsConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedirectConfig {
    pub listen: SocketAddr,
    /// Absolute URL clients are redirected to.
    pub target: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SinkConfig {
    pub path: PathBuf,
}

fn default_donate() -> String {
    "Please consider sponsoring the project if this API is useful to you.".to_string()
}

impl Config {
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        self.blocked_networks.iter().any(|net| net.contains(&ip))
    }
}

/// Read and deserialise the TOML config, checking that the TLS material it
/// points at actually exists before the server tries to use it.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| ServerError::Config(format!("invalid TOML in {}: {e}", path.display())))?;

    for (label, file) in [
        ("certificate", &cfg.tls.cert_file),
        ("private key", &cfg.tls.key_file),
    ] {
        if !file.exists() {
            return Err(ServerError::Config(format!(
                "{label} file {} does not exist",
                file.display()
            )));
        }
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_tmp(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    #[test]
    fn loads_minimal_config() {
        let dir = tempfile::tempdir().unwrap();
        let cert = write_tmp(&dir, "cert.pem", b"x");
        let key = write_tmp(&dir, "key.pem", b"x");
        let toml = format!(
            "listen = \"127.0.0.1:8443\"\n[tls]\ncert_file = {:?}\nkey_file = {:?}\n",
            cert, key
        );
        let config_path = write_tmp(&dir, "config.toml", toml.as_bytes());

        let cfg = load_from_path(&config_path).unwrap();
        assert_eq!(cfg.listen.port(), 8443);
        assert!(!cfg.local);
        assert!(cfg.blocked_networks.is_empty());
    }

    #[test]
    fn missing_cert_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let key = write_tmp(&dir, "key.pem", b"x");
        let toml = format!(
            "listen = \"127.0.0.1:8443\"\n[tls]\ncert_file = \"/nonexistent.pem\"\nkey_file = {:?}\n",
            key
        );
        let config_path = write_tmp(&dir, "config.toml", toml.as_bytes());
        assert!(load_from_path(&config_path).is_err());
    }

    #[test]
    fn blocklist_matches_networks() {
        let dir = tempfile::tempdir().unwrap();
        let cert = write_tmp(&dir, "cert.pem", b"x");
        let key = write_tmp(&dir, "key.pem", b"x");
        let toml = format!(
            "listen = \"127.0.0.1:8443\"\nblocked_networks = [\"10.0.0.0/8\"]\n[tls]\ncert_file = {:?}\nkey_file = {:?}\n",
            cert, key
        );
        let config_path = write_tmp(&dir, "config.toml", toml.as_bytes());

        let cfg = load_from_path(&config_path).unwrap();
        assert!(cfg.is_blocked("10.1.2.3".parse().unwrap()));
        assert!(!cfg.is_blocked("192.168.1.1".parse().unwrap()));
    }
}
