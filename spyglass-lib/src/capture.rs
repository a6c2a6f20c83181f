//! TCP/IP capture sidecar surface.
//!
//! An optional capture task (NIC sniffer, eBPF probe, ...) records the
//! SYN/ACK metadata of incoming connections into a concurrent map keyed by
//! `src_ip:src_port`. The router reads a snapshot for the current client at
//! response time; when no capture task runs the section simply stays empty.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::RwLock;

use ahash::RandomState;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct IpDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hdr_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tos: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct TcpDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mss: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct TcpIpDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_port: Option<u16>,
    pub ip: IpDetails,
    pub tcp: TcpDetails,
}

/// Concurrent `src_ip:src_port → TcpIpDetails` map. Writes come from a
/// single capture task; reads are per-connection snapshots.
#[derive(Debug, Default)]
pub struct CaptureMap {
    inner: RwLock<HashMap<String, TcpIpDetails, RandomState>>,
}

impl CaptureMap {
    pub fn insert(&self, peer: SocketAddr, details: TcpIpDetails) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key(peer), details);
        }
    }

    pub fn snapshot(&self, peer: SocketAddr) -> Option<TcpIpDetails> {
        self.inner.read().ok()?.get(&key(peer)).cloned()
    }

    pub fn remove(&self, peer: SocketAddr) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(&key(peer));
        }
    }
}

fn key(peer: SocketAddr) -> String {
    format!("{}:{}", peer.ip(), peer.port())
}
