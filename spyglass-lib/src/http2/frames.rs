//! HTTP/2 frame model (RFC 9113 §6) and wire parsing of the pieces the
//! fingerprint needs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::error::FrameError;

/// The client connection preface that announces HTTP/2.
pub const PREFACE: &[u8; 24] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

pub const FRAME_HEADER_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Data,
    Headers,
    Priority,
    RstStream,
    Settings,
    PushPromise,
    Ping,
    GoAway,
    WindowUpdate,
    Continuation,
    Unknown(u8),
}

impl FrameType {
    pub fn from_wire(t: u8) -> Self {
        match t {
            0x0 => Self::Data,
            0x1 => Self::Headers,
            0x2 => Self::Priority,
            0x3 => Self::RstStream,
            0x4 => Self::Settings,
            0x5 => Self::PushPromise,
            0x6 => Self::Ping,
            0x7 => Self::GoAway,
            0x8 => Self::WindowUpdate,
            0x9 => Self::Continuation,
            other => Self::Unknown(other),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Data => "DATA".to_string(),
            Self::Headers => "HEADERS".to_string(),
            Self::Priority => "PRIORITY".to_string(),
            Self::RstStream => "RST_STREAM".to_string(),
            Self::Settings => "SETTINGS".to_string(),
            Self::PushPromise => "PUSH_PROMISE".to_string(),
            Self::Ping => "PING".to_string(),
            Self::GoAway => "GOAWAY".to_string(),
            Self::WindowUpdate => "WINDOW_UPDATE".to_string(),
            Self::Continuation => "CONTINUATION".to_string(),
            Self::Unknown(t) => format!("UNKNOWN_FRAME_{t}"),
        }
    }

    /// The canonical flag set for this frame type, in the fixed enumeration
    /// order used by the flag list of every observed frame.
    fn flag_table(&self) -> &'static [(u8, &'static str)] {
        match self {
            Self::Data => &[(0x1, "EndStream (0x1)"), (0x8, "Padded (0x8)")],
            Self::Headers => &[
                (0x1, "EndStream (0x1)"),
                (0x4, "EndHeaders (0x4)"),
                (0x8, "Padded (0x8)"),
                (0x20, "Priority (0x20)"),
            ],
            Self::Settings | Self::Ping => &[(0x1, "Ack (0x1)")],
            Self::Continuation => &[(0x4, "EndHeaders (0x4)")],
            Self::PushPromise => &[(0x4, "EndHeaders (0x4)"), (0x8, "Padded (0x8)")],
            _ => &[],
        }
    }

    pub fn flag_names(&self, flags: u8) -> Vec<String> {
        self.flag_table()
            .iter()
            .filter(|(bit, _)| flags & bit != 0)
            .map(|(_, name)| (*name).to_string())
            .collect()
    }
}

/// The fixed 9-byte frame header.
#[derive(Debug, Clone, Copy)]
pub struct FrameHeader {
    pub length: u32,
    pub frame_type: FrameType,
    pub flags: u8,
    pub stream_id: u32,
}

impl FrameHeader {
    pub fn parse(bytes: &[u8; FRAME_HEADER_LEN]) -> Self {
        FrameHeader {
            length: u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
            frame_type: FrameType::from_wire(bytes[3]),
            flags: bytes[4],
            stream_id: u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) & 0x7fff_ffff,
        }
    }

    pub fn encode(&self) -> [u8; FRAME_HEADER_LEN] {
        let len = self.length.to_be_bytes();
        let stream = (self.stream_id & 0x7fff_ffff).to_be_bytes();
        let type_byte = match self.frame_type {
            FrameType::Data => 0x0,
            FrameType::Headers => 0x1,
            FrameType::Priority => 0x2,
            FrameType::RstStream => 0x3,
            FrameType::Settings => 0x4,
            FrameType::PushPromise => 0x5,
            FrameType::Ping => 0x6,
            FrameType::GoAway => 0x7,
            FrameType::WindowUpdate => 0x8,
            FrameType::Continuation => 0x9,
            FrameType::Unknown(t) => t,
        };
        [
            len[1], len[2], len[3], type_byte, self.flags, stream[0], stream[1], stream[2],
            stream[3],
        ]
    }
}

/// A single SETTINGS parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub id: u16,
    pub value: u32,
}

impl Setting {
    /// Canonical names for ids 1-6 plus the RFC 9218 no-priorities setting.
    pub fn name(&self) -> String {
        match self.id {
            1 => "HEADER_TABLE_SIZE".to_string(),
            2 => "ENABLE_PUSH".to_string(),
            3 => "MAX_CONCURRENT_STREAMS".to_string(),
            4 => "INITIAL_WINDOW_SIZE".to_string(),
            5 => "MAX_FRAME_SIZE".to_string(),
            6 => "MAX_HEADER_LIST_SIZE".to_string(),
            9 => "NO_RFC7540_PRIORITIES".to_string(),
            other => format!("UNKNOWN_SETTING_{other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Priority {
    /// Wire weight plus one, per RFC 9113 §6.3.
    pub weight: u16,
    pub depends_on: u32,
    pub exclusive: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GoAway {
    pub last_stream_id: u32,
    pub error_code: u32,
    pub debug_data: String,
}

/// One observed frame, frozen into the response.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ParsedFrame {
    pub frame_type: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub stream_id: u32,
    pub length: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_settings"
    )]
    pub settings: Vec<Setting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goaway: Option<GoAway>,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

/// Settings render as `NAME = value` strings on the wire contract.
fn serialize_settings<S: Serializer>(settings: &[Setting], s: S) -> Result<S::Ok, S::Error> {
    let mut seq = s.serialize_seq(Some(settings.len()))?;
    for setting in settings {
        seq.serialize_element(&format!("{} = {}", setting.name(), setting.value))?;
    }
    seq.end()
}

impl ParsedFrame {
    pub(crate) fn from_header(header: &FrameHeader) -> Self {
        ParsedFrame {
            frame_type: header.frame_type.name(),
            stream_id: header.stream_id,
            length: header.length,
            flags: header.frame_type.flag_names(header.flags),
            ..ParsedFrame::default()
        }
    }

    /// Whether this frame ends the observation phase: the first entry of its
    /// flag list is `EndStream (0x1)`.
    pub fn ends_stream(&self) -> bool {
        self.flags.first().map(String::as_str) == Some("EndStream (0x1)")
    }
}

/// Decode the SETTINGS payload: a sequence of {u16 id, u32 value}.
pub fn parse_settings(payload: &[u8]) -> Result<Vec<Setting>, FrameError> {
    if payload.len() % 6 != 0 {
        return Err(FrameError::Malformed {
            frame: "SETTINGS",
            reason: "payload length not a multiple of 6",
        });
    }
    Ok(payload
        .chunks_exact(6)
        .map(|c| Setting {
            id: u16::from_be_bytes([c[0], c[1]]),
            value: u32::from_be_bytes([c[2], c[3], c[4], c[5]]),
        })
        .collect())
}

/// Decode the 5-byte priority block shared by PRIORITY frames and the
/// priority section of HEADERS frames.
pub fn parse_priority(payload: &[u8]) -> Result<Priority, FrameError> {
    if payload.len() < 5 {
        return Err(FrameError::Malformed {
            frame: "PRIORITY",
            reason: "payload shorter than 5 bytes",
        });
    }
    let dep = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
    Ok(Priority {
        weight: u16::from(payload[4]) + 1,
        depends_on: dep & 0x7fff_ffff,
        exclusive: u8::from(dep & 0x8000_0000 != 0),
    })
}

pub fn parse_window_update(payload: &[u8]) -> Result<u32, FrameError> {
    if payload.len() < 4 {
        return Err(FrameError::Malformed {
            frame: "WINDOW_UPDATE",
            reason: "payload shorter than 4 bytes",
        });
    }
    Ok(u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) & 0x7fff_ffff)
}

pub fn parse_goaway(payload: &[u8]) -> Result<GoAway, FrameError> {
    if payload.len() < 8 {
        return Err(FrameError::Malformed {
            frame: "GOAWAY",
            reason: "payload shorter than 8 bytes",
        });
    }
    Ok(GoAway {
        last_stream_id: u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]])
            & 0x7fff_ffff,
        error_code: u32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]]),
        debug_data: BASE64.encode(&payload[8..]),
    })
}

/// Strip the pad-length prefix and trailing padding from a padded frame.
pub fn strip_padding<'a>(payload: &'a [u8], frame: &'static str) -> Result<&'a [u8], FrameError> {
    let Some((pad_len, rest)) = payload.split_first() else {
        return Err(FrameError::Malformed {
            frame,
            reason: "padded frame with empty payload",
        });
    };
    let pad_len = *pad_len as usize;
    if pad_len > rest.len() {
        return Err(FrameError::Malformed {
            frame,
            reason: "padding longer than payload",
        });
    }
    Ok(&rest[..rest.len() - pad_len])
}
