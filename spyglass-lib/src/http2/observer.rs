//! Reads the client's opening frames until a frame ends the stream.
//!
//! The caller has already consumed the 24-byte connection preface; this
//! module writes the server SETTINGS, then records every frame the peer
//! sends. The frozen frame list is the input to the Akamai fingerprint.

use hpack::Decoder;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::FrameError;
use crate::http2::frames::{
    parse_goaway, parse_priority, parse_settings, parse_window_update, strip_padding, FrameHeader,
    FrameType, ParsedFrame, Setting, FRAME_HEADER_LEN,
};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

const FLAG_PADDED: u8 = 0x8;
const FLAG_PRIORITY: u8 = 0x20;

/// Settings announced before reading: a large initial window and the same
/// concurrency limits Google's frontends advertise.
pub const SERVER_SETTINGS: [Setting; 3] = [
    Setting {
        id: 4,
        value: 1_048_576,
    },
    Setting { id: 3, value: 100 },
    Setting {
        id: 6,
        value: 65_536,
    },
];

/// Observe frames until one arrives whose flag list starts with
/// `EndStream (0x1)`.
pub async fn observe<S>(stream: &mut S) -> Result<Vec<ParsedFrame>, FrameError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    write_server_settings(stream).await?;

    // One decoder for the whole connection; HPACK is stateful.
    let mut decoder = Decoder::new();
    let mut frames = Vec::new();
    loop {
        let mut header_buf = [0u8; FRAME_HEADER_LEN];
        stream.read_exact(&mut header_buf).await?;
        let header = FrameHeader::parse(&header_buf);

        let mut payload = vec![0u8; header.length as usize];
        stream.read_exact(&mut payload).await?;

        let frame = parse_frame(&header, &payload, &mut decoder)?;
        let done = frame.ends_stream();
        frames.push(frame);
        if done {
            break;
        }
    }
    Ok(frames)
}

fn parse_frame(
    header: &FrameHeader,
    payload: &[u8],
    decoder: &mut Decoder<'_>,
) -> Result<ParsedFrame, FrameError> {
    let mut frame = ParsedFrame::from_header(header);
    match header.frame_type {
        FrameType::Settings => {
            frame.settings = parse_settings(payload)?;
        }
        FrameType::Headers => {
            let mut block = if header.flags & FLAG_PADDED != 0 {
                strip_padding(payload, "HEADERS")?
            } else {
                payload
            };
            if header.flags & FLAG_PRIORITY != 0 {
                frame.priority = Some(parse_priority(block)?);
                block = &block[5..];
            }
            frame.headers = decode_header_block(decoder, block)?;
        }
        FrameType::Data => {
            frame.payload = Some(BASE64.encode(payload));
        }
        FrameType::WindowUpdate => {
            frame.increment = Some(parse_window_update(payload)?);
        }
        FrameType::Priority => {
            frame.priority = Some(parse_priority(payload)?);
        }
        FrameType::GoAway => {
            frame.goaway = Some(parse_goaway(payload)?);
        }
        _ => {}
    }
    Ok(frame)
}

/// HPACK-decode a header block into `name: value` strings, preserving
/// receipt order. Decode failures close the connection.
fn decode_header_block(
    decoder: &mut Decoder<'_>,
    block: &[u8],
) -> Result<Vec<String>, FrameError> {
    let fields = decoder
        .decode(block)
        .map_err(|e| FrameError::Hpack(format!("{e:?}")))?;
    Ok(fields
        .into_iter()
        .map(|(name, value)| {
            format!(
                "{}: {}",
                String::from_utf8_lossy(&name),
                String::from_utf8_lossy(&value)
            )
        })
        .collect())
}

async fn write_server_settings<S>(stream: &mut S) -> Result<(), FrameError>
where
    S: AsyncWrite + Unpin,
{
    let mut payload = Vec::with_capacity(SERVER_SETTINGS.len() * 6);
    for setting in SERVER_SETTINGS {
        payload.extend_from_slice(&setting.id.to_be_bytes());
        payload.extend_from_slice(&setting.value.to_be_bytes());
    }
    let header = FrameHeader {
        length: payload.len() as u32,
        frame_type: FrameType::Settings,
        flags: 0,
        stream_id: 0,
    };
    stream.write_all(&header.encode()).await?;
    stream.write_all(&payload).await?;
    stream.flush().await?;
    Ok(())
}
