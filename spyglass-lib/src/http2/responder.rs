//! Writes the HTTP/2 response: one HEADERS frame, the body in 1024-byte DATA
//! chunks, an empty end-of-stream DATA frame, then GOAWAY.

use hpack::Encoder;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http2::frames::{FrameHeader, FrameType};

const FLAG_END_STREAM: u8 = 0x1;
const FLAG_END_HEADERS: u8 = 0x4;
const DATA_CHUNK: usize = 1024;

pub async fn respond<S>(
    stream: &mut S,
    stream_id: u32,
    body: &[u8],
    content_type: &str,
    cors: bool,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let content_length = body.len().to_string();
    let mut headers: Vec<(&[u8], &[u8])> = vec![
        (b":status", b"200"),
        (b"server", b"spyglass"),
        (b"content-length", content_length.as_bytes()),
        (b"content-type", content_type.as_bytes()),
    ];
    if cors {
        headers.push((b"access-control-allow-origin", b"*"));
        headers.push((b"access-control-allow-methods", b"*"));
        headers.push((b"access-control-allow-headers", b"*"));
    }

    let mut encoder = Encoder::new();
    let block = encoder.encode(headers);
    write_frame(stream, FrameType::Headers, FLAG_END_HEADERS, stream_id, &block).await?;

    for chunk in body.chunks(DATA_CHUNK) {
        write_frame(stream, FrameType::Data, 0, stream_id, chunk).await?;
    }
    write_frame(stream, FrameType::Data, FLAG_END_STREAM, stream_id, &[]).await?;

    // GOAWAY with NO_ERROR: we only ever serve the first request.
    let mut goaway = Vec::with_capacity(8);
    goaway.extend_from_slice(&stream_id.to_be_bytes());
    goaway.extend_from_slice(&0u32.to_be_bytes());
    write_frame(stream, FrameType::GoAway, 0, 0, &goaway).await?;
    stream.flush().await
}

async fn write_frame<S>(
    stream: &mut S,
    frame_type: FrameType,
    flags: u8,
    stream_id: u32,
    payload: &[u8],
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let header = FrameHeader {
        length: payload.len() as u32,
        frame_type,
        flags,
        stream_id,
    };
    stream.write_all(&header.encode()).await?;
    stream.write_all(payload).await
}
