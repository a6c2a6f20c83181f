pub mod frames;
pub mod observer;
pub mod responder;

pub use frames::{FrameType, GoAway, ParsedFrame, Priority, Setting, PREFACE};
pub use observer::{observe, SERVER_SETTINGS};

#[cfg(test)]
pub(crate) mod testdata {
    //! Frame encoders and a scripted stream for observer tests.

    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

    use crate::http2::frames::{FrameHeader, FrameType, FRAME_HEADER_LEN};

    /// Reads from a fixed buffer, discards writes, then EOF.
    pub struct MockStream {
        data: Vec<u8>,
        pos: usize,
    }

    impl MockStream {
        pub fn new(data: Vec<u8>) -> Self {
            Self { data, pos: 0 }
        }
    }

    impl AsyncRead for MockStream {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let remaining = self.data.len().saturating_sub(self.pos);
            if remaining == 0 {
                return Poll::Ready(Ok(()));
            }
            let to_read = remaining.min(buf.remaining());
            let end = self.pos + to_read;
            buf.put_slice(&self.data[self.pos..end]);
            self.pos = end;
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            data: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Ok(data.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    pub fn encode_frame(frame_type: FrameType, flags: u8, stream_id: u32, payload: &[u8]) -> Vec<u8> {
        let header = FrameHeader {
            length: payload.len() as u32,
            frame_type,
            flags,
            stream_id,
        };
        let mut out = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
        out.extend_from_slice(&header.encode());
        out.extend_from_slice(payload);
        out
    }

    pub fn encode_settings_frame(settings: &[(u16, u32)]) -> Vec<u8> {
        let mut payload = Vec::with_capacity(settings.len() * 6);
        for (id, value) in settings {
            payload.extend_from_slice(&id.to_be_bytes());
            payload.extend_from_slice(&value.to_be_bytes());
        }
        encode_frame(FrameType::Settings, 0, 0, &payload)
    }

    pub fn encode_window_update_frame(increment: u32) -> Vec<u8> {
        encode_frame(FrameType::WindowUpdate, 0, 0, &increment.to_be_bytes())
    }

    pub fn encode_priority_frame(
        stream_id: u32,
        depends_on: u32,
        exclusive: bool,
        weight: u8,
    ) -> Vec<u8> {
        let mut payload = Vec::with_capacity(5);
        let dep = depends_on | if exclusive { 0x8000_0000 } else { 0 };
        payload.extend_from_slice(&dep.to_be_bytes());
        payload.push(weight);
        encode_frame(FrameType::Priority, 0, stream_id, &payload)
    }

    pub fn encode_headers_frame(
        stream_id: u32,
        headers: &[(&str, &str)],
        end_stream: bool,
    ) -> Vec<u8> {
        let mut encoder = hpack::Encoder::new();
        let block = encoder.encode(
            headers
                .iter()
                .map(|(name, value)| (name.as_bytes(), value.as_bytes())),
        );
        let flags = 0x4 | if end_stream { 0x1 } else { 0 };
        encode_frame(FrameType::Headers, flags, stream_id, &block)
    }
}
