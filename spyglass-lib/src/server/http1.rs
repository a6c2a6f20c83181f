//! HTTP/1 fallback: request-line and header capture, plus the plaintext
//! response writer.

use tokio::io::{AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Http1Request {
    pub method: String,
    pub path: String,
    pub version: String,
    pub headers: Vec<String>,
    pub user_agent: Option<String>,
}

/// Parse whatever the client sent as an HTTP/1 request. Never fails: a
/// garbled request-line degrades to `--` placeholders, matching the legacy
/// behaviour consumers expect.
pub fn parse_request(raw: &[u8]) -> Http1Request {
    let text = String::from_utf8_lossy(raw);
    let mut lines = text.split("\r\n");

    let request_line: Vec<&str> = lines.next().unwrap_or_default().split(' ').collect();
    let (method, path, version) = if request_line.len() == 3 {
        (
            request_line[0].to_string(),
            request_line[1].to_string(),
            request_line[2].to_string(),
        )
    } else {
        ("--".to_string(), "--".to_string(), "--".to_string())
    };

    let mut headers = Vec::new();
    let mut user_agent = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        headers.push(line.to_string());
        if name.eq_ignore_ascii_case("user-agent") {
            user_agent = Some(value.trim().to_string());
        }
    }

    Http1Request {
        method,
        path,
        version,
        headers,
        user_agent,
    }
}

pub async fn respond<S>(
    stream: &mut S,
    body: &[u8],
    content_type: &str,
    cors: bool,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut head = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: {content_type}; charset=utf-8\r\nServer: spyglass\r\n",
        body.len()
    );
    if cors {
        head.push_str("Access-Control-Allow-Origin: *\r\n");
        head.push_str("Access-Control-Allow-Methods: *\r\n");
        head.push_str("Access-Control-Allow-Headers: *\r\n");
    }
    head.push_str("\r\n");

    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body).await?;
    stream.flush().await
}
