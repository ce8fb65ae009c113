//! One-shot loopback HTTP server for exercising the service clients.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the server does with the single connection it accepts.
pub(crate) enum Reply {
    /// Answer with this status line and body.
    Respond { status: &'static str, body: &'static str },
    /// Read the request, then close without answering.
    Hangup,
    /// Read the request, then hold the connection open without answering.
    Stall,
}

/// Bind `127.0.0.1:0`, serve one connection, and return the base URL.
pub(crate) async fn serve_once(reply: Reply) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        read_request(&mut stream).await;

        match reply {
            Reply::Respond { status, body } => {
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
            Reply::Hangup => drop(stream),
            Reply::Stall => {
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                drop(stream);
            }
        }
    });

    format!("http://{addr}")
}

/// Consume headers and a `Content-Length` body so the client sees a clean
/// exchange instead of a reset.
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = find(&buf, b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if buf.len() >= header_end + 4 + body_len {
            return;
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
