// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetcherConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_millis(config.navigation_timeout_ms))
        .build()?;
    Ok(client)
}

/// Fetch a page asynchronously and return its body.
///
/// Non-success status codes are reported as fetch errors.
pub async fn fetch_page_async(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::fetch(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::fetch(url, format!("HTTP status {status}")));
    }

    response.text().await.map_err(|e| AppError::fetch(url, e))
}

/// Minimal one-connection HTTP servers for tests.
#[cfg(test)]
pub(crate) mod test_server {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Serve `response` verbatim to the first request; returns the base URL.
    pub async fn respond_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });

        format!("http://{addr}")
    }

    /// Accept one connection and never answer it.
    pub async fn silent() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        format!("http://{addr}")
    }

    /// Read headers and any `content-length` body so closing the socket
    /// does not reset the connection.
    async fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + body_len {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> reqwest::Client {
        create_async_client(&FetcherConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_returns_body() {
        let base = test_server::respond_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 13\r\nconnection: close\r\n\r\n<p>board</p>\n",
        )
        .await;

        let body = fetch_page_async(&client(), &format!("{base}/board/21"))
            .await
            .unwrap();
        assert_eq!(body, "<p>board</p>\n");
    }

    #[tokio::test]
    async fn test_fetch_page_error_status_is_fetch_error() {
        let base = test_server::respond_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 4\r\nconnection: close\r\n\r\nboom",
        )
        .await;
        let url = format!("{base}/board/21");

        let err = fetch_page_async(&client(), &url).await.unwrap_err();
        match err {
            AppError::Fetch { url: failed, message } => {
                assert_eq!(failed, url);
                assert!(message.contains("500"), "unexpected message: {message}");
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }
}
