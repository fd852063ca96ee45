//! HTTP record source

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::RecordSource;
use super::records_from_json;
use crate::error::SourceError;
use crate::model::Record;

/// Records fetched from a JSON endpoint with a GET request.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use tablekit_lib::source::{HttpSource, RecordSource};
///
/// # async fn run() -> Result<(), tablekit_lib::error::SourceError> {
/// let source = HttpSource::new("https://api.example.com/payments")
///     .timeout(Duration::from_secs(10));
/// let records = source.fetch().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
    timeout: Option<Duration>,
    bearer_token: Option<String>,
}

impl HttpSource {
    /// Creates a source for `url` with a default HTTP client.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Creates a source that reuses an existing client.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            timeout: None,
            bearer_token: None,
        }
    }

    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sends `Authorization: Bearer <token>` with the request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        let mut request = self.client.get(&self.url);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(SourceError::status(response.status().as_u16(), &self.url));
        }

        let json: serde_json::Value = response.json().await?;
        records_from_json(json)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use super::*;

    /// Serves one canned HTTP response and returns the URL to hit.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{addr}/payments")
    }

    #[tokio::test]
    async fn test_fetch_records() {
        let url = serve_once("200 OK", r#"{"data": [{"id": 1, "amount": 250}]}"#).await;
        let records = HttpSource::new(&url).fetch().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("amount"), Some(&crate::model::Value::Long(250)));
    }

    #[tokio::test]
    async fn test_error_status() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        let err = HttpSource::new(&url).fetch().await.unwrap_err();

        assert_eq!(err.status_code(), Some(503));
        assert!(err.is_retryable());
    }
}
