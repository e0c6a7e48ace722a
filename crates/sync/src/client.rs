//! HTTP client for the habit backend

use async_trait::async_trait;
use habit_core::{DateKey, SaveRequest, DATE_PARAM};
use std::time::Duration;
use tracing::{debug, warn};

use crate::insights::{parse_insights, Insights, InsightsCache};
use crate::response::parse_load_response;
use crate::{FetchOutcome, RemoteSync, SyncError};

/// Upper bound on any single backend request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Marker left in template configs until a real deployment URL is pasted
const PLACEHOLDER_MARKER: &str = "PASTE_";

/// Talks to the backend over plain HTTP
///
/// Saves are `POST`ed as URL-encoded forms; loads and insights are `GET`
/// requests selected by an `action` query parameter.
pub struct HttpSyncClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    insights: InsightsCache,
}

impl HttpSyncClient {
    /// Create a client for `endpoint`
    ///
    /// An unconfigured endpoint is accepted here; every request then fails
    /// with [`SyncError::NotConfigured`] without touching the network.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;

        Ok(Self::with_client(client, endpoint, timeout))
    }

    /// Create a client around a preconfigured `reqwest::Client`
    ///
    /// `timeout` must match the deadline set on `client`; it is only used
    /// to report [`SyncError::Timeout`].
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim().to_string(),
            timeout,
            insights: InsightsCache::default(),
        }
    }

    /// Whether a usable backend URL is set
    pub fn is_configured(&self) -> bool {
        is_configured_url(&self.endpoint)
    }

    /// The configured backend URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn checked_endpoint(&self) -> Result<&str, SyncError> {
        if self.is_configured() {
            Ok(&self.endpoint)
        } else {
            Err(SyncError::NotConfigured)
        }
    }

    fn map_error(&self, err: reqwest::Error) -> SyncError {
        if err.is_timeout() {
            SyncError::Timeout(self.timeout)
        } else if err.is_decode() {
            SyncError::Malformed(err.to_string())
        } else {
            SyncError::Network(err.to_string())
        }
    }

    async fn get_action(&self, query: &[(&str, &str)]) -> Result<String, SyncError> {
        let endpoint = self.checked_endpoint()?;
        let response = self
            .client
            .get(endpoint)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| self.map_error(e))
    }

    /// Habit insights, served from cache while fresh
    pub async fn insights(&self) -> Result<Option<Insights>, SyncError> {
        if let Some(cached) = self.insights.get() {
            debug!("Insights served from cache");
            return Ok(Some(cached));
        }

        let body = self.get_action(&[("action", "getInsights")]).await?;
        let insights = parse_insights(&body)?;
        if let Some(ref fresh) = insights {
            self.insights.put(fresh.clone());
        }
        Ok(insights)
    }
}

#[async_trait]
impl RemoteSync for HttpSyncClient {
    async fn send(&self, request: &SaveRequest) -> Result<(), SyncError> {
        let endpoint = self.checked_endpoint()?;
        let pairs = request.form_pairs();

        debug!(
            "Sending {:?} save for {} ({} fields)",
            request.kind,
            request.date,
            request.payload.len()
        );

        let response = self
            .client
            .post(endpoint)
            .form(&pairs)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            warn!("Backend rejected save for {}: HTTP {}", request.date, status);
            return Err(SyncError::Status(status.as_u16()));
        }

        // New saves change completion stats.
        self.insights.invalidate();
        Ok(())
    }

    async fn fetch(&self, date: DateKey) -> Result<FetchOutcome, SyncError> {
        let key = date.wire_key();
        let body = self
            .get_action(&[("action", "getToday"), (DATE_PARAM, key.as_str())])
            .await?;
        parse_load_response(&body)
    }
}

/// A URL is usable when it is non-empty and not the template placeholder
pub fn is_configured_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && !url.contains(PLACEHOLDER_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_core::SaveKind;
    use std::collections::BTreeMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, answer with `response`, return the raw request
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/exec", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (url, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    fn local_client(url: impl Into<String>, timeout: Duration) -> HttpSyncClient {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap();
        HttpSyncClient::with_client(client, url, timeout)
    }

    fn save_request() -> SaveRequest {
        SaveRequest {
            date: DateKey::from_ymd(2026, 10, 19).unwrap(),
            kind: SaveKind::Habits,
            payload: BTreeMap::from([("meditate".to_string(), "1".to_string())]),
        }
    }

    #[test]
    fn test_placeholder_url_is_unconfigured() {
        assert!(!is_configured_url(""));
        assert!(!is_configured_url("   "));
        assert!(!is_configured_url("https://script.google.com/macros/s/PASTE_DEPLOYMENT_ID/exec"));
        assert!(is_configured_url("https://script.google.com/macros/s/abc/exec"));
    }

    #[tokio::test]
    async fn test_unconfigured_client_never_sends() {
        let client = HttpSyncClient::new("", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.send(&save_request()).await, Err(SyncError::NotConfigured));
        assert_eq!(
            client.fetch(DateKey::today()).await,
            Err(SyncError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_send_posts_form_with_date_key() {
        let (url, server) = serve_once(http_response("200 OK", "")).await;
        let client = local_client(url, DEFAULT_TIMEOUT);

        client.send(&save_request()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /exec"));
        assert!(request.contains("application/x-www-form-urlencoded"));
        assert!(request.contains("meditate=1"));
        assert!(request.contains("clientDateKey=10%2F19"));
    }

    #[tokio::test]
    async fn test_send_error_status_is_failure() {
        let (url, _server) = serve_once(http_response("500 Internal Server Error", "")).await;
        let client = local_client(url, DEFAULT_TIMEOUT);

        assert_eq!(client.send(&save_request()).await, Err(SyncError::Status(500)));
    }

    #[tokio::test]
    async fn test_fetch_found() {
        let body = r#"{"ok":true,"exists":true,"values":{"wakeUpAt8":"1","notes":"slept well"}}"#;
        let (url, server) = serve_once(http_response("200 OK", body)).await;
        let client = local_client(url, DEFAULT_TIMEOUT);

        let outcome = client
            .fetch(DateKey::from_ymd(2026, 3, 7).unwrap())
            .await
            .unwrap();

        let FetchOutcome::Found(snapshot) = outcome else {
            panic!("expected saved values");
        };
        assert_eq!(snapshot.values["notes"], "slept well");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /exec?action=getToday&clientDateKey=3%2F7"));
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_not_an_error() {
        let (url, _server) =
            serve_once(http_response("200 OK", r#"{"ok":true,"exists":false}"#)).await;
        let client = local_client(url, DEFAULT_TIMEOUT);

        assert_eq!(
            client.fetch(DateKey::today()).await,
            Ok(FetchOutcome::NotFound)
        );
    }

    #[tokio::test]
    async fn test_timeout_is_normalized() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/exec", listener.local_addr().unwrap());

        // Accept and hold the connection without answering.
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let timeout = Duration::from_millis(200);
        let client = local_client(url, timeout);
        assert_eq!(
            client.fetch(DateKey::today()).await,
            Err(SyncError::Timeout(timeout))
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/exec", listener.local_addr().unwrap());
        drop(listener);

        let client = local_client(url, DEFAULT_TIMEOUT);
        assert!(matches!(
            client.send(&save_request()).await,
            Err(SyncError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_insights_are_cached() {
        let body = r#"{"ok":true,"habits":[{"label":"Meditate","completionDisplay":"80%","currentStreak":3}]}"#;
        let (url, server) = serve_once(http_response("200 OK", body)).await;
        let client = local_client(url, DEFAULT_TIMEOUT);

        let first = client.insights().await.unwrap().unwrap();
        server.await.unwrap();

        // The one-shot server is gone; a second network call would fail.
        let second = client.insights().await.unwrap().unwrap();
        assert_eq!(first, second);
    }
}
