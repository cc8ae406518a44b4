//! API client for the station endpoint.

use reqwest::{header, Client};
use tracing::debug;

use crate::cache::StationSource;
use crate::config::CacheConfig;
use crate::models::StationRecord;

use super::ApiError;

/// Station API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct StationApiClient {
    client: Client,
    url: String,
}

impl StationApiClient {
    /// Create a client for the configured endpoint, with the configured
    /// request timeout applied to every call.
    pub fn new(config: &CacheConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            url: config.api_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Fetch the full station list.
    pub async fn fetch(&self) -> Result<Vec<StationRecord>, ApiError> {
        let response = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        let stations: Vec<StationRecord> = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Invalid JSON response: {}", e)))?;

        debug!(url = %self.url, count = stations.len(), "Stations fetched");
        Ok(stations)
    }
}

impl StationSource for StationApiClient {
    async fn fetch_stations(&self) -> Result<Vec<StationRecord>, ApiError> {
        self.fetch().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a local port and return the URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}/api/stations", addr)
    }

    /// Client that ignores any proxy set in the test environment.
    fn client_for(url: String, timeout: Duration) -> StationApiClient {
        let client = Client::builder().no_proxy().timeout(timeout).build().unwrap();
        StationApiClient { client, url }
    }

    #[test]
    fn test_new_uses_configured_url() {
        let config = CacheConfig {
            api_url: "http://localhost:9/api/stations".to_string(),
            ..CacheConfig::default()
        };
        let client = StationApiClient::new(&config).unwrap();
        assert_eq!(client.url(), "http://localhost:9/api/stations");
    }

    #[tokio::test]
    async fn test_fetch_parses_station_array() {
        let url = serve_once(
            "200 OK",
            r#"[{"Station":"Galp","Address":"Rua 1","Latitude":38.7,"Longitude":-9.1,"Municipality":"Lisboa"}]"#,
        )
        .await;
        let client = client_for(url, Duration::from_secs(5));

        let stations = client.fetch().await.unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].station.as_deref(), Some("Galp"));
        assert_eq!(stations[0].coordinates(), Some((38.7, -9.1)));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let url = serve_once("503 Service Unavailable", "maintenance").await;
        let client = client_for(url, Duration::from_secs(5));

        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(ref body) if body == "maintenance"));
    }

    #[tokio::test]
    async fn test_fetch_invalid_json() {
        let url = serve_once("200 OK", "<html>oops</html>").await;
        let client = client_for(url, Duration::from_secs(5));

        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert!(err.to_string().contains("Invalid JSON response"));
    }

    #[tokio::test]
    async fn test_fetch_object_instead_of_array() {
        let url = serve_once("200 OK", r#"{"stations": []}"#).await;
        let client = client_for(url, Duration::from_secs(5));

        assert!(matches!(
            client.fetch().await.unwrap_err(),
            ApiError::InvalidResponse(_)
        ));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(format!("http://{}/api/stations", addr), Duration::from_secs(5));

        assert!(matches!(
            client.fetch().await.unwrap_err(),
            ApiError::NetworkError(_)
        ));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and never answer.
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        let client = client_for(
            format!("http://{}/api/stations", addr),
            Duration::from_millis(200),
        );

        match client.fetch().await.unwrap_err() {
            ApiError::NetworkError(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
