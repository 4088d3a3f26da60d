use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::CollectorConfig;

/// Anything that can answer an API path with a JSON payload, or nothing.
pub trait JsonSource {
    fn fetch(&self, path: &str) -> Option<Value>;
}

/// Sequential, rate-limited client for the NCAA API.
///
/// Every call sleeps `delay` after the attempt, whether it succeeded or not.
/// Failures are never retried; they come back as `None`.
pub struct ApiClient {
    client: Client,
    base_url: String,
    delay: Duration,
}

impl ApiClient {
    pub fn new(cfg: &CollectorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.request_timeout)
            .user_agent(cfg.user_agent.as_str())
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            delay: cfg.request_delay,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Single GET with no status check and no post-request delay.
    pub fn get_raw(&self, path: &str) -> Result<RawResponse> {
        let url = self.url_for(path);
        let resp = self.client.get(&url).send().context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        Ok(RawResponse { status, body })
    }

    fn try_fetch(&self, path: &str) -> Result<Value> {
        let raw = self.get_raw(path)?;
        if !raw.status.is_success() {
            return Err(anyhow!("http {}", raw.status));
        }
        serde_json::from_str::<Value>(raw.body.trim()).context("invalid json body")
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl JsonSource for ApiClient {
    fn fetch(&self, path: &str) -> Option<Value> {
        let result = self.try_fetch(path);
        thread::sleep(self.delay);
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(path, error = %format!("{err:#}"), "no payload");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Instant;

    use super::*;

    /// Serves `response` to a single connection and returns the base url.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut buf = [0u8; 4096];
            let mut seen = Vec::new();
            while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => seen.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        });
        format!("http://{addr}")
    }

    fn local_client(base_url: String) -> ApiClient {
        let mut cfg = CollectorConfig {
            base_url,
            request_timeout: Duration::from_secs(5),
            ..CollectorConfig::default()
        };
        cfg.set_delay_ms(0);
        ApiClient::new(&cfg).expect("client should build")
    }

    fn timed_fetch(client: &ApiClient, path: &str) -> (Option<Value>, Duration) {
        let started = Instant::now();
        let out = client.fetch(path);
        (out, started.elapsed())
    }

    #[test]
    fn server_error_yields_none_after_delay() {
        let client = local_client(serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 5\r\nConnection: close\r\n\r\noops!",
        ));
        let (out, elapsed) = timed_fetch(&client, "/schedule/x");
        assert!(out.is_none());
        assert!(elapsed >= client.delay());
    }

    #[test]
    fn non_json_body_yields_none_after_delay() {
        let client = local_client(serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\nConnection: close\r\n\r\n<html></html>",
        ));
        let (out, elapsed) = timed_fetch(&client, "/schedule/x");
        assert!(out.is_none());
        assert!(elapsed >= client.delay());
    }

    #[test]
    fn json_body_yields_payload_after_delay() {
        let client = local_client(serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 16\r\nConnection: close\r\n\r\n{\"gameDates\":[]}",
        ));
        let (out, elapsed) = timed_fetch(&client, "/schedule/x");
        let payload = out.expect("payload for 200 json");
        assert!(payload.get("gameDates").is_some_and(|v| v.is_array()));
        assert!(elapsed >= client.delay());
    }

    #[test]
    fn get_raw_exposes_status_and_body() {
        let client = local_client(serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        ));
        let raw = client.get_raw("/schedule/x").expect("response");
        assert_eq!(raw.status, StatusCode::NOT_FOUND);
        assert_eq!(raw.body, "not found");
    }

    #[test]
    fn url_for_joins_without_double_slash() {
        let cfg = CollectorConfig {
            base_url: "https://example.test/".to_string(),
            ..CollectorConfig::default()
        };
        let client = ApiClient::new(&cfg).expect("client should build");
        assert_eq!(
            client.url_for("/game/123/boxscore"),
            "https://example.test/game/123/boxscore"
        );
        assert_eq!(
            client.url_for("schedule/soccer-women/d1/2024/09"),
            "https://example.test/schedule/soccer-women/d1/2024/09"
        );
    }

    #[test]
    fn unreachable_host_yields_none() {
        let mut cfg = CollectorConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: Duration::from_secs(2),
            ..CollectorConfig::default()
        };
        cfg.set_delay_ms(0);
        let client = ApiClient::new(&cfg).expect("client should build");
        assert!(client.fetch("/schedule/x").is_none());
    }
}
