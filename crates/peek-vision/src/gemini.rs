use std::time::{Duration, Instant};

use async_trait::async_trait;
use peek_config::vision::VisionConfig;

use crate::wire::{GenerateRequest, parse_response};
use crate::{ProviderMetadata, VisionClient, VisionError};

/// Gemini `generateContent` client: one POST per screenshot, no retries
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    prompt: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(config: &VisionConfig) -> Result<Self, reqwest::Error> {
        Self::with_builder(config, reqwest::Client::builder())
    }

    /// Like `new`, on top of a caller-prepared builder (proxy, TLS)
    pub fn with_builder(
        config: &VisionConfig,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self, reqwest::Error> {
        let client = builder
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl VisionClient for GeminiClient {
    async fn analyze(&self, png: &[u8]) -> Result<String, VisionError> {
        let request = GenerateRequest::screenshot(
            &self.prompt,
            png,
            self.max_output_tokens,
            self.temperature,
        );

        tracing::info!("Sending {} byte screenshot to {}", png.len(), self.model);
        let start = Instant::now();

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.header("x-goog-api-key", &self.api_key);
        }

        let response = builder.send().await.inspect_err(|e| {
            tracing::error!("Vision request failed after {:?}: {}", start.elapsed(), e);
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Vision API returned {}: {}", status, body);
            return Err(VisionError::from_status(status.as_u16(), &body));
        }

        tracing::info!("Vision response received in {:?}", start.elapsed());

        parse_response(&body).inspect_err(|e| {
            tracing::warn!("Unusable vision response ({}): {}", e, body);
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "gemini".to_string(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;

    /// Serve one canned HTTP response, handing back the request body
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (body_tx, body_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let _ = body_tx.send(request);

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{addr}/v1beta/models/test:generateContent"), body_rx)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);

                if data.len() >= header_end + 4 + content_length {
                    return text[header_end + 4..].to_string();
                }
            }
        }

        String::from_utf8_lossy(&data).into_owned()
    }

    fn client_for(endpoint: String) -> GeminiClient {
        client_with_timeout(endpoint, 5)
    }

    /// Proxy settings from the environment must not hijack loopback requests
    fn client_with_timeout(endpoint: String, timeout_seconds: u64) -> GeminiClient {
        let config = VisionConfig {
            endpoint,
            api_key: "test-key".to_string(),
            timeout_seconds,
            ..VisionConfig::default()
        };
        GeminiClient::with_builder(&config, reqwest::Client::builder().no_proxy()).unwrap()
    }

    #[tokio::test]
    async fn success_returns_answer_text() {
        let (url, request_rx) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#,
        )
        .await;

        let answer = client_for(url).analyze(b"\x89PNG").await.unwrap();
        assert_eq!(answer, "Hello");

        let request: serde_json::Value = serde_json::from_str(&request_rx.await.unwrap()).unwrap();
        let parts = &request["contents"][0]["parts"];
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], "iVBORw==");
        assert_eq!(request["generationConfig"]["maxOutputTokens"], 800);
    }

    #[tokio::test]
    async fn http_429_maps_to_rate_limited() {
        let (url, _) = serve_once("429 Too Many Requests", r#"{"error":{"code":429}}"#).await;

        let err = client_for(url).analyze(b"png").await.unwrap_err();
        assert!(matches!(err, VisionError::RateLimited), "got {err:?}");
    }

    #[tokio::test]
    async fn http_403_maps_to_forbidden() {
        let (url, _) = serve_once("403 Forbidden", "{}").await;

        let err = client_for(url).analyze(b"png").await.unwrap_err();
        assert!(matches!(err, VisionError::Forbidden), "got {err:?}");
    }

    #[tokio::test]
    async fn http_400_carries_details() {
        let (url, _) = serve_once("400 Bad Request", r#"{"error":"API key not valid"}"#).await;

        match client_for(url).analyze(b"png").await {
            Err(VisionError::BadRequest { details }) => assert!(details.contains("API key not valid")),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_parse_error() {
        let (url, _) = serve_once("200 OK", "not json").await;

        let err = client_for(url).analyze(b"png").await.unwrap_err();
        assert!(matches!(err, VisionError::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        // The configured timeout_seconds is the only deadline on the request
        let client = client_with_timeout(format!("http://{addr}/"), 1);

        let start = Instant::now();
        let err = client.analyze(b"png").await.unwrap_err();
        assert!(matches!(err, VisionError::Timeout), "got {err:?}");
        assert!(start.elapsed() >= Duration::from_millis(900), "{:?}", start.elapsed());
        assert!(start.elapsed() < Duration::from_secs(5), "{:?}", start.elapsed());
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(format!("http://{addr}/")).analyze(b"png").await.unwrap_err();
        assert!(matches!(err, VisionError::Network(_)), "got {err:?}");
    }
}
