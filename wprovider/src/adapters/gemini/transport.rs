//! Generative-language transport trait and reqwest-based SSE implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};

use crate::{ConnectionFuture, ProviderError};

use super::serde_api::{build_api_request, chunks_from_response, extract_error_message};
use super::{GeminiAuth, GeminiRequest, GeminiStreamChunk};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub type GeminiChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<GeminiStreamChunk, ProviderError>> + Send + 'a>>;

pub trait GenerativeTransport: Send + Sync + std::fmt::Debug {
    fn stream_generate<'a>(
        &'a self,
        request: GeminiRequest,
        auth: GeminiAuth,
    ) -> ConnectionFuture<'a, Result<GeminiChunkStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct GeminiHttpTransport {
    client: Client,
    base_url: String,
}

impl GeminiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    fn apply_auth(
        &self,
        builder: reqwest::RequestBuilder,
        auth: &GeminiAuth,
    ) -> reqwest::RequestBuilder {
        match auth {
            GeminiAuth::ApiKey(key) => builder.header("x-goog-api-key", key),
        }
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("generate request failed with status {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        }
    }
}

impl GenerativeTransport for GeminiHttpTransport {
    fn stream_generate<'a>(
        &'a self,
        request: GeminiRequest,
        auth: GeminiAuth,
    ) -> ConnectionFuture<'a, Result<GeminiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            let url = self.endpoint(&request.model);
            let api_request = build_api_request(request)?;
            let builder = self.client.post(url).json(&api_request);
            let response = self.apply_auth(builder, &auth).send().await.map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(err.to_string())
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let stream = try_stream! {
                let mut bytes_stream = response.bytes_stream();
                let mut sse_buffer = String::new();

                while let Some(item) = bytes_stream.next().await {
                    let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|err| ProviderError::transport(err.to_string()))?;
                    sse_buffer.push_str(text);

                    while let Some(newline_index) = sse_buffer.find('\n') {
                        let line = sse_buffer.drain(..=newline_index).collect::<String>();
                        let line = line.trim();

                        if !line.starts_with("data:") {
                            continue;
                        }

                        let payload = line.trim_start_matches("data:").trim();
                        if payload.is_empty() || payload == "[DONE]" {
                            continue;
                        }

                        let parsed: super::serde_api::GeminiApiStreamResponse =
                            serde_json::from_str(payload)
                                .map_err(|err| ProviderError::transport(err.to_string()))?;

                        for chunk in chunks_from_response(parsed) {
                            yield chunk;
                        }
                    }
                }
            };

            Ok(Box::pin(stream) as GeminiChunkStream<'a>)
        })
    }
}
