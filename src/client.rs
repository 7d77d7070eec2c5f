use crate::config::{ApiKey, Settings};
use crate::models::{
    ApiErrorBody, Error, GenerateContentRequest, GenerateContentResponse, GenerateError, Result,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Something that turns a prompt into model text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, model: &str)
        -> std::result::Result<String, GenerateError>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl GeminiClient {
    /// Builds the HTTP client with the key baked into its default headers.
    /// Fails if the key cannot travel in a header or the client cannot be built.
    pub fn new(api_key: &ApiKey, settings: &Settings) -> Result<Self> {
        let mut key = HeaderValue::from_str(api_key.expose()).map_err(|_| {
            Error::InvalidApiKey("key contains characters not allowed in an HTTP header".to_string())
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
        })
    }

    fn url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
    ) -> std::result::Result<String, GenerateError> {
        let url = self.url(model);
        debug!(model, %url, prompt_chars = prompt.len(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_status(status, &body);
            debug!(%status, error = %err, "Gemini rejected the request");
            return Err(err);
        }

        let body: GenerateContentResponse = response.json().await.map_err(classify_transport)?;
        body.text().ok_or_else(|| {
            let reason = body.missing_text_reason();
            debug!(%reason, "Gemini response carried no text");
            GenerateError::Unclassified(reason)
        })
    }
}

fn classify_transport(err: reqwest::Error) -> GenerateError {
    if err.is_decode() {
        GenerateError::Unclassified(format!("could not decode Gemini response: {}", err))
    } else if err.is_timeout() {
        GenerateError::Transport(format!("request timed out: {}", err))
    } else {
        GenerateError::Transport(err.to_string())
    }
}

/// Maps a non-success HTTP status and its Google error body onto a failure kind.
pub fn classify_status(status: StatusCode, body: &str) -> GenerateError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|body| body.error)
        .unwrap_or_default();

    let message = if detail.message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no reason given")
            .to_string()
    } else {
        detail.message.clone()
    };

    // Gemini reports a bad key as 400 INVALID_ARGUMENT with an API_KEY_* reason.
    let key_rejected = detail.details.iter().any(|info| {
        info.reason
            .as_deref()
            .map_or(false, |reason| reason.starts_with("API_KEY"))
    });

    let code = status.as_u16();
    match (status, detail.status.as_str()) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _)
        | (_, "UNAUTHENTICATED" | "PERMISSION_DENIED") => GenerateError::Auth {
            status: code,
            message,
        },
        _ if key_rejected => GenerateError::Auth {
            status: code,
            message,
        },
        (StatusCode::TOO_MANY_REQUESTS, _) | (_, "RESOURCE_EXHAUSTED") => GenerateError::Quota {
            status: code,
            message,
        },
        (s, _) if s.is_client_error() => GenerateError::InvalidRequest {
            status: code,
            message,
        },
        _ => GenerateError::Unclassified(format!("Gemini returned {}: {}", status, message)),
    }
}
