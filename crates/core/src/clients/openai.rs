use crate::error::RemoteError;
use crate::traits::GenerativeClient;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: 0.3,
            max_tokens: 700,
        }
    }
}

/// Chat-completions client for OpenAI and compatible servers.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    timeout: Duration,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, RemoteError> {
        let api_key = config
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RemoteError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;

        Ok(Self {
            client: Client::new(),
            endpoint: chat_completions_url(&config.base_url)?,
            api_key,
            model: config.model,
            timeout: config.timeout,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Accepts both `https://host` and `https://host/v1` style base URLs.
fn chat_completions_url(base_url: &str) -> Result<Url, RemoteError> {
    let base = base_url.trim().trim_end_matches('/');
    let endpoint = if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    };
    Ok(Url::parse(&endpoint)?)
}

#[async_trait]
impl GenerativeClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, RemoteError> {
        let request = ChatCompletionsRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let timeout_ms = self.timeout.as_millis() as u64;
        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| classify(error, timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                details: details.chars().take(200).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|error| classify(error, timeout_ms))?;
        let parsed: ChatCompletionsResponse = serde_json::from_str(&body)
            .map_err(|error| RemoteError::MalformedResponse(error.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(RemoteError::EmptyResponse);
        }

        debug!(model = %self.model, chars = content.len(), "chat completion received");
        Ok(content)
    }
}

fn classify(error: reqwest::Error, timeout_ms: u64) -> RemoteError {
    if error.is_timeout() {
        RemoteError::Timeout(timeout_ms)
    } else {
        RemoteError::Http(error)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
