use std::env;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
pub const MAX_RETRIES: usize = 2;
const BACKOFF_BASE_MS: u64 = 500;
const BACKOFF_JITTER_MS: u64 = 250;

#[derive(Debug)]
pub enum InferenceError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
    Timeout(u64),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            InferenceError::HttpError(err) => write!(f, "HTTP error: {}", err),
            InferenceError::ResponseError(msg) => write!(f, "Response error: {}", msg),
            InferenceError::Timeout(secs) => write!(f, "Request timed out after {}s", secs),
        }
    }
}

impl Error for InferenceError {}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        InferenceError::HttpError(err)
    }
}

/// Boundary to the external reasoning/embedding service. Both operations are
/// fallible and retryable; callers degrade to their documented fallbacks
/// when an error survives the retry budget.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError>;
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, InferenceError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    input_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Clone)]
pub struct CohereService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    generate_model: String,
    embed_model: String,
    timeout: Duration,
    max_retries: usize,
}

impl CohereService {
    pub fn from_env() -> Self {
        let api_key = env::var("COHERE_API_KEY").ok();
        if api_key.is_none() {
            eprintln!("COHERE_API_KEY not set; inference calls will use fallbacks");
        }

        Self {
            client: Client::new(),
            api_key,
            base_url: env::var("COHERE_BASE_URL")
                .unwrap_or_else(|_| "https://api.cohere.com".to_string()),
            generate_model: env::var("COHERE_GENERATE_MODEL")
                .unwrap_or_else(|_| "command".to_string()),
            embed_model: env::var("COHERE_EMBED_MODEL")
                .unwrap_or_else(|_| "embed-english-light-v3.0".to_string()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
        }
    }

    fn api_key(&self) -> Result<&str, InferenceError> {
        self.api_key.as_deref().ok_or_else(|| {
            InferenceError::EnvironmentError("COHERE_API_KEY not set".to_string())
        })
    }

    async fn try_complete(&self, prompt: &str) -> Result<String, InferenceError> {
        let api_key = self.api_key()?;
        let url = format!("{}/v1/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.generate_model,
            prompt,
            max_tokens: 500,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::ResponseError(format!(
                "Generate request failed with status {}: {}",
                status, error_text
            )));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            InferenceError::ResponseError(format!("Failed to parse response: {}", e))
        })?;

        parsed
            .generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or_else(|| InferenceError::ResponseError("Empty generations array".to_string()))
    }

    async fn try_embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, InferenceError> {
        let api_key = self.api_key()?;
        let url = format!("{}/v1/embed", self.base_url);

        let request = EmbedRequest {
            model: &self.embed_model,
            texts,
            input_type: "search_query",
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::ResponseError(format!(
                "Embed request failed with status {}: {}",
                status, error_text
            )));
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            InferenceError::ResponseError(format!("Failed to parse response: {}", e))
        })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(InferenceError::ResponseError(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        Ok(parsed.embeddings)
    }

    /// Run an operation under the service timeout, retrying transient
    /// failures with exponential backoff and jitter. A missing API key is
    /// not retried; waiting will not configure the environment.
    async fn with_retries<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, InferenceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, InferenceError>>,
    {
        let mut attempt = 0;
        loop {
            let err = match tokio::time::timeout(self.timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err @ InferenceError::EnvironmentError(_))) => return Err(err),
                Ok(Err(err)) => err,
                Err(_) => InferenceError::Timeout(self.timeout.as_secs()),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }

            let backoff = BACKOFF_BASE_MS * 2u64.pow(attempt as u32)
                + rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS);
            eprintln!(
                "{} attempt {} failed: {}. Retrying in {}ms",
                label,
                attempt + 1,
                err,
                backoff
            );
            tokio::time::sleep(Duration::from_millis(backoff)).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl InferenceBackend for CohereService {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        self.with_retries("complete", || self.try_complete(prompt)).await
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, InferenceError> {
        self.with_retries("embed", || self.try_embed(texts)).await
    }
}
