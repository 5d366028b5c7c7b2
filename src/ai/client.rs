use crate::config::ForgeConfig;
use crate::error::ForgeError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Anything that can answer a `generateContent` call.
///
/// The gateway only talks to this trait so it can run against a scripted
/// backend in tests.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        payload: Value,
    ) -> Result<GenerateContentResponse, ForgeError>;
}

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// No request timeout is set; the transport's defaults apply.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ForgeError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &ForgeConfig) -> Result<Self, ForgeError> {
        Self::new(config.api_key.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ModelTransport for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        payload: Value,
    ) -> Result<GenerateContentResponse, ForgeError> {
        let endpoint = format!("{}/models/{}:generateContent", self.base_url, model);
        log::debug!("➡️  POST {endpoint}");

        // Keep the key out of the URL; reqwest errors print it.
        let res = self
            .client
            .post(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let err_text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&err_text)
                .map(|body| body.error.message)
                .unwrap_or(err_text);
            log::error!("API Error {status}: {message}");
            return Err(ForgeError::GenerationFailed(format!("API Error {status}: {message}")));
        }

        Ok(res.json().await?)
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Concatenated text of the first candidate, ignoring thought parts.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .parts()
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    pub fn parts(&self) -> &[Part] {
        self.first_candidate()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: Option<String>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// Strips a surrounding markdown code fence, with or without a language tag.
pub fn clean_json_block(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
