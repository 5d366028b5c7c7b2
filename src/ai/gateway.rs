//! Model Gateway - the only code that talks to the generative model.
//!
//! Analysis is all-or-nothing and returns `Err` on any problem. Text and
//! image execution never fail: a broken call degrades into a fixed message so
//! the preview panel always has something to show.

use super::client::{GenerateContentResponse, ModelTransport, clean_json_block};
use super::prompts;
use super::schema_utils;
use crate::config::ModelSet;
use crate::core::model::{AnalysisResult, ExecutionMode, SimulationResponse, WebSource};
use crate::error::ForgeError;
use serde_json::{Value, json};
use std::sync::Arc;

pub const NO_TEXT_OUTPUT: &str = "No output generated.";
pub const NO_IMAGE_OUTPUT: &str = "No image generated. The model may have returned only text.";
pub const TEXT_GENERATION_ERROR: &str = "An error occurred during generation.";
pub const IMAGE_GENERATION_ERROR: &str = "An error occurred during image generation.";

const DEFAULT_IMAGE_MIME: &str = "image/png";

pub struct ModelGateway {
    transport: Arc<dyn ModelTransport>,
    models: ModelSet,
}

impl ModelGateway {
    pub fn new(transport: Arc<dyn ModelTransport>, models: ModelSet) -> Self {
        Self { transport, models }
    }

    pub async fn analyze(&self, prompt: &str) -> Result<AnalysisResult, ForgeError> {
        let outcome = self.analyze_inner(prompt).await;
        if let Err(e) = &outcome {
            log::error!("Error analyzing prompt: {e}");
        }
        outcome
    }

    async fn analyze_inner(&self, prompt: &str) -> Result<AnalysisResult, ForgeError> {
        let schema = schema_utils::response_schema::<AnalysisResult>()?;

        let payload = json!({
            "contents": [{
                "parts": [{ "text": prompts::evaluation_request(prompt) }]
            }],
            "systemInstruction": {
                "parts": [{ "text": prompts::EVALUATOR_SYSTEM_INSTRUCTION }]
            },
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });

        let response = self
            .transport
            .generate_content(&self.models.analysis, payload)
            .await?;

        let text = response
            .text()
            .ok_or_else(|| ForgeError::GenerationFailed("No analysis generated".into()))?;

        parse_analysis(&text)
    }

    pub async fn execute_text(&self, prompt: &str, grounding: bool) -> SimulationResponse {
        let mut payload = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });
        if grounding {
            payload["tools"] = json!([{ "googleSearch": {} }]);
        }

        match self.transport.generate_content(&self.models.text, payload).await {
            Ok(response) => {
                let sources = if grounding { web_sources(&response) } else { Vec::new() };
                let content = response.text().unwrap_or_else(|| NO_TEXT_OUTPUT.to_string());
                SimulationResponse::text(content).with_sources(sources)
            }
            Err(e) => {
                log::error!("Error executing prompt: {e}");
                SimulationResponse::degraded(TEXT_GENERATION_ERROR)
            }
        }
    }

    pub async fn execute_image(&self, prompt: &str) -> SimulationResponse {
        let payload = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        match self.transport.generate_content(&self.models.image, payload).await {
            Ok(response) => match first_image(&response) {
                Some(data_uri) => SimulationResponse::text(data_uri),
                None => {
                    log::info!("Image model returned no inline image data");
                    SimulationResponse::text(NO_IMAGE_OUTPUT)
                }
            },
            Err(e) => {
                log::error!("Error generating image: {e}");
                SimulationResponse::degraded(IMAGE_GENERATION_ERROR)
            }
        }
    }

    pub async fn execute(&self, prompt: &str, mode: ExecutionMode) -> SimulationResponse {
        match mode {
            ExecutionMode::Text { grounding } => self.execute_text(prompt, grounding).await,
            ExecutionMode::Image => self.execute_image(prompt).await,
        }
    }
}

/// Parses the analysis text, tolerating a surrounding code fence.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, ForgeError> {
    let cleaned = clean_json_block(text);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        log::error!("Failed to parse JSON: {text}");
        ForgeError::ValidationFailed(format!("Failed to parse analysis result: {e}"))
    })?;

    let result: AnalysisResult = serde_json::from_value(value).map_err(|e| {
        ForgeError::ValidationFailed(format!("Analysis does not match the expected shape: {e}"))
    })?;

    result.validate()
}

/// Citations with both a uri and a title, in response order.
pub fn web_sources(response: &GenerateContentResponse) -> Vec<WebSource> {
    response
        .first_candidate()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|meta| {
            meta.grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .filter_map(|web| match (&web.uri, &web.title) {
                    (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => Some(WebSource {
                        uri: uri.clone(),
                        title: title.clone(),
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn first_image(response: &GenerateContentResponse) -> Option<String> {
    response.parts().iter().find_map(|part| {
        let inline = part.inline_data.as_ref()?;
        let data = inline.data.as_deref().filter(|d| !d.is_empty())?;
        let mime = inline.mime_type.as_deref().unwrap_or(DEFAULT_IMAGE_MIME);
        Some(format!("data:{mime};base64,{data}"))
    })
}
