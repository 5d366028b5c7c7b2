use crate::error::ForgeError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_SCORE: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "The difficulty level or sophistication of the prompt.")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
        };
        f.write_str(name)
    }
}

/// The evaluator's verdict on a prompt. Every field is required on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[schemars(description = "A score from 0 to 10 rating the quality and effectiveness of the prompt.")]
    #[schemars(range(min = 0, max = 10))]
    pub score: u8,

    pub level: DifficultyLevel,

    #[schemars(description = "A brief summary of the prompt's intent and quality.")]
    pub summary: String,

    #[schemars(description = "List of what the prompt does well.")]
    pub strengths: Vec<String>,

    #[schemars(description = "List of areas where the prompt is lacking.")]
    pub weaknesses: Vec<String>,

    #[schemars(description = "Actionable tips to improve the prompt.")]
    pub suggestions: Vec<String>,

    #[schemars(description = "A rewritten version of the prompt that applies the improvements.")]
    pub improved_prompt: String,
}

impl AnalysisResult {
    /// Checks the constraints serde can't express on its own.
    pub fn validate(self) -> Result<Self, ForgeError> {
        if self.score > MAX_SCORE {
            return Err(ForgeError::ValidationFailed(format!(
                "score {} is outside 0..={MAX_SCORE}",
                self.score
            )));
        }
        Ok(self)
    }

    pub fn score_band(&self) -> ScoreBand {
        match self.score {
            8.. => ScoreBand::High,
            5..=7 => ScoreBand::Medium,
            _ => ScoreBand::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    pub uri: String,
    pub title: String,
}

/// Output of a text or image execution. `content` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_sources: Option<Vec<WebSource>>,
    /// Set when `content` is a fixed diagnostic standing in for a failed call.
    #[serde(skip)]
    pub failed: bool,
}

impl SimulationResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            web_sources: None,
            failed: false,
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            web_sources: None,
            failed: true,
        }
    }

    /// Attaches citations, normalizing an empty list to `None`.
    pub fn with_sources(mut self, sources: Vec<WebSource>) -> Self {
        self.web_sources = if sources.is_empty() { None } else { Some(sources) };
        self
    }

    pub fn is_image(&self) -> bool {
        self.content.starts_with("data:image")
    }

    /// Decodes an image data URI into its MIME type and raw bytes.
    pub fn image_bytes(&self) -> Option<(String, Vec<u8>)> {
        let rest = self.content.strip_prefix("data:")?;
        let (mime, payload) = rest.split_once(";base64,")?;
        if !mime.starts_with("image/") {
            return None;
        }
        let bytes = STANDARD.decode(payload.trim()).ok()?;
        Some((mime.to_string(), bytes))
    }

    pub fn sources(&self) -> &[WebSource] {
        self.web_sources.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Analysis,
    Simulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Image,
}

/// The effective shape of one execution request.
///
/// Grounding only exists for text, so two image runs are equivalent no
/// matter how the grounding toggle was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Text { grounding: bool },
    Image,
}

impl ExecutionMode {
    pub fn resolve(mode: OutputMode, grounding: bool) -> Self {
        match mode {
            OutputMode::Text => ExecutionMode::Text { grounding },
            OutputMode::Image => ExecutionMode::Image,
        }
    }
}
