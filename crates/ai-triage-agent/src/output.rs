//! Parses an LLM response as the JSON shape required by the prompt
//! template (§4.7 step 2): "parse as JSON. If the response is non-JSON or
//! missing required fields, attempt a single repair prompt."

use serde::Deserialize;
use thiserror::Error;

use alertmesh_store::{RecommendedAction, RiskLevel};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawModelOutput {
    score: Option<serde_json::Value>,
    level: Option<String>,
    confidence: Option<f32>,
    recommended_actions: Option<Vec<RecommendedAction>>,
    narrative: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelOutput {
    pub score: u8,
    pub level: RiskLevel,
    pub confidence: f32,
    pub recommended_actions: Vec<RecommendedAction>,
    pub narrative: String,
}

/// Strips a markdown code fence some models wrap JSON in, then parses and
/// validates required fields are present.
pub fn parse(response: &str) -> Result<ModelOutput, ParseError> {
    let trimmed = strip_code_fence(response);
    let raw: RawModelOutput = serde_json::from_str(trimmed).map_err(|e| ParseError::NotJson(e.to_string()))?;

    let score = raw
        .score
        .ok_or(ParseError::MissingField("score"))?
        .as_u64()
        .ok_or(ParseError::MissingField("score"))?
        .min(100) as u8;
    let level_str = raw.level.ok_or(ParseError::MissingField("level"))?;
    let level = parse_level(&level_str).ok_or(ParseError::MissingField("level"))?;
    let confidence = raw.confidence.ok_or(ParseError::MissingField("confidence"))?;
    let narrative = raw.narrative.ok_or(ParseError::MissingField("narrative"))?;
    let recommended_actions = raw.recommended_actions.unwrap_or_default();

    Ok(ModelOutput {
        score,
        level,
        confidence,
        recommended_actions,
        narrative,
    })
}

fn parse_level(raw: &str) -> Option<RiskLevel> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "info" => Some(RiskLevel::Info),
        "low" => Some(RiskLevel::Low),
        "medium" => Some(RiskLevel::Medium),
        "high" => Some(RiskLevel::High),
        "critical" => Some(RiskLevel::Critical),
        _ => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        stripped.trim_end_matches("```").trim()
    } else if let Some(stripped) = trimmed.strip_prefix("```") {
        stripped.trim_end_matches("```").trim()
    } else {
        trimmed
    }
}
