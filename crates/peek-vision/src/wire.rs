//! `generateContent` request and response bodies

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::VisionError;

#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl GenerateRequest {
    /// One user turn: the instruction followed by the base64 PNG
    pub fn screenshot(prompt: &str, png: &[u8], max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text {
                        text: prompt.to_string(),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png".to_string(),
                            data: STANDARD.encode(png),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens,
                temperature,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
    #[serde(default)]
    pub safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
pub struct SafetyRating {
    pub category: Option<String>,
    pub probability: Option<String>,
}

impl SafetyRating {
    /// `HARM_CATEGORY_HARASSMENT` + `HIGH` -> `HARASSMENT: HIGH`
    fn summary(&self) -> String {
        let category = self
            .category
            .as_deref()
            .and_then(|c| c.rsplit('_').next())
            .unwrap_or("?");
        let probability = self.probability.as_deref().unwrap_or("?");
        format!("{category}: {probability}")
    }
}

/// Parse a success body and pull out `candidates[0].content.parts[0].text`
pub fn parse_response(body: &str) -> Result<String, VisionError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| VisionError::Parse(e.to_string()))?;
    extract_answer(response)
}

pub fn extract_answer(response: GenerateResponse) -> Result<String, VisionError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return match response.prompt_feedback {
            Some(feedback) => Err(blocked(feedback)),
            None => Err(VisionError::EmptyResponse),
        };
    };

    let part = candidate
        .content
        .ok_or_else(|| VisionError::Parse("candidate has no content".into()))?
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| VisionError::Parse("content has no parts".into()))?;

    let text = part
        .text
        .ok_or_else(|| VisionError::Parse("part has no text".into()))?;

    Ok(text.trim().to_string())
}

fn blocked(feedback: PromptFeedback) -> VisionError {
    let details = feedback
        .safety_ratings
        .iter()
        .map(SafetyRating::summary)
        .collect::<Vec<_>>()
        .join(", ");

    VisionError::Blocked {
        reason: feedback.block_reason.unwrap_or_else(|| "Unknown".to_string()),
        details,
    }
}
