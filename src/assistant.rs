//! AI writing assistant.
//!
//! [`WritingAssistant`] is the seam the rest of the crate talks to;
//! [`OpenAiAssistant`] implements it against any OpenAI-compatible
//! `/v1/chat/completions` endpoint. Every failure is an [`AssistantError`]
//! for the caller to show, never a panic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::AssistantConfig;

/// Characters of chapter content sent for a title suggestion.
const TITLE_SAMPLE_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("No API key configured for the writing assistant")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Assistant request timed out")]
    Timeout,

    #[error("Assistant service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse assistant response: {0}")]
    Parse(String),

    #[error("Assistant returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AssistantError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AssistantError::Timeout
        } else {
            AssistantError::Request(e.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WritingAnalysis {
    pub style: String,
    pub tone: String,
    pub suggestions: Vec<String>,
    /// 0 to 10
    pub readability_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChapterSuggestion {
    pub title: String,
    pub description: String,
    pub key_points: Vec<String>,
}

#[async_trait]
pub trait WritingAssistant: Send + Sync {
    async fn analyze_writing(&self, text: &str) -> Result<WritingAnalysis, AssistantError>;

    async fn suggest_chapter_title(&self, content: &str)
        -> Result<ChapterSuggestion, AssistantError>;

    async fn improve_writing(&self, text: &str) -> Result<String, AssistantError>;

    /// Ordered chapter titles for a book about `topic`.
    async fn generate_outline(&self, topic: &str) -> Result<Vec<String>, AssistantError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseFormat {
    Text,
    Json,
}

pub struct OpenAiAssistant {
    client: reqwest::Client,
    config: AssistantConfig,
    api_key: String,
}

impl OpenAiAssistant {
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = config
            .resolved_api_key()
            .ok_or(AssistantError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssistantError::Request(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        format: ResponseFormat,
    ) -> Result<Option<String>, AssistantError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user",   "content": user   }
            ]
        });
        if format == ResponseFormat::Json {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        log::debug!("assistant request to {} ({})", url, self.config.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AssistantError::Parse(e.to_string()))?;

        Ok(message_content(&json))
    }
}

#[async_trait]
impl WritingAssistant for OpenAiAssistant {
    async fn analyze_writing(&self, text: &str) -> Result<WritingAnalysis, AssistantError> {
        let content = self
            .chat(
                "You are a professional writing coach. Analyze the given text and provide \
                 feedback on style, tone, and suggestions for improvement. Format the response \
                 as JSON with style, tone, suggestions and readabilityScore (0-10) fields.",
                &format!("Analyze this text: {text}"),
                ResponseFormat::Json,
            )
            .await?;
        parse_analysis(content.as_deref().unwrap_or("{}"))
    }

    async fn suggest_chapter_title(
        &self,
        content: &str,
    ) -> Result<ChapterSuggestion, AssistantError> {
        let sample: String = content.chars().take(TITLE_SAMPLE_CHARS).collect();
        let reply = self
            .chat(
                "You are a book editor. Based on the chapter content, suggest an engaging title \
                 and brief description. Format the response as JSON with title, description, \
                 and keyPoints fields.",
                &format!("Suggest a title for this chapter content: {sample}..."),
                ResponseFormat::Json,
            )
            .await?;
        parse_suggestion(reply.as_deref().unwrap_or("{}"))
    }

    async fn improve_writing(&self, text: &str) -> Result<String, AssistantError> {
        let reply = self
            .chat(
                "You are a professional editor. Improve the given text while maintaining its \
                 original meaning and style. Focus on clarity, engagement, and flow.",
                &format!("Improve this text: {text}"),
                ResponseFormat::Text,
            )
            .await?;

        // No content means nothing to change
        Ok(reply
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| text.to_string()))
    }

    async fn generate_outline(&self, topic: &str) -> Result<Vec<String>, AssistantError> {
        let reply = self
            .chat(
                "You are a book outlining expert. Create a detailed chapter outline for the \
                 given topic. Format as a JSON object with a chapters array of chapter titles.",
                &format!("Create an outline for: {topic}"),
                ResponseFormat::Json,
            )
            .await?;
        parse_outline(reply.as_deref().unwrap_or("[]"))
    }
}

fn message_content(json: &Value) -> Option<String> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
}

fn parse_json(content: &str) -> Result<Value, AssistantError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AssistantError::EmptyResponse);
    }
    serde_json::from_str(trimmed).map_err(|e| AssistantError::Parse(e.to_string()))
}

pub(crate) fn parse_analysis(content: &str) -> Result<WritingAnalysis, AssistantError> {
    let value = parse_json(content)?;
    let analysis = WritingAnalysis {
        style: string_field(&value, "style"),
        tone: string_field(&value, "tone"),
        suggestions: string_list(&value["suggestions"]),
        readability_score: value["readabilityScore"]
            .as_f64()
            .unwrap_or(0.0)
            .clamp(0.0, 10.0),
    };
    Ok(analysis)
}

pub(crate) fn parse_suggestion(content: &str) -> Result<ChapterSuggestion, AssistantError> {
    let value = parse_json(content)?;
    Ok(ChapterSuggestion {
        title: string_field(&value, "title"),
        description: string_field(&value, "description"),
        key_points: string_list(&value["keyPoints"]),
    })
}

pub(crate) fn parse_outline(content: &str) -> Result<Vec<String>, AssistantError> {
    let value = parse_json(content)?;
    let chapters = match &value {
        Value::Array(_) => &value,
        _ => &value["chapters"],
    };
    Ok(string_list(chapters))
}

fn string_field(value: &Value, key: &str) -> String {
    value[key].as_str().unwrap_or_default().to_string()
}

/// Strings of a JSON array; anything else yields an empty list.
fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
