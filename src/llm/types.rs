use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: "user".to_string(),
            parts,
        }
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHateSpeech,
    HarmCategoryDangerousContent,
    HarmCategorySexuallyExplicit,
    HarmCategoryHarassment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: String,
}

/// Sampling and safety parameters sent with every generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub safety_threshold: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.95,
            max_output_tokens: 8192,
            safety_threshold: "OFF".to_string(),
        }
    }
}

impl GenerationSettings {
    pub fn safety_settings(&self) -> Vec<SafetySetting> {
        [
            HarmCategory::HarmCategoryHateSpeech,
            HarmCategory::HarmCategoryDangerousContent,
            HarmCategory::HarmCategorySexuallyExplicit,
            HarmCategory::HarmCategoryHarassment,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: self.safety_threshold.clone(),
        })
        .collect()
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            max_output_tokens: self.max_output_tokens,
            response_modalities: vec!["TEXT".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    /// Set when the API aborts a stream that already answered 200.
    #[serde(default)]
    pub error: Option<ApiErrorStatus>,
}

impl GenerateContentResponse {
    /// Text carried by the first candidate; empty for metadata-only chunks.
    pub fn text(&self) -> String {
        self.candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.content.as_ref())
            .map(Content::text)
            .unwrap_or_default()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.finish_reason.as_deref())
    }
}

/// Google API error body, as sent in place of a response chunk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorStatus {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl std::fmt::Display for ApiErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.code.map(|code| code.to_string()).unwrap_or_default(),
            self.status.as_deref().unwrap_or("UNKNOWN"),
            self.message.as_deref().unwrap_or("no message")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// A file uploaded alongside an ad request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// A validated ad-generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdRequest {
    pub product: String,
    pub platforms: Vec<String>,
    pub chat_input: String,
    pub attachments: Vec<Attachment>,
}

/// Fully assembled model input for one ad-generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct AdPrompt {
    pub system_instruction: String,
    pub contents: Vec<Content>,
}

impl AdPrompt {
    pub fn user_parts(&self) -> impl Iterator<Item = &str> {
        self.contents
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
    }
}
