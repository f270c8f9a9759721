use crate::error::{AdTableError, Result};
use crate::llm::types::*;
use futures::StreamExt;
use log::{debug, warn};
use reqwest::Client;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-04-17";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    settings: GenerationSettings,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the client at a different API root, e.g. a proxy or a local fake.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(&self, prompt: &AdPrompt) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: prompt.contents.clone(),
            system_instruction: Some(Content::user(vec![Part::text(
                prompt.system_instruction.clone(),
            )])),
            generation_config: self.settings.generation_config(),
            safety_settings: self.settings.safety_settings(),
        }
    }

    /// Streams a generation over SSE and returns the concatenated chunk text.
    ///
    /// The whole stream is buffered before returning. Nothing is retried.
    pub async fn stream_generate_content(&self, prompt: &AdPrompt) -> Result<String> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, self.model, self.api_key
        );
        let payload = self.build_request(prompt);

        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AdTableError::Http(e.without_url()))?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res
                .text()
                .await
                .map_err(|e| AdTableError::Http(e.without_url()))?;
            return Err(AdTableError::GenerationFailed(format!(
                "Gemini API Error (status {}): {}",
                status,
                self.redact(&err_text)
            )));
        }

        let mut stream = res.bytes_stream();
        let mut decoder = SseDecoder::default();
        let mut text = String::new();
        let mut chunk_count = 0usize;
        let mut finish_reason: Option<String> = None;

        let mut take = |data: &str| -> Result<()> {
            let chunk = decode_chunk(data)?;
            text.push_str(&chunk.text());
            if let Some(reason) = chunk.finish_reason() {
                finish_reason = Some(reason.to_string());
            }
            chunk_count += 1;
            Ok(())
        };

        while let Some(bytes) = stream.next().await {
            let bytes = bytes.map_err(|e| AdTableError::Http(e.without_url()))?;
            for data in decoder.push(&bytes) {
                take(&data)?;
            }
        }
        for data in decoder.finish() {
            take(&data)?;
        }

        // MAX_TOKENS and SAFETY stop mid-answer, so the JSON is usually cut short.
        if let Some(reason) = finish_reason.as_deref().filter(|r| *r != "STOP") {
            warn!(
                "Gemini model {} finished with {}; output may be truncated",
                self.model, reason
            );
        }

        debug!(
            "Gemini model {} streamed {} chunks ({} chars)",
            self.model,
            chunk_count,
            text.len()
        );

        Ok(text)
    }

    fn redact(&self, text: &str) -> String {
        if self.api_key.is_empty() {
            return text.to_string();
        }
        text.replace(&self.api_key, "[redacted]")
    }
}

fn decode_chunk(data: &str) -> Result<GenerateContentResponse> {
    let chunk: GenerateContentResponse = serde_json::from_str(data).map_err(|e| {
        AdTableError::GenerationFailed(format!("Undecodable stream chunk: {}", e))
    })?;
    if let Some(error) = &chunk.error {
        return Err(AdTableError::GenerationFailed(format!(
            "Gemini stream error: {}",
            error
        )));
    }
    Ok(chunk)
}

/// Splits a Server-Sent Events byte stream into `data:` payloads.
///
/// Network chunks may end anywhere, including inside a UTF-8 sequence, so
/// bytes are held until a full line is available. Each `data:` line is one
/// JSON document.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = data_payload(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flushes a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.buffer);
        data_payload(&line).into_iter().collect()
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    if data.is_empty() {
        None
    } else {
        Some(data.to_string())
    }
}
