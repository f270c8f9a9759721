use crate::error::Result;
use crate::llm::client::GeminiClient;
use crate::llm::prompts::{build_ad_prompt, load_guide};
use crate::llm::types::{AdPrompt, AdRequest};
use crate::schema::AdList;
use crate::table::AdTable;
use crate::utils::strip_code_fences;
use log::debug;
use std::future::Future;
use std::path::{Path, PathBuf};

/// A text model that answers an ad prompt with (hopefully) JSON ad copy.
pub trait AdCopyModel: Send + Sync {
    fn generate(&self, prompt: &AdPrompt) -> impl Future<Output = Result<String>> + Send;
}

impl AdCopyModel for GeminiClient {
    async fn generate(&self, prompt: &AdPrompt) -> Result<String> {
        self.stream_generate_content(prompt).await
    }
}

/// Runs one request through prompt construction, the model, and flattening.
pub struct AdGenerator<M> {
    model: M,
    schema: String,
    guide_path: Option<PathBuf>,
}

impl<M: AdCopyModel> AdGenerator<M> {
    pub fn new(model: M) -> Result<Self> {
        Ok(Self {
            model,
            schema: AdList::schema_as_json()?,
            guide_path: None,
        })
    }

    /// The guide is re-read on every request so edits apply without a restart.
    pub fn with_guide_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.guide_path = Some(path.into());
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn guide_path(&self) -> Option<&Path> {
        self.guide_path.as_deref()
    }

    pub async fn prompt_for(&self, request: &AdRequest) -> AdPrompt {
        let guide = match &self.guide_path {
            Some(path) => load_guide(path).await,
            None => None,
        };
        build_ad_prompt(request, &self.schema, guide.as_deref())
    }

    pub async fn generate_table(&self, request: &AdRequest) -> Result<AdTable> {
        let prompt = self.prompt_for(request).await;
        let raw = self.model.generate(&prompt).await?;
        let cleaned = strip_code_fences(&raw);
        debug!("Model returned {} chars of ad JSON", cleaned.len());

        AdTable::from_json_str(&cleaned)
    }

    pub async fn generate_csv(&self, request: &AdRequest) -> Result<String> {
        self.generate_table(request).await?.to_csv()
    }
}
