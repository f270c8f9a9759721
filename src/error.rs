use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdTableError {
    #[error("Ad data is not valid JSON: {0}")]
    ParseFailed(#[source] serde_json::Error),

    #[error("Ad data must be a JSON array of ad objects, got {0}")]
    NotASequence(&'static str),

    #[error("Ad #{ad_number} is not a JSON object")]
    NotAnObject { ad_number: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ad generation failed: {0}")]
    GenerationFailed(String),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdTableError {
    /// True when the model produced text that could not be turned into an ad table.
    pub fn is_malformed_output(&self) -> bool {
        matches!(
            self,
            Self::ParseFailed(_) | Self::NotASequence(_) | Self::NotAnObject { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AdTableError>;
