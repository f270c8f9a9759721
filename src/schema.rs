use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(
    title = "Advertisement Object",
    description = "Defines the structure for a single advertisement, including its specific type/format name and textual components. An empty array for text components (headlines, body_texts, etc.) indicates that the component is not applicable for the given ad type."
)]
pub struct AdObject {
    #[schemars(
        description = "The specific name or type of the ad format. This should clearly identify the ad specification being used."
    )]
    pub ad_type_name: String,

    #[serde(default)]
    #[schemars(
        description = "Array of headline texts. This can include short headlines or general headlines. An empty array signifies no headlines are applicable."
    )]
    pub headlines: Vec<String>,

    #[serde(default)]
    #[schemars(
        description = "Array of long headline texts. An empty array signifies no long headlines are applicable."
    )]
    pub long_headlines: Vec<String>,

    #[serde(default)]
    #[schemars(
        description = "Array of body texts. An empty array signifies no body texts are applicable."
    )]
    pub body_texts: Vec<String>,

    #[serde(default)]
    #[schemars(
        description = "Array of description texts. An empty array signifies no descriptions are applicable."
    )]
    pub descriptions: Vec<String>,
}

impl AdObject {
    pub fn new(ad_type_name: impl Into<String>) -> Self {
        Self {
            ad_type_name: ad_type_name.into(),
            ..Self::default()
        }
    }

    /// Number of rows this ad occupies once its text lists are aligned.
    pub fn row_span(&self) -> usize {
        self.headlines
            .len()
            .max(self.long_headlines.len())
            .max(self.body_texts.len())
            .max(self.descriptions.len())
    }
}

/// The document the model is asked to produce: a bare array of ads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(
    title = "List of Advertisements",
    description = "A JSON schema representing a list (array) of advertisements. Each advertisement in the list includes its specific type/format name and textual components."
)]
pub struct AdList(pub Vec<AdObject>);

impl AdList {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AdList)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
