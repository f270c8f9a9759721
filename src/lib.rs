//! # Ad Table Builder
//!
//! Turns advertisement copy generated by an LLM (a JSON array of ad objects)
//! into a column-aligned CSV table, and optionally serves the whole
//! prompt → Gemini → CSV round trip over HTTP.
//!
//! ## Core Concepts
//!
//! - **Ad object**: one advertisement with an `ad_type_name` and four
//!   independently sized text lists (headlines, long headlines, body texts, descriptions)
//! - **Flattening**: each ad spans as many rows as its longest list; shorter lists
//!   leave empty cells, and alignment restarts with every ad
//! - **Ad number**: 1-based, assigned in input order, advancing even for ads that
//!   produce no rows
//!
//! ## Features
//!
//! - `gemini`: prompt construction and a streaming Gemini client
//! - `server` (default): the axum endpoint and the `ad_server` binary
//!
//! ## Example
//!
//! ```rust
//! use ad_table_builder::*;
//!
//! let json = r#"[{"ad_type_name":"RSA","headlines":["H1","H2"],"descriptions":["D1"]}]"#;
//!
//! let table = AdTable::from_json_str(json).unwrap();
//! assert_eq!(table.rows().len(), 2);
//!
//! let csv = table.to_csv().unwrap();
//! assert!(csv.starts_with("ad_number,ad_type_name,headlines"));
//! ```

pub mod error;
pub mod ingestion;
pub mod schema;
pub mod table;
pub mod utils;

#[cfg(feature = "gemini")]
pub mod llm;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use error::{AdTableError, Result};
pub use ingestion::{ads_from_value, coerce_text, parse_ads};
pub use schema::{AdList, AdObject};
pub use table::{AdRow, AdTable, COLUMNS};
pub use utils::*;

use log::error;

/// Parses model output and encodes it as CSV in one step.
pub fn flatten_ads_json(json: &str) -> Result<String> {
    AdTable::from_json_str(json)?.to_csv()
}

/// Lenient variant of [`flatten_ads_json`] for callers that want a plain string.
///
/// Any failure is logged and yields an empty string, indistinguishable from
/// "no output". Prefer [`flatten_ads_json`] where the caller can report errors.
pub fn convert_json_ads_to_aligned_columns_csv(json: &str) -> String {
    match flatten_ads_json(json) {
        Ok(csv) => csv,
        Err(e) => {
            error!("Could not convert ad JSON to CSV: {}", e);
            String::new()
        }
    }
}
