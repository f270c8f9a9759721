use crate::error::Result;
use crate::ingestion::{ads_from_value, parse_ads};
use crate::schema::AdObject;
use log::{debug, warn};
use serde::Serialize;

/// Column names of the generated CSV, in output order.
pub const COLUMNS: [&str; 6] = [
    "ad_number",
    "ad_type_name",
    "headlines",
    "long_headlines",
    "body_texts",
    "descriptions",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdRow {
    pub ad_number: usize,
    pub ad_type_name: String,
    pub headline: String,
    pub long_headline: String,
    pub body_text: String,
    pub description: String,
}

impl AdRow {
    fn to_record(&self) -> [String; 6] {
        [
            self.ad_number.to_string(),
            self.ad_type_name.clone(),
            self.headline.clone(),
            self.long_headline.clone(),
            self.body_text.clone(),
            self.description.clone(),
        ]
    }
}

/// Ads flattened into fixed-width rows.
///
/// Each ad spans as many rows as its longest text list. Row `k` of an ad holds
/// the `k`-th entry of every list, or an empty cell where a list is shorter.
/// Alignment restarts with every ad.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdTable {
    rows: Vec<AdRow>,
    ad_count: usize,
}

impl AdTable {
    pub fn from_ads(ads: &[AdObject]) -> Self {
        if ads.is_empty() {
            warn!("Ad list is empty; the CSV will only contain the header row");
        }

        let mut rows = Vec::new();
        let mut ad_number = 0;

        for ad in ads {
            // Numbered before the lists are inspected, so empty ads still take a number.
            ad_number += 1;

            for k in 0..ad.row_span() {
                rows.push(AdRow {
                    ad_number,
                    ad_type_name: ad.ad_type_name.clone(),
                    headline: cell(&ad.headlines, k),
                    long_headline: cell(&ad.long_headlines, k),
                    body_text: cell(&ad.body_texts, k),
                    description: cell(&ad.descriptions, k),
                });
            }
        }

        debug!("Flattened {} ads into {} rows", ad_number, rows.len());

        Self {
            rows,
            ad_count: ad_number,
        }
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let ads = ads_from_value(value)?;
        Ok(Self::from_ads(&ads))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let ads = parse_ads(json)?;
        Ok(Self::from_ads(&ads))
    }

    pub fn rows(&self) -> &[AdRow] {
        &self.rows
    }

    /// Number of input ads, including ones that produced no rows.
    pub fn ad_count(&self) -> usize {
        self.ad_count
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Encodes the table as CSV.
    ///
    /// The header row is always written. Records end with CRLF, and fields
    /// containing a comma, quote, CR or LF are quoted with embedded quotes doubled.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(Vec::new());

        writer.write_record(COLUMNS)?;
        for row in &self.rows {
            writer.write_record(row.to_record())?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

fn cell(values: &[String], k: usize) -> String {
    values.get(k).cloned().unwrap_or_default()
}
