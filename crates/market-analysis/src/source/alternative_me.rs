//! alternative.me Fear & Greed Index

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use super::{SentimentSource, get_json, http_client};
use crate::error::{AnalysisError, Result};
use crate::model::SentimentReading;

pub const DEFAULT_BASE_URL: &str = "https://api.alternative.me";

const SOURCE: &str = "alternative.me";

#[derive(Debug, Deserialize)]
struct FngResponse {
    #[serde(default)]
    data: Vec<FngEntry>,
    #[serde(default)]
    metadata: Option<FngMetadata>,
}

/// The API sends every field as a string
#[derive(Debug, Deserialize)]
struct FngEntry {
    value: String,
    value_classification: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct FngMetadata {
    error: Option<String>,
}

pub struct AlternativeMeClient {
    client: reqwest::Client,
    base_url: String,
}

impl AlternativeMeClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn parse_entry(entry: &FngEntry) -> Result<SentimentReading> {
        let malformed = |detail: String| AnalysisError::MalformedResponse {
            source_name: SOURCE,
            detail,
        };

        let value: u8 = entry
            .value
            .trim()
            .parse()
            .map_err(|_| malformed(format!("index value '{}'", entry.value)))?;
        if value > 100 {
            return Err(malformed(format!("index value {value} out of range")));
        }

        let date = entry
            .timestamp
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|ts| ts.date_naive())
            .ok_or_else(|| malformed(format!("timestamp '{}'", entry.timestamp)))?;

        Ok(SentimentReading::new(date, value).with_classification(&entry.value_classification))
    }
}

#[async_trait]
impl SentimentSource for AlternativeMeClient {
    async fn fear_and_greed(&self, limit: u32) -> Result<Vec<SentimentReading>> {
        let url = format!("{}/fng/", self.base_url);
        let query = [("limit", limit.max(1).to_string())];

        let response: FngResponse = get_json(&self.client, &url, &query, SOURCE).await?;

        if let Some(error) = response.metadata.and_then(|m| m.error) {
            return Err(AnalysisError::RemoteFetch(format!("{SOURCE}: {error}")));
        }

        let mut readings = response
            .data
            .iter()
            .map(Self::parse_entry)
            .collect::<Result<Vec<_>>>()?;
        readings.sort_by_key(|r| r.date);

        tracing::info!(
            readings = readings.len(),
            latest = readings.last().map(|r| r.value),
            "fetched fear and greed index"
        );
        Ok(readings)
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
