//! Implements the `Narrator` trait with the Gemini `generateContent` REST endpoint.

use crate::api::Narrator;
use crate::Result;
use anyhow::{bail, Context};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// The role and the output rules handed to the model with every request.
const SYSTEM_INSTRUCTION: &str = "You are a private banker. Your tone is analytical but \
empathetic. Describe the person and the household separately. Use only the figures given in the \
request. Answer in Markdown, using level-two headings: 1. Current situation, 2. Structure of \
expenses, 3. One recommended action, 4. Outlook, and finally a grade from 4 to 10 with a short \
justification.";

pub(crate) struct GeminiNarrator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiNarrator {
    pub(crate) fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Narrator for GeminiNarrator {
    async fn generate(&self, payload: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content::user(payload)],
            system_instruction: Some(Content::user(SYSTEM_INSTRUCTION)),
        };
        debug!("Requesting a narrative from model {}", self.model);
        trace!("Narrative payload:\n{payload}");

        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Unable to reach the Gemini API")?;

        let status = res.status();
        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            bail!("Gemini API error (status {status}): {err_text}");
        }

        let body: GenerateContentResponse = res
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Unable to parse the Gemini API response")?;
        body.first_text()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateContentResponse {
    /// The text parts of the first candidate, joined.
    fn first_text(&self) -> Result<String> {
        let Some(candidate) = self.candidates.first() else {
            bail!("The Gemini API returned no candidates");
        };
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            bail!("The Gemini API returned an empty answer");
        }
        Ok(text)
    }
}
