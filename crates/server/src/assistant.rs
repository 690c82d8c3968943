use log::{error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{FetchError, FetchResult};

pub const DEFAULT_GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

pub const INSIGHT_UNAVAILABLE: &str = "AI insights currently unavailable.";
pub const ANSWER_UNAVAILABLE: &str = "I couldn't connect to the AI service right now.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    pub sources: Vec<String>,
}

/// `generateContent` response, reduced to what we read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebSource {
    pub uri: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// Web URIs the first candidate was grounded on.
    pub fn sources(&self) -> Vec<String> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| {
                m.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref()?.uri.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub fn insight_prompt(coin_name: &str, current_price: f64, currency: &str) -> String {
    format!(
        "Provide a very short, professional financial summary (max 2 sentences) for {} at current price {} {}. Is it bullish or bearish today?",
        coin_name, current_price, currency
    )
}

pub fn question_prompt(question: &str) -> String {
    format!(
        "You are a helpful crypto expert assistant. Answer this question concisely: {}",
        question
    )
}

/// Gemini client. Every public call degrades to a fixed message on failure.
pub struct Assistant {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl Assistant {
    pub fn new(client: Client, api_key: Option<String>, base_url: String, model: String) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url,
            model,
        }
    }

    /// An assistant with no key; every call returns the unavailable message.
    pub fn disabled() -> Self {
        Self::new(
            Client::new(),
            None,
            DEFAULT_GEMINI_API.to_string(),
            DEFAULT_GEMINI_MODEL.to_string(),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> FetchResult<GenerateResponse> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey("gemini"))?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "google_search": {} }],
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16() });
        }
        Ok(response.json::<GenerateResponse>().await?)
    }

    pub async fn crypto_insight(&self, coin_name: &str, current_price: f64, currency: &str) -> Insight {
        let prompt = insight_prompt(coin_name, current_price, currency);
        match self.generate(&prompt).await {
            Ok(response) => match response.text() {
                Some(text) => {
                    info!("Generated insight for {}", coin_name);
                    Insight {
                        sources: response.sources(),
                        text,
                    }
                }
                None => {
                    error!("Gemini returned no text for {} insight", coin_name);
                    unavailable_insight()
                }
            },
            Err(e) => {
                error!("Gemini API error: {}", e);
                unavailable_insight()
            }
        }
    }

    pub async fn ask(&self, question: &str) -> String {
        match self.generate(&question_prompt(question)).await {
            Ok(response) => response.text().unwrap_or_else(|| ANSWER_UNAVAILABLE.to_string()),
            Err(e) => {
                error!("Gemini API error: {}", e);
                ANSWER_UNAVAILABLE.to_string()
            }
        }
    }
}

fn unavailable_insight() -> Insight {
    Insight {
        text: INSIGHT_UNAVAILABLE.to_string(),
        sources: Vec::new(),
    }
}
