//! Title enrichment adapter
//!
//! Wraps the external text-generation collaborator that personalizes the
//! default tier title. Results are cached per session keyed by
//! `(score, handle)`; any failure falls back silently to the tier's default
//! title and is never cached, so a later attempt may still succeed.

use crate::identity::IdentityHandle;
use crate::rank::RankTier;
use crate::score::{trauma_percentage, TraumaScore};
use crate::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Configuration for the enrichment collaborator
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Chat-completions endpoint of the text-generation collaborator
    pub endpoint: String,
    /// Bearer token; empty string sends no Authorization header
    pub api_key: String,
    /// Model identifier forwarded in the request
    pub model: String,
    /// Bound on the whole enrichment round-trip, in milliseconds
    pub timeout_ms: u64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_ms: 8000,
        }
    }
}

type CacheKey = (TraumaScore, String);

/// Session-scoped title cache.
///
/// Entries are write-once per `(score, handle)` key; overwriting with an
/// equal value is harmless, so concurrent duplicate enrichments need no
/// cross-request coordination. Created at session start and cleared when
/// the session ends.
#[derive(Debug, Default)]
pub struct TitleCache {
    entries: Mutex<HashMap<CacheKey, String>>,
}

impl TitleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached title for a key.
    pub fn get(&self, score: TraumaScore, handle: &IdentityHandle) -> Option<String> {
        self.lock().get(&(score, handle.as_str().to_string())).cloned()
    }

    /// Record a successful enrichment for a key.
    pub fn insert(&self, score: TraumaScore, handle: &IdentityHandle, title: String) {
        self.lock().insert((score, handle.as_str().to_string()), title);
    }

    /// Drop all entries (session end).
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, String>> {
        // A poisoned lock only means another enrichment panicked mid-insert;
        // the map itself stays usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// The caching wrapper around the optional title-generation call
pub struct Enricher {
    client: reqwest::Client,
    config: EnrichConfig,
}

impl Enricher {
    pub fn new(config: EnrichConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Resolve the title for a card: cached value, fresh enrichment, or the
    /// tier's default on any failure.
    ///
    /// Never errors and never blocks a card from rendering; dropping or
    /// aborting the returned future abandons the request without touching
    /// the cache.
    pub async fn enrich(
        &self,
        cache: &TitleCache,
        score: TraumaScore,
        tier: &RankTier,
        handle: &IdentityHandle,
    ) -> String {
        if let Some(hit) = cache.get(score, handle) {
            debug!("Title cache hit for score {}", score);
            return hit;
        }

        match self.request_title(score, tier, handle).await {
            Ok(title) => {
                cache.insert(score, handle, title.clone());
                title
            }
            Err(e) => {
                // Failures are not cached so a later retry may succeed.
                warn!("Title enrichment failed, using default: {}", e);
                tier.title.to_string()
            }
        }
    }

    async fn request_title(
        &self,
        score: TraumaScore,
        tier: &RankTier,
        handle: &IdentityHandle,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(score, tier, handle),
            }],
            temperature: 0.9,
            max_tokens: 50,
        };

        let mut req = self.client.post(&self.config.endpoint).json(&body);
        if !self.config.api_key.is_empty() {
            req = req.bearer_auth(&self.config.api_key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::EnrichmentError(format!("Request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::EnrichmentError(format!(
                "Collaborator returned {}",
                resp.status()
            )));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| Error::EnrichmentError(format!("Malformed payload: {}", e)))?;

        let title = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .unwrap_or("");

        if title.is_empty() {
            return Err(Error::EnrichmentError("Empty title in response".into()));
        }

        Ok(title.to_string())
    }
}

fn build_prompt(score: TraumaScore, tier: &RankTier, handle: &IdentityHandle) -> String {
    let user = if handle.is_empty() { "anon" } else { handle.as_str() };
    format!(
        "Generate a creative and funny crypto trader title for Twitter user {user} \
who scored {pct}% on a crypto trauma test.\n\
Their traits include: {traits}.\n\n\
The title should:\n\
- Be funny and meme-worthy\n\
- Include an emoji\n\
- Be max 40 characters\n\
- Feel like a crypto/web3 title\n\
- Be slightly edgy but not offensive\n\
- Reference crypto/trading culture\n\
- Be unique to their personality\n\n\
Return ONLY the title, nothing else.",
        user = user,
        pct = trauma_percentage(score),
        traits = tier.traits.join(", "),
    )
}
