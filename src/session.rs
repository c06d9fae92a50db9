//! Session facade over the card pipeline
//!
//! A `Session` owns the title cache and the collaborator clients for one
//! quiz session. The cache lives exactly as long as the session: created
//! here, cleared by [`Session::clear`] when the session ends. On-screen
//! cards render immediately with the default tier title; share/export
//! paths resolve enrichment (success or fallback) before the title is
//! considered final.

use crate::card::Card;
use crate::enrich::{EnrichConfig, Enricher, TitleCache};
use crate::identity::{avatar_url_in, probe_avatar, IdentityHandle, AVATAR_SERVICE};
use crate::pipeline::render_document;
use crate::rank::classify;
use crate::score::{trauma_percentage, TraumaScore};
use crate::{build_document, Error, RenderConfig, RenderEngine, Result};
use std::time::Duration;
use tokio::sync::oneshot;
use url::Url;

/// Bound on the avatar probe round-trip
const AVATAR_TIMEOUT_MS: u64 = 5000;

/// One quiz session: title cache, enrichment client, render settings
pub struct Session {
    cache: TitleCache,
    enricher: Enricher,
    http: reqwest::Client,
    render_config: RenderConfig,
    avatar_service: Url,
}

impl Session {
    pub fn new(enrich_config: EnrichConfig, render_config: RenderConfig) -> Result<Self> {
        let enricher = Enricher::new(enrich_config)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(AVATAR_TIMEOUT_MS))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        let avatar_service = Url::parse(AVATAR_SERVICE)
            .map_err(|e| Error::ConfigError(format!("Bad avatar service URL: {}", e)))?;
        Ok(Self {
            cache: TitleCache::new(),
            enricher,
            http,
            render_config,
            avatar_service,
        })
    }

    /// Point the avatar probe at a different service root.
    pub fn set_avatar_service(&mut self, url: Url) {
        self.avatar_service = url;
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render_config
    }

    pub fn cache(&self) -> &TitleCache {
        &self.cache
    }

    /// End the session: drop all cached titles.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Immediate card for on-screen display. Uses the default tier title
    /// unless an enrichment already resolved for this `(score, handle)`.
    pub fn result_card(&self, score: TraumaScore, handle: &IdentityHandle) -> Card {
        let card = Card::new(classify(score).clone(), trauma_percentage(score), handle.clone());
        match self.cache.get(score, handle) {
            Some(title) => card.with_title(title),
            None => card,
        }
    }

    /// Resolve the title for a score: cached, freshly enriched, or the
    /// tier default on failure. Fire-and-forget friendly; dropping the
    /// future abandons the request without touching the cache.
    pub async fn enrich_title(&self, score: TraumaScore, handle: &IdentityHandle) -> String {
        self.enricher
            .enrich(&self.cache, score, classify(score), handle)
            .await
    }

    /// Fully resolved card for share/export: enrichment has settled
    /// (success or fallback) and the avatar has been probed, with the
    /// identity block dropped if the probe failed.
    pub async fn export_card(&self, score: TraumaScore, handle: &IdentityHandle) -> Card {
        let title = self.enrich_title(score, handle).await;
        let mut card = Card::new(classify(score).clone(), trauma_percentage(score), handle.clone())
            .with_title(title);

        if card.identity.is_some() {
            let reachable = match avatar_url_in(&self.avatar_service, handle) {
                Some(url) => probe_avatar(&self.http, &url).await,
                None => false,
            };
            if !reachable {
                card.drop_identity();
            }
        }

        card
    }

    /// Render a resolved card to PNG bytes on a dedicated worker thread.
    ///
    /// The worker owns the engine for exactly this call (the engine is
    /// never shared across renders) and reports back over a oneshot
    /// channel so async callers are not blocked by the synchronous
    /// backend.
    pub async fn export_png<E>(&self, card: &Card) -> Result<Vec<u8>>
    where
        E: RenderEngine + 'static,
    {
        let html = build_document(card, &self.render_config);
        let config = self.render_config.clone();
        let (tx, rx) = oneshot::channel();

        std::thread::spawn(move || {
            let result = render_document::<E>(&config, &html);
            let _ = tx.send(result);
        });

        rx.await
            .map_err(|e| Error::Other(format!("Render worker canceled: {}", e)))?
    }

    /// [`Session::export_png`] with the Chrome backend.
    #[cfg(feature = "chrome")]
    pub async fn export_png_chrome(&self, card: &Card) -> Result<Vec<u8>> {
        self.export_png::<crate::chrome::ChromeEngine>(card).await
    }
}
