//! Rugmeter Card Engine
//!
//! The result-card generation pipeline behind the crypto trauma quiz:
//! deterministic scoring and rank classification, optional cached title
//! enrichment, a fixed-layout card document, and a headless rendering
//! pipeline that rasterizes the card into PNG bytes.
//!
//! # Features
//!
//! - **Chrome Backend** (default): rasterizes cards via headless Chrome
//! - **Swappable Engines**: the [`RenderEngine`] trait lets tests and
//!   alternative backends plug into the same pipeline
//! - **Graceful Degradation**: enrichment and avatar failures fall back to
//!   deterministic defaults and never block a card
//!
//! # Example
//!
//! ```no_run
//! use rugmeter::{classify, trauma_percentage, Card, IdentityHandle, RenderConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let score = rugmeter::tally(&[8, 10, 5, 7, 9]);
//! let tier = classify(score);
//! let card = Card::new(tier.clone(), trauma_percentage(score), IdentityHandle::anonymous());
//!
//! let config = RenderConfig::default();
//! let png = rugmeter::render_card_chrome(&config, &card)?;
//! std::fs::write("trauma-card.png", png)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod score;
pub use score::{tally, trauma_percentage, QuizAnswer, TraumaScore, MAX_SCORE};

pub mod rank;
pub use rank::{classify, RankTier};

pub mod identity;
pub use identity::IdentityHandle;

pub mod enrich;
pub use enrich::{EnrichConfig, Enricher, TitleCache};

pub mod card;
pub use card::{build_document, Card};

pub mod pipeline;
pub use pipeline::render_document;

pub mod session;
pub use session::Session;

// Headless-Chrome backend (feature-gated)
#[cfg(feature = "chrome")]
pub mod chrome;

/// Configuration for the rendering side of the pipeline
///
/// The defaults match the card's fixed canvas: a 400x600 logical viewport
/// captured at a 2.0 device-scale factor for crisp raster output. The
/// timeout bounds the content-stable wait, after which the render call
/// fails rather than hanging.
///
/// # Examples
///
/// ```
/// let cfg = rugmeter::RenderConfig::default();
/// assert_eq!(cfg.viewport.width, 400);
/// assert_eq!(cfg.device_scale_factor, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Logical canvas dimensions of the card
    pub viewport: Viewport,
    /// Device-scale factor applied at capture time
    pub device_scale_factor: f64,
    /// Deadline for the content-stable signal, in milliseconds
    pub timeout_ms: u64,
    /// Capture with a transparent background instead of the card gradient
    pub transparent: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            device_scale_factor: 2.0,
            timeout_ms: 15000,
            transparent: false,
        }
    }
}

/// Logical viewport dimensions
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: card::CARD_WIDTH,
            height: card::CARD_HEIGHT,
        }
    }
}

/// Core trait for render-engine backends
///
/// One engine instance is exclusively owned by a single in-flight render
/// call; it is never shared or reused across calls, so no document or
/// viewport state bleeds between captures. `close` must be called on every
/// exit path once construction succeeded.
pub trait RenderEngine {
    /// Acquire a new engine instance configured for the given canvas
    fn new(config: &RenderConfig) -> Result<Self>
    where
        Self: Sized;

    /// Load the card document markup into the engine
    fn load_document(&mut self, html: &str) -> Result<()>;

    /// Block until the document signals content-stable (fonts and images
    /// settled), or fail once the configured deadline passes
    fn wait_ready(&mut self) -> Result<()>;

    /// Capture exactly one PNG snapshot of the configured viewport
    fn capture(&mut self) -> Result<Vec<u8>>;

    /// Release the engine and its underlying resources
    fn close(self) -> Result<()>;
}

/// Create a new render engine with the default backend
#[cfg(feature = "chrome")]
pub fn new_engine(config: &RenderConfig) -> Result<impl RenderEngine> {
    chrome::ChromeEngine::new(config)
}

/// Render a fully resolved card to PNG bytes using the Chrome backend
#[cfg(feature = "chrome")]
pub fn render_card_chrome(config: &RenderConfig, card: &Card) -> Result<Vec<u8>> {
    let html = build_document(card, config);
    pipeline::render_document::<chrome::ChromeEngine>(config, &html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.viewport.width, 400);
        assert_eq!(config.viewport.height, 600);
        assert_eq!(config.device_scale_factor, 2.0);
        assert!(!config.transparent);
    }

    #[test]
    fn test_custom_viewport() {
        let viewport = Viewport {
            width: 800,
            height: 1200,
        };
        assert_eq!(viewport.width, 800);
        assert_eq!(viewport.height, 1200);
    }
}
