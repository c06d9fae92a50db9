//! Card model and layout builder
//!
//! Builds the fixed-dimension card document from a fully resolved rank
//! tier, trauma percentage, and optional identity. Layout is single-pass
//! and stateless: the same inputs always produce byte-identical markup,
//! and no step depends on measurement feedback from the renderer.

use crate::identity::{avatar_url, IdentityHandle};
use crate::rank::RankTier;
use crate::RenderConfig;
use std::fmt::Write;

/// Logical canvas width of the card
pub const CARD_WIDTH: u32 = 400;

/// Logical canvas height of the card
pub const CARD_HEIGHT: u32 = 600;

/// Watermark string anchored to the bottom of the canvas
pub const WATERMARK: &str = "rugmeter.app";

/// The fully composed result card, constructed fresh per render request
#[derive(Debug, Clone)]
pub struct Card {
    /// Classified rank tier (traits, quote, stat values)
    pub tier: RankTier,
    /// Display title: the enriched title when available, otherwise the
    /// tier's default
    pub title: String,
    /// Trauma percentage in [0, 100]
    pub percentage: u32,
    /// Identity block; `None` omits personalization entirely
    pub identity: Option<CardIdentity>,
}

/// Resolved identity shown in the card header
#[derive(Debug, Clone)]
pub struct CardIdentity {
    pub handle: IdentityHandle,
    pub avatar_url: String,
}

impl Card {
    /// Compose a card from a tier and percentage. A non-empty handle gets
    /// an identity block with its deterministic avatar URL; the anonymous
    /// handle skips personalization.
    pub fn new(tier: RankTier, percentage: u32, handle: IdentityHandle) -> Self {
        let identity = avatar_url(&handle).map(|url| CardIdentity {
            avatar_url: url.into(),
            handle,
        });
        Self {
            title: tier.title.to_string(),
            tier,
            percentage,
            identity,
        }
    }

    /// Apply an enriched title. Empty titles are ignored so a failed
    /// enrichment can never blank the card.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.trim().is_empty() {
            self.title = title;
        }
        self
    }

    /// Drop the identity block (avatar fetch failed or was declined).
    pub fn drop_identity(&mut self) {
        self.identity = None;
    }

    /// Share-intent text for posting the card
    pub fn share_text(&self) -> String {
        format!(
            "I got {} with {}% Crypto Trauma.\n{}\n\nCheck your trauma score at {} \u{1F449}",
            self.title, self.percentage, self.tier.quote, WATERMARK
        )
    }
}

/// Stylesheet for the card document. Canvas tokens are substituted at
/// build time; the palette and block structure are fixed.
const CARD_CSS: &str = r#"
    body {
      margin: 0;
      font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
      background: {{BODY_BACKGROUND}};
      height: {{HEIGHT}}px;
      width: {{WIDTH}}px;
      display: flex;
      flex-direction: column;
      padding: 24px;
      box-sizing: border-box;
      color: white;
      position: relative;
    }

    .profile {
      display: flex;
      align-items: center;
      background: rgba(0, 0, 0, 0.2);
      padding: 12px;
      border-radius: 8px;
      margin-bottom: 24px;
    }

    .profile-image {
      width: 48px;
      height: 48px;
      border-radius: 50%;
      background: rgba(0, 0, 0, 0.2);
      margin-right: 12px;
      object-fit: cover;
    }

    .profile-info {
      display: flex;
      flex-direction: column;
    }

    .username {
      font-size: 16px;
      font-weight: 500;
      color: white;
    }

    .certified {
      font-size: 14px;
      color: rgb(216, 180, 254);
    }

    .title {
      font-size: 32px;
      font-weight: 700;
      text-align: center;
      margin-bottom: 32px;
      background: linear-gradient(to right, #ec4899, #a855f7, #06b6d4);
      -webkit-background-clip: text;
      -webkit-text-fill-color: transparent;
      width: 100%;
      word-break: break-word;
      display: flex;
      align-items: center;
      justify-content: center;
      gap: 8px;
    }

    .title-emoji {
      font-size: 24px;
      -webkit-text-fill-color: initial;
    }

    .gauge {
      width: 140px;
      height: 140px;
      margin: 0 auto 32px;
      position: relative;
    }

    .gauge svg {
      width: 100%;
      height: 100%;
      transform: rotate(-90deg);
    }

    .gauge-center {
      position: absolute;
      inset: 0;
      display: flex;
      flex-direction: column;
      align-items: center;
      justify-content: center;
    }

    .score {
      font-size: 36px;
      font-weight: 700;
    }

    .trauma-text {
      font-size: 14px;
      color: rgb(216, 180, 254);
      text-transform: uppercase;
      letter-spacing: 0.05em;
    }

    .traits-container {
      width: 100%;
      margin-bottom: 24px;
    }

    .traits-title {
      font-size: 14px;
      color: rgb(216, 180, 254);
      margin-bottom: 12px;
      text-transform: uppercase;
      letter-spacing: 0.05em;
    }

    .traits-list {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .trait {
      padding: 6px 14px;
      background: rgba(255, 255, 255, 0.1);
      border-radius: 9999px;
      font-size: 13px;
      font-weight: 500;
      white-space: nowrap;
    }

    .stats-container {
      width: 100%;
      margin-bottom: 24px;
    }

    .stat-row {
      margin-bottom: 12px;
    }

    .stat-header {
      display: flex;
      justify-content: space-between;
      margin-bottom: 4px;
      font-size: 14px;
    }

    .stat-label {
      color: rgb(216, 180, 254);
    }

    .stat-value {
      color: white;
    }

    .stat-bar {
      height: 8px;
      border-radius: 4px;
      background: rgba(0, 0, 0, 0.2);
      overflow: hidden;
    }

    .stat-fill {
      height: 100%;
      border-radius: 4px;
    }

    .stat-fill.coping {
      background: linear-gradient(to right, #22c55e, #10b981);
    }

    .stat-fill.resistance {
      background: linear-gradient(to right, #3b82f6, #06b6d4);
    }

    .stat-fill.addiction {
      background: linear-gradient(to right, #ec4899, #f43f5e);
    }

    .quote {
      font-size: 15px;
      color: rgb(216, 180, 254);
      text-align: center;
      font-style: italic;
      padding: 0 16px;
      line-height: 1.5;
      font-weight: 500;
    }

    .watermark {
      font-size: 12px;
      color: rgba(216, 180, 254, 0.5);
      position: absolute;
      bottom: 16px;
      left: 50%;
      transform: translateX(-50%);
      font-weight: 500;
    }
"#;

/// Content-ready signal: `window.__cardReady` flips once webfonts and all
/// images have settled (loaded or errored). The render pipeline polls this
/// flag instead of relying on a network-idle heuristic.
const READY_SCRIPT: &str = r#"
    window.__cardReady = false;
    window.addEventListener('load', function () {
      var fonts = document.fonts ? document.fonts.ready : Promise.resolve();
      var images = Array.prototype.map.call(document.images, function (img) {
        return img.complete ? Promise.resolve() : new Promise(function (settle) {
          img.addEventListener('load', settle);
          img.addEventListener('error', settle);
        });
      });
      Promise.all([fonts].concat(images)).then(function () {
        window.__cardReady = true;
      });
    });
"#;

const BODY_GRADIENT: &str =
    "linear-gradient(135deg, rgb(88, 28, 135) 0%, rgb(30, 27, 75) 50%, rgb(134, 25, 143) 100%)";

/// Build the complete card document for the renderer.
///
/// Deterministic given fully resolved inputs (post-enrichment): identical
/// cards produce byte-identical markup.
pub fn build_document(card: &Card, config: &RenderConfig) -> String {
    let css = CARD_CSS
        .replace("{{WIDTH}}", &config.viewport.width.to_string())
        .replace("{{HEIGHT}}", &config.viewport.height.to_string())
        .replace(
            "{{BODY_BACKGROUND}}",
            if config.transparent { "transparent" } else { BODY_GRADIENT },
        );

    let mut html = String::with_capacity(8192);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<link href=\"https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap\" rel=\"stylesheet\">\n",
    );
    let _ = write!(html, "<style>{}</style>\n", css);
    let _ = write!(html, "<script>{}</script>\n", READY_SCRIPT);
    html.push_str("</head>\n<body>\n");

    if let Some(identity) = &card.identity {
        let _ = write!(
            html,
            concat!(
                "<div class=\"profile\">\n",
                "  <img class=\"profile-image\" src=\"{avatar}\" alt=\"\">\n",
                "  <div class=\"profile-info\">\n",
                "    <div class=\"username\">@{handle}</div>\n",
                "    <div class=\"certified\">Certified Degen</div>\n",
                "  </div>\n",
                "</div>\n",
            ),
            avatar = escape(&identity.avatar_url),
            handle = escape(identity.handle.as_str()),
        );
    }

    let (emoji, phrase) = split_title(&card.title);
    html.push_str("<div class=\"title\">");
    if !emoji.is_empty() {
        let _ = write!(html, "<span class=\"title-emoji\">{}</span>", escape(emoji));
    }
    let _ = write!(html, "{}</div>\n", escape(phrase));

    push_gauge(&mut html, card.percentage);

    html.push_str("<div class=\"traits-container\">\n<div class=\"traits-title\">Degen Traits:</div>\n<div class=\"traits-list\">");
    for trait_name in &card.tier.traits {
        let _ = write!(html, "<div class=\"trait\">{}</div>", escape(trait_name));
    }
    html.push_str("</div>\n</div>\n");

    html.push_str("<div class=\"stats-container\">\n");
    push_stat_bar(&mut html, "Coping Level", "coping", card.tier.coping_level);
    push_stat_bar(&mut html, "Rug Resistance", "resistance", card.tier.rug_resistance);
    push_stat_bar(&mut html, "Hopium Addiction", "addiction", card.tier.hopium_addiction);
    html.push_str("</div>\n");

    let _ = write!(html, "<div class=\"quote\">\"{}\"</div>\n", escape(card.tier.quote));
    let _ = write!(html, "<div class=\"watermark\">{}</div>\n", WATERMARK);
    html.push_str("</body>\n</html>\n");
    html
}

/// Circular percentage gauge: a stroked arc covering `pct` of the ring
/// (0-100 maps linearly to 0-360 degrees via the dash pattern on a
/// circumference-100 path), percentage numeral centered inside.
fn push_gauge(html: &mut String, pct: u32) {
    let pct = pct.min(100);
    let _ = write!(
        html,
        concat!(
            "<div class=\"gauge\">\n",
            "<svg viewBox=\"0 0 36 36\">\n",
            "  <path d=\"M18 2.0845 a 15.9155 15.9155 0 0 1 0 31.831 a 15.9155 15.9155 0 0 1 0 -31.831\"\n",
            "        fill=\"none\" stroke=\"rgba(255, 255, 255, 0.1)\" stroke-width=\"3\"/>\n",
            "  <path d=\"M18 2.0845 a 15.9155 15.9155 0 0 1 0 31.831 a 15.9155 15.9155 0 0 1 0 -31.831\"\n",
            "        fill=\"none\" stroke=\"url(#gauge-gradient)\" stroke-width=\"3\" stroke-dasharray=\"{pct}, 100\"/>\n",
            "  <defs>\n",
            "    <linearGradient id=\"gauge-gradient\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"0%\">\n",
            "      <stop offset=\"0%\" stop-color=\"#ec4899\"/>\n",
            "      <stop offset=\"50%\" stop-color=\"#a855f7\"/>\n",
            "      <stop offset=\"100%\" stop-color=\"#06b6d4\"/>\n",
            "    </linearGradient>\n",
            "  </defs>\n",
            "</svg>\n",
            "<div class=\"gauge-center\">\n",
            "  <div class=\"score\">{pct}%</div>\n",
            "  <div class=\"trauma-text\">Trauma</div>\n",
            "</div>\n",
            "</div>\n",
        ),
        pct = pct,
    );
}

/// Labeled proportional bar; filled width is linear in the 0-100 value.
fn push_stat_bar(html: &mut String, label: &str, kind: &str, value: u32) {
    let value = value.min(100);
    let _ = write!(
        html,
        concat!(
            "<div class=\"stat-row\">\n",
            "  <div class=\"stat-header\">\n",
            "    <div class=\"stat-label\">{label}</div>\n",
            "    <div class=\"stat-value\">{value}%</div>\n",
            "  </div>\n",
            "  <div class=\"stat-bar\">\n",
            "    <div class=\"stat-fill {kind}\" style=\"width: {value}%\"></div>\n",
            "  </div>\n",
            "</div>\n",
        ),
        label = label,
        value = value,
        kind = kind,
    );
}

/// Split a title into its leading emoji symbol and the remaining phrase.
/// Titles without a space render entirely through the gradient fill.
fn split_title(title: &str) -> (&str, &str) {
    match title.split_once(' ') {
        Some((first, rest)) if !first.chars().any(|c| c.is_ascii_alphanumeric()) => (first, rest),
        _ => ("", title),
    }
}

/// Minimal HTML escaping for interpolated text
fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
