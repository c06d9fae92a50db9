//! Optional profile identity and the avatar collaborator

use log::warn;
use url::Url;

/// Avatar service root; avatar URLs derive deterministically as
/// `<service>/<platform>/<handle>`.
pub const AVATAR_SERVICE: &str = "https://unavatar.io";

/// Platform segment of the avatar URL
pub const AVATAR_PLATFORM: &str = "twitter";

/// An external profile handle used only for the card's avatar and label.
///
/// Not validated beyond trimming whitespace and a leading `@` marker; an
/// empty handle means "skip personalization".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityHandle(String);

impl IdentityHandle {
    /// Parse a raw handle, trimming whitespace and one leading `@`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);
        Self(trimmed.to_string())
    }

    /// The empty handle: personalization is skipped entirely.
    pub fn anonymous() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derive the deterministic avatar URL for a handle against a service
/// base, or `None` for the anonymous handle.
pub fn avatar_url_in(base: &Url, handle: &IdentityHandle) -> Option<Url> {
    if handle.is_empty() {
        return None;
    }
    base.join(&format!("{}/{}", AVATAR_PLATFORM, handle.as_str())).ok()
}

/// Deterministic avatar URL for a handle on the default service.
pub fn avatar_url(handle: &IdentityHandle) -> Option<Url> {
    let base = Url::parse(AVATAR_SERVICE).ok()?;
    avatar_url_in(&base, handle)
}

/// Probe an avatar URL.
///
/// True when the service answers 2xx. Failures degrade to omitting the
/// identity block and never block the rest of the pipeline.
pub async fn probe_avatar(client: &reqwest::Client, url: &Url) -> bool {
    match client.get(url.clone()).send().await {
        Ok(resp) if resp.status().is_success() => true,
        Ok(resp) => {
            warn!("Avatar probe of {} returned {}", url, resp.status());
            false
        }
        Err(e) => {
            warn!("Avatar probe of {} failed: {}", url, e);
            false
        }
    }
}
