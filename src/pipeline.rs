//! Render pipeline driver
//!
//! Drives one render call through its full lifecycle: acquire an engine,
//! load the card document, wait for content-stable, capture one snapshot,
//! and release the engine. Release is unconditional once acquisition
//! succeeded; the engine is a heavyweight resource (its own process) and
//! leaking it degrades the whole service.

use crate::{Error, RenderConfig, RenderEngine, Result};
use log::{debug, warn};

/// Rasterize a card document into PNG bytes with a fresh engine instance.
///
/// Acquisition failure surfaces as [`Error::Unavailable`] and no engine is
/// held. After acquisition the call runs to completion; load and capture
/// failures are returned to the caller only after the engine has been
/// released. No partial image is ever returned.
pub fn render_document<E: RenderEngine>(config: &RenderConfig, html: &str) -> Result<Vec<u8>> {
    debug!("Acquiring render engine");
    let mut engine = match E::new(config) {
        Ok(engine) => engine,
        Err(e @ Error::Unavailable(_)) => return Err(e),
        // Backends report acquisition failures as Unavailable; anything
        // else from new() still means the engine never started.
        Err(other) => return Err(Error::Unavailable(other.to_string())),
    };

    let outcome = drive(&mut engine, html);

    debug!("Releasing render engine");
    if let Err(e) = engine.close() {
        // The snapshot outcome is already decided; a noisy teardown does
        // not invalidate it.
        warn!("Engine release reported an error: {}", e);
    }

    outcome
}

fn drive<E: RenderEngine>(engine: &mut E, html: &str) -> Result<Vec<u8>> {
    debug!("Loading card document");
    engine.load_document(html)?;

    engine.wait_ready()?;
    debug!("Card content stable, capturing");

    let png = engine.capture()?;
    debug!("Captured {} bytes", png.len());
    Ok(png)
}
