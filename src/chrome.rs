//! Headless-Chrome render backend
//!
//! Drives an isolated Chrome instance over the DevTools protocol (via the
//! `headless_chrome` crate). Each engine owns its own browser process and
//! tab for exactly one render call; `close` drops both so the child
//! process terminates promptly.

use crate::{Error, RenderConfig, RenderEngine, Result};
use base64::Engine as Base64Engine;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Interval between readiness polls while waiting for content-stable
const READY_POLL_MS: u64 = 50;

/// Chrome-backed implementation of [`RenderEngine`]
pub struct ChromeEngine {
    browser: Browser,
    tab: Arc<Tab>,
    config: RenderConfig,
}

impl RenderEngine for ChromeEngine {
    fn new(config: &RenderConfig) -> Result<Self> {
        // The window is fixed to the card canvas before any content loads;
        // the device-scale factor is applied at capture time via the clip.
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::Unavailable(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Unavailable(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Unavailable(format!("Failed to create tab: {}", e)))?;

        if config.transparent {
            // Chrome paints a white default background; override it with a
            // fully transparent one so the capture keeps its alpha channel.
            use headless_chrome::protocol::cdp::Emulation::SetDefaultBackgroundColorOverride;
            use headless_chrome::protocol::cdp::DOM::RGBA;

            tab.call_method(SetDefaultBackgroundColorOverride {
                color: Some(RGBA {
                    r: 0,
                    g: 0,
                    b: 0,
                    a: Some(0.0),
                }),
            })
            .map_err(|e| Error::Unavailable(format!("Failed to set background override: {}", e)))?;
        }

        Ok(Self {
            browser,
            tab,
            config: config.clone(),
        })
    }

    fn load_document(&mut self, html: &str) -> Result<()> {
        // Embed the document in a data URL so no web server is needed;
        // base64 keeps the markup safe for URL transport.
        let b64 = base64::engine::general_purpose::STANDARD.encode(html.as_bytes());
        let url = format!("data:text/html;base64,{}", b64);

        self.tab
            .navigate_to(&url)
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        Ok(())
    }

    fn wait_ready(&mut self) -> Result<()> {
        // Poll the document's explicit readiness flag rather than guessing
        // from network idleness; fonts and images settle before capture.
        let deadline = Instant::now() + Duration::from_millis(self.config.timeout_ms);

        loop {
            let eval = self
                .tab
                .evaluate("window.__cardReady === true", false)
                .map_err(|e| Error::LoadError(format!("Readiness check failed: {}", e)))?;

            if eval.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                debug!("Card document reached content-stable");
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(Error::LoadError(format!(
                    "Content not stable after {}ms",
                    self.config.timeout_ms
                )));
            }

            std::thread::sleep(Duration::from_millis(READY_POLL_MS));
        }
    }

    fn capture(&mut self) -> Result<Vec<u8>> {
        // Clip to the logical canvas; the clip scale produces the crisp
        // high-density raster (logical size x device-scale factor).
        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: self.config.viewport.width as f64,
            height: self.config.viewport.height as f64,
            scale: self.config.device_scale_factor,
        };

        let png = self
            .tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                None,
                Some(clip),
                true,
            )
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))?;

        if png.is_empty() {
            return Err(Error::RenderError("Capture returned no bytes".into()));
        }

        Ok(png)
    }

    fn close(self) -> Result<()> {
        // Dropping the browser terminates the child Chrome process.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}
