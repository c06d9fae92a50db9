//! Smoke tests that require a local Chrome installation
#![cfg(feature = "chrome")]

use rugmeter::{build_document, classify, render_card_chrome, Card, IdentityHandle, RenderConfig};

#[test]
#[ignore] // Requires Chrome to be installed
fn test_render_card_to_png() {
    let card = Card::new(classify(35).clone(), 70, IdentityHandle::anonymous());
    let config = RenderConfig::default();

    let png = render_card_chrome(&config, &card).expect("failed to render card");

    assert!(png.len() > 100, "PNG data seems too small");
    // PNG files start with these magic bytes
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_render_transparent_card() {
    let card = Card::new(classify(0).clone(), 0, IdentityHandle::anonymous());
    let config = RenderConfig {
        transparent: true,
        ..Default::default()
    };

    let png = render_card_chrome(&config, &card).expect("failed to render card");
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_document_reaches_content_stable() {
    use rugmeter::{pipeline, RenderEngine};

    let card = Card::new(classify(22).clone(), 44, IdentityHandle::anonymous());
    let config = RenderConfig {
        timeout_ms: 10000,
        ..Default::default()
    };
    let html = build_document(&card, &config);

    let png = pipeline::render_document::<rugmeter::chrome::ChromeEngine>(&config, &html)
        .expect("card should reach content-stable and capture");
    assert!(!png.is_empty());

    // The engine trait is also usable directly for one-off captures.
    let mut engine = rugmeter::chrome::ChromeEngine::new(&config).expect("engine");
    engine.load_document(&html).expect("load");
    engine.wait_ready().expect("ready");
    let second = engine.capture().expect("capture");
    engine.close().expect("close");
    assert_eq!(&second[0..8], b"\x89PNG\r\n\x1a\n");
}
