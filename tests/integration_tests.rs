//! End-to-end tests over the card pipeline with fake collaborators

use rugmeter::{
    build_document, classify, render_document, tally, trauma_percentage, Card, EnrichConfig,
    Error, IdentityHandle, RenderConfig, RenderEngine, Result, Session,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tiny_http::{Response, Server};

static ACQUIRED: AtomicUsize = AtomicUsize::new(0);
static RELEASED: AtomicUsize = AtomicUsize::new(0);

/// Happy-path engine that fakes a PNG capture.
struct StubEngine;

impl RenderEngine for StubEngine {
    fn new(_config: &RenderConfig) -> Result<Self> {
        Ok(Self)
    }
    fn load_document(&mut self, html: &str) -> Result<()> {
        assert!(html.contains("__cardReady"), "document must carry the readiness signal");
        Ok(())
    }
    fn wait_ready(&mut self) -> Result<()> {
        Ok(())
    }
    fn capture(&mut self) -> Result<Vec<u8>> {
        Ok(b"\x89PNG\r\n\x1a\nstub".to_vec())
    }
    fn close(self) -> Result<()> {
        Ok(())
    }
}

/// StubEngine with lifecycle counters; used only by the pairing test so
/// parallel tests cannot skew the deltas.
struct CountedEngine;

impl RenderEngine for CountedEngine {
    fn new(_config: &RenderConfig) -> Result<Self> {
        ACQUIRED.fetch_add(1, Ordering::SeqCst);
        Ok(Self)
    }
    fn load_document(&mut self, _html: &str) -> Result<()> {
        Ok(())
    }
    fn wait_ready(&mut self) -> Result<()> {
        Ok(())
    }
    fn capture(&mut self) -> Result<Vec<u8>> {
        Ok(b"\x89PNG\r\n\x1a\nstub".to_vec())
    }
    fn close(self) -> Result<()> {
        RELEASED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Engine whose process can never start.
struct UnavailableEngine;

impl RenderEngine for UnavailableEngine {
    fn new(_config: &RenderConfig) -> Result<Self> {
        Err(Error::Unavailable("browser missing".into()))
    }
    fn load_document(&mut self, _html: &str) -> Result<()> {
        unreachable!()
    }
    fn wait_ready(&mut self) -> Result<()> {
        unreachable!()
    }
    fn capture(&mut self) -> Result<Vec<u8>> {
        unreachable!()
    }
    fn close(self) -> Result<()> {
        unreachable!()
    }
}

/// Engine that acquires fine but fails at the capture step.
struct BrokenCaptureEngine;

impl RenderEngine for BrokenCaptureEngine {
    fn new(_config: &RenderConfig) -> Result<Self> {
        ACQUIRED.fetch_add(1, Ordering::SeqCst);
        Ok(Self)
    }
    fn load_document(&mut self, _html: &str) -> Result<()> {
        Ok(())
    }
    fn wait_ready(&mut self) -> Result<()> {
        Ok(())
    }
    fn capture(&mut self) -> Result<Vec<u8>> {
        Err(Error::RenderError("surface lost".into()))
    }
    fn close(self) -> Result<()> {
        RELEASED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fake enrichment collaborator; returns the endpoint and a hit counter.
fn spawn_collaborator(status: u16, body: &'static str, delay_ms: u64) -> (String, Arc<AtomicUsize>) {
    let server = Server::http("127.0.0.1:0").expect("failed to bind test server");
    let port = server.server_addr().to_ip().expect("no ip addr").port();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            hits_clone.fetch_add(1, Ordering::SeqCst);
            if delay_ms > 0 {
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
            }
            let _ = request.respond(Response::from_string(body).with_status_code(status));
        }
    });

    (format!("http://127.0.0.1:{}/v1/chat/completions", port), hits)
}

fn session_with(endpoint: String, timeout_ms: u64) -> Session {
    let mut session = Session::new(
        EnrichConfig {
            endpoint,
            api_key: String::new(),
            model: "test-model".to_string(),
            timeout_ms,
        },
        RenderConfig::default(),
    )
    .expect("session");
    // Keep tests off the real avatar service.
    session.set_avatar_service(url::Url::parse("http://127.0.0.1:1").expect("url"));
    session
}

const TITLE_BODY: &str = r#"{"choices":[{"message":{"content":"🔥 Certified Rug Magnet"}}]}"#;

#[test]
fn scenario_top_band_score_maps_to_top_tier() {
    // Answers land exactly on the top band's lower bound.
    let score = tally(&[10, 10, 10, 9, 1]);
    assert_eq!(score, 40);
    assert_eq!(classify(score).title, classify(u32::MAX).title);
    assert_eq!(trauma_percentage(score), 80);

    // At or above the maximum attainable score the gauge saturates.
    assert_eq!(trauma_percentage(50), 100);
    assert_eq!(trauma_percentage(60), 100);
}

#[test]
fn scenario_zero_score_still_renders() {
    let card = Card::new(classify(0).clone(), trauma_percentage(0), IdentityHandle::anonymous());
    assert_eq!(card.percentage, 0);
    assert_eq!(card.title, classify(0).title);

    let html = build_document(&card, &RenderConfig::default());
    let png = render_document::<StubEngine>(&RenderConfig::default(), &html)
        .expect("empty personalization is a valid card");
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn scenario_enrichment_timeout_falls_back_and_renders() {
    let (endpoint, _hits) = spawn_collaborator(200, TITLE_BODY, 500);
    let session = session_with(endpoint, 50);

    let card = session.export_card(35, &IdentityHandle::parse("@slow_degen")).await;
    assert_eq!(card.title, classify(35).title, "timeout must fall back to the default title");
    assert!(session.cache().is_empty());

    let png = session.export_png::<StubEngine>(&card).await.expect("render succeeds");
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn scenario_acquisition_failure_returns_unavailable() {
    let session = session_with("http://127.0.0.1:1/".to_string(), 100);
    let card = session.result_card(35, &IdentityHandle::anonymous());

    let err = session
        .export_png::<UnavailableEngine>(&card)
        .await
        .expect_err("no engine, no image");
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn enrichment_is_cached_across_export_calls() {
    let (endpoint, hits) = spawn_collaborator(200, TITLE_BODY, 0);
    let session = session_with(endpoint, 2000);
    let handle = IdentityHandle::parse("@degen_dave");

    let first = session.export_card(35, &handle).await;
    let second = session.export_card(35, &handle).await;

    assert_eq!(first.title, "🔥 Certified Rug Magnet");
    assert_eq!(second.title, first.title);
    assert_eq!(hits.load(Ordering::SeqCst), 1, "second call must hit the cache");

    // The on-screen card picks up the cached enrichment too.
    assert_eq!(session.result_card(35, &handle).title, first.title);

    session.clear();
    assert!(session.cache().is_empty());
}

#[test]
fn engine_lifecycle_counters_stay_paired() {
    let acquired_before = ACQUIRED.load(Ordering::SeqCst);
    let released_before = RELEASED.load(Ordering::SeqCst);

    let config = RenderConfig::default();
    let card = Card::new(classify(22).clone(), 44, IdentityHandle::anonymous());
    let html = build_document(&card, &config);

    let ok = render_document::<CountedEngine>(&config, &html);
    assert!(ok.is_ok());

    let broken = render_document::<BrokenCaptureEngine>(&config, &html);
    assert!(matches!(broken, Err(Error::RenderError(_))));

    let missing = render_document::<UnavailableEngine>(&config, &html);
    assert!(missing.is_err());

    let acquired = ACQUIRED.load(Ordering::SeqCst) - acquired_before;
    let released = RELEASED.load(Ordering::SeqCst) - released_before;
    assert_eq!(acquired, 2);
    assert_eq!(acquired, released, "acquisitions and releases must pair on every path");
}
