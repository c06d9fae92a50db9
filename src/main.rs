use anyhow::{bail, Context};
use clap::Parser;
use rugmeter::{tally, EnrichConfig, IdentityHandle, RenderConfig, Session};
use std::path::PathBuf;

/// Generate a trauma result card as a PNG
#[derive(Parser, Debug)]
#[command(name = "rugmeter", version, about)]
struct Args {
    /// Comma-separated answer point values, one per question
    #[arg(long, value_delimiter = ',', conflicts_with = "score")]
    answers: Option<Vec<u32>>,

    /// Raw trauma score, as an alternative to --answers
    #[arg(long)]
    score: Option<u32>,

    /// Profile handle for the identity block (leading @ optional)
    #[arg(long, default_value = "")]
    username: String,

    /// Output path for the rendered card
    #[arg(long, default_value = "trauma-card.png")]
    out: PathBuf,

    /// Capture with a transparent background
    #[arg(long)]
    transparent: bool,

    /// Title-enrichment endpoint; omit to keep the default tier title
    #[arg(long)]
    enrich_endpoint: Option<String>,

    /// Content-stable deadline in milliseconds
    #[arg(long, default_value_t = 15000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let score = match (&args.answers, args.score) {
        (Some(answers), _) => tally(answers),
        (None, Some(score)) => score,
        (None, None) => bail!("provide --answers or --score"),
    };

    let enrich = args.enrich_endpoint.is_some();
    let enrich_config = EnrichConfig {
        endpoint: args
            .enrich_endpoint
            .clone()
            .unwrap_or_else(|| EnrichConfig::default().endpoint),
        api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
        ..EnrichConfig::default()
    };

    let render_config = RenderConfig {
        transparent: args.transparent,
        timeout_ms: args.timeout_ms,
        ..RenderConfig::default()
    };

    let session = Session::new(enrich_config, render_config)?;
    let handle = IdentityHandle::parse(&args.username);

    let card = if enrich {
        session.export_card(score, &handle).await
    } else {
        session.result_card(score, &handle)
    };

    #[cfg(feature = "chrome")]
    let png = match session.export_png_chrome(&card).await {
        Ok(png) => png,
        Err(e) if e.is_unavailable() => {
            bail!("card generation unavailable (is Chrome installed?): {}", e)
        }
        Err(e) => bail!("card generation failed: {}", e),
    };

    #[cfg(not(feature = "chrome"))]
    let png: Vec<u8> = bail!("built without the chrome feature; no render backend available");

    std::fs::write(&args.out, &png)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    println!("Wrote {} ({} bytes)", args.out.display(), png.len());
    println!("\n{}", card.share_text());
    Ok(())
}
