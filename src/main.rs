//! # Poultry Digest
//!
//! Publishes one poultry-physiology post per run to a Jekyll `_posts/`
//! directory. Meant to be invoked once a day by a scheduler.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... PEXELS_API_KEY=... poultry_digest
//! ```
//!
//! ## Pipeline
//!
//! 1. **Selection**: coin flips pick a PubMed paper (current year or classic
//!    1990–2012 literature) or a textbook topic
//! 2. **Research**: PubMed E-utilities returns at most one paper
//! 3. **Summarizing**: Gemini writes the post body from a fixed prompt
//! 4. **Image**: Pexels supplies a header image, or a fixed default
//! 5. **Output**: the post is written with YAML front matter
//!
//! Everything runs in sequence, once. A failed PubMed or Gemini call or a
//! failed write ends the run with a non-zero exit status.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod config;
mod images;
mod models;
mod outputs;
mod pipeline;
mod prompts;
mod pubmed;
mod selector;
mod utils;

use api::GeminiClient;
use cli::Cli;
use config::Config;
use images::PexelsClient;
use pipeline::{Pipeline, RunOutcome};
use pubmed::PubMedClient;
use selector::RandomSelector;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("poultry_digest starting up");

    let config = Config::from(Cli::parse());
    debug!(?config, "Loaded configuration");

    let http = reqwest::Client::builder()
        .user_agent(concat!("poultry_digest/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let literature = PubMedClient::new(
        http.clone(),
        config.pubmed_tool.clone(),
        config.pubmed_email.clone(),
    );
    let generator = GeminiClient::new(
        http.clone(),
        config.gemini_model.clone(),
        config.gemini_api_key.clone(),
    );
    let images = PexelsClient::new(http, config.pexels_api_key.clone());

    let pipeline = Pipeline {
        config: &config,
        selector: RandomSelector::from_seed(config.seed),
        literature: &literature,
        generator: &generator,
        images: &images,
    };

    let today = Local::now().date_naive();
    let outcome = match pipeline.run(today).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, elapsed_ms = start_time.elapsed().as_millis(), "Run failed");
            return Err(e);
        }
    };

    match outcome {
        RunOutcome::Published {
            path,
            mode,
            title,
            image_fallback,
        } => info!(
            path = %path.display(),
            mode = mode.as_str(),
            %title,
            image_fallback,
            "Published post"
        ),
        RunOutcome::Skipped => info!("No post published"),
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
