//! Command-line interface definitions for Poultry Digest.
//!
//! Every option has a default or is optional, so the scheduler can invoke the
//! binary with no arguments. API keys are normally supplied through the
//! environment.

use clap::{Parser, ValueEnum};

/// Which edition of the digest to publish.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Coin flip between a paper and a textbook topic; falls back to a topic
    /// when PubMed returns nothing.
    Strategist,
    /// Papers only; publishes nothing when PubMed returns nothing.
    Digest,
}

/// Command-line arguments for the Poultry Digest application.
///
/// # Examples
///
/// ```sh
/// # Daily run from the blog root
/// GEMINI_API_KEY=... PEXELS_API_KEY=... poultry_digest
///
/// # Papers-only edition into another directory, reproducible branch choice
/// poultry_digest --variant digest --posts-dir ./site/_posts --seed 7
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory the post is written to. Must already exist.
    #[arg(short, long, default_value = "_posts")]
    pub posts_dir: String,

    /// Edition to publish
    #[arg(long, value_enum, default_value_t = Variant::Strategist)]
    pub variant: Variant,

    /// Gemini model identifier
    #[arg(short, long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    pub model: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Pexels API key
    #[arg(long, env = "PEXELS_API_KEY", hide_env_values = true)]
    pub pexels_api_key: Option<String>,

    /// Tool name reported to NCBI E-utilities
    #[arg(long, default_value = "BioStrategist")]
    pub pubmed_tool: String,

    /// Contact email reported to NCBI E-utilities
    #[arg(long, env = "PUBMED_EMAIL")]
    pub pubmed_email: Option<String>,

    /// Seed for the branch and topic choice (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}
