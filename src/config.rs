//! Run configuration.
//!
//! Built once from the parsed [`Cli`] in `main` and handed to each component,
//! so nothing below `main` reads the environment.

use crate::cli::{Cli, Variant};
use std::fmt;
use std::path::PathBuf;

/// Settings for one digest run.
#[derive(Clone)]
pub struct Config {
    pub posts_dir: PathBuf,
    pub variant: Variant,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
    pub pexels_api_key: Option<String>,
    pub pubmed_tool: String,
    pub pubmed_email: Option<String>,
    pub seed: Option<u64>,
}

impl Config {
    /// Image search term for a research post in this variant.
    pub fn research_image_query(&self) -> &'static str {
        match self.variant {
            Variant::Strategist => "laboratory",
            Variant::Digest => "poultry farm",
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            posts_dir: PathBuf::from(cli.posts_dir),
            variant: cli.variant,
            gemini_model: cli.model,
            gemini_api_key: cli.gemini_api_key.filter(|k| !k.trim().is_empty()),
            pexels_api_key: cli.pexels_api_key.filter(|k| !k.trim().is_empty()),
            pubmed_tool: cli.pubmed_tool,
            pubmed_email: cli.pubmed_email.filter(|e| !e.trim().is_empty()),
            seed: cli.seed,
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("posts_dir", &self.posts_dir)
            .field("variant", &self.variant)
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<set>"))
            .field("pexels_api_key", &self.pexels_api_key.as_ref().map(|_| "<set>"))
            .field("pubmed_tool", &self.pubmed_tool)
            .field("pubmed_email", &self.pubmed_email)
            .field("seed", &self.seed)
            .finish()
    }
}
