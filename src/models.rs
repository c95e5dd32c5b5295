//! Data models for a single digest run.
//!
//! - [`ResearchPaper`]: the top PubMed match for the research query
//! - [`PostMode`] / [`ResearchEra`]: the branches the selector chooses between
//! - [`GeneratedPost`]: the finished post, rendered once and written once
//! - [`FrontMatter`]: the YAML header Jekyll reads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Search term shared by both research queries.
const RESEARCH_TERM: &str = "poultry physiology";

/// Textbook topics used when the run does not (or cannot) use a paper.
pub const TEXTBOOK_TOPICS: [&str; 7] = [
    "Medullary Bone and Calcium Mobilization in High-Production Layers",
    "The Ovarian Hierarchy: Selection and Maturation of Follicles",
    "Avian Thermoregulation: Evaporative Cooling and Heat Stress Biology",
    "Gut-Associated Lymphoid Tissue (GALT) and Avian Immunity",
    "Liver Metabolism: Lipogenesis and the Logistics of Yolk Formation",
    "Gizzard Function and Mechanical Digestion Efficiency",
    "The Endocrine Control of the Ovulatory Cycle",
];

/// A paper returned by the literature search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchPaper {
    /// PubMed identifier.
    pub pmid: String,
    /// Article title with inline markup flattened.
    pub title: String,
    /// Abstract sections joined by newlines. Empty when PubMed has no abstract.
    pub abstract_text: String,
}

/// Which kind of post a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostMode {
    Research,
    Textbook,
}

impl PostMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostMode::Research => "research",
            PostMode::Textbook => "textbook",
        }
    }
}

/// Which slice of the literature the research query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchEra {
    /// Papers published in the current calendar year.
    Modern,
    /// Foundational papers published 1990–2012.
    Classic,
}

impl ResearchEra {
    /// Build the PubMed query term for this era.
    ///
    /// `year` is only used by [`ResearchEra::Modern`].
    pub fn query(&self, year: i32) -> String {
        match self {
            ResearchEra::Modern => {
                format!("{RESEARCH_TERM}[Title/Abstract] AND {year}[Date - Publication]")
            }
            ResearchEra::Classic => {
                format!("{RESEARCH_TERM}[Title] AND (1990[PDAT] : 2012[PDAT])")
            }
        }
    }

    /// Label used in the prompt to describe the source.
    pub fn label(&self) -> &'static str {
        match self {
            ResearchEra::Modern => "Modern Research Digest",
            ResearchEra::Classic => "Classic Scientific Foundation",
        }
    }
}

/// A post ready to be rendered.
#[derive(Debug, Clone)]
pub struct GeneratedPost {
    pub title: String,
    pub date: NaiveDate,
    pub image_url: String,
    /// Emitted as `category:` when present.
    pub category: Option<PostMode>,
    pub body: String,
}

/// YAML header of a Jekyll post.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrontMatter {
    pub layout: String,
    pub title: String,
    pub date: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PostMode>,
}

impl From<&GeneratedPost> for FrontMatter {
    fn from(post: &GeneratedPost) -> Self {
        FrontMatter {
            layout: "post".to_string(),
            title: post.title.clone(),
            date: post.date.format("%Y-%m-%d").to_string(),
            image: post.image_url.clone(),
            category: post.category,
        }
    }
}
