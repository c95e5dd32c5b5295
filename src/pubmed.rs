//! PubMed literature search through NCBI E-utilities.
//!
//! A lookup is two requests:
//!
//! 1. `esearch` resolves the query term to at most one PMID
//! 2. `efetch` downloads that record as PubMed XML, from which the title and
//!    abstract are extracted
//!
//! An empty `idlist` is a normal outcome and is reported as `Ok(None)`.

use crate::models::ResearchPaper;
use crate::utils::truncate_for_log;
use itertools::Itertools;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use serde::Deserialize;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use url::Url;

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Finds the single best paper for a query.
pub trait LiteratureSearch {
    /// Search for `query` and return the top-ranked paper.
    ///
    /// # Arguments
    ///
    /// * `query` - A PubMed query term, field tags and date filters included
    ///
    /// # Returns
    ///
    /// The single best match, or `None` when the search matched nothing.
    ///
    /// # Errors
    ///
    /// Network failures, non-2xx responses and unparseable payloads are
    /// returned as errors; nothing is retried.
    async fn first_match(&self, query: &str) -> Result<Option<ResearchPaper>, Box<dyn Error>>;
}

/// E-utilities client.
#[derive(Debug, Clone)]
pub struct PubMedClient {
    http: reqwest::Client,
    base: String,
    tool: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

impl PubMedClient {
    pub fn new(http: reqwest::Client, tool: impl Into<String>, email: Option<String>) -> Self {
        Self {
            http,
            base: EUTILS_BASE.to_string(),
            tool: tool.into(),
            email,
        }
    }

    fn endpoint(&self, name: &str, params: &[(&str, &str)]) -> Result<Url, Box<dyn Error>> {
        let mut url = Url::parse(&format!("{}/{}", self.base.trim_end_matches('/'), name))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("db", "pubmed");
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("tool", &self.tool);
            if let Some(email) = &self.email {
                pairs.append_pair("email", email);
            }
        }
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String, Box<dyn Error>> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            error!(%status, body = %truncate_for_log(&body, 300), "E-utilities request failed");
            return Err(format!("PubMed request failed: HTTP {status}").into());
        }
        Ok(body)
    }

    #[instrument(level = "info", skip(self))]
    async fn search_ids(&self, query: &str, max_results: usize) -> Result<Vec<String>, Box<dyn Error>> {
        let retmax = max_results.to_string();
        let url = self.endpoint(
            "esearch.fcgi",
            &[("term", query), ("retmax", &retmax), ("retmode", "json")],
        )?;
        let body = self.get_text(url).await?;
        let ids = parse_esearch_ids(&body)?;
        info!(count = ids.len(), "PubMed search finished");
        Ok(ids)
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch_paper(&self, pmid: &str) -> Result<Option<ResearchPaper>, Box<dyn Error>> {
        let url = self.endpoint("efetch.fcgi", &[("id", pmid), ("retmode", "xml")])?;
        let xml = self.get_text(url).await?;
        debug!(bytes = xml.len(), "Fetched PubMed record");
        parse_efetch_article(&xml)
    }
}

impl LiteratureSearch for PubMedClient {
    #[instrument(level = "info", skip(self))]
    async fn first_match(&self, query: &str) -> Result<Option<ResearchPaper>, Box<dyn Error>> {
        let t0 = Instant::now();
        let ids = self.search_ids(query, 1).await?;
        let Some(pmid) = ids.first() else {
            info!(elapsed_ms = t0.elapsed().as_millis(), "No PubMed results");
            return Ok(None);
        };
        let paper = self.fetch_paper(pmid).await?;
        match &paper {
            Some(p) => info!(pmid = %p.pmid, title = %p.title, elapsed_ms = t0.elapsed().as_millis(), "Selected paper"),
            None => info!(%pmid, "PubMed record had no article"),
        }
        Ok(paper)
    }
}

/// Read the PMIDs out of an `esearch` JSON response.
pub fn parse_esearch_ids(body: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let parsed: ESearchResponse = serde_json::from_str(body)?;
    Ok(parsed.esearchresult.idlist)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Capture {
    Pmid,
    Title,
    Abstract,
}

/// Parse the first `PubmedArticle` of an `efetch` XML response.
///
/// Inline markup inside `ArticleTitle` and `AbstractText` (e.g. `<i>`) is
/// flattened to its text. Abstract sections are joined with newlines.
pub fn parse_efetch_article(xml: &str) -> Result<Option<ResearchPaper>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut in_article = false;
    let mut capture: Option<Capture> = None;
    let mut pmid = String::new();
    let mut title = String::new();
    let mut sections: Vec<String> = Vec::new();
    let mut current = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"PubmedArticle" => in_article = true,
                // The first PMID is the article's own; later ones are citations.
                b"PMID" if in_article && pmid.is_empty() => capture = Some(Capture::Pmid),
                b"ArticleTitle" if in_article => capture = Some(Capture::Title),
                b"AbstractText" if in_article => {
                    current.clear();
                    capture = Some(Capture::Abstract);
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"PubmedArticle" => break,
                b"PMID" | b"ArticleTitle" => capture = None,
                b"AbstractText" => {
                    let text = current.trim();
                    if !text.is_empty() {
                        sections.push(text.to_string());
                    }
                    capture = None;
                }
                _ => {}
            },
            Event::Text(e) => {
                if let Some(target) = capture {
                    push_text(target, &e.decode()?, &mut pmid, &mut title, &mut current);
                }
            }
            Event::CData(e) => {
                if let Some(target) = capture {
                    push_text(target, &e.decode()?, &mut pmid, &mut title, &mut current);
                }
            }
            Event::GeneralRef(e) => {
                if let Some(target) = capture {
                    let resolved = match e.resolve_char_ref()? {
                        Some(ch) => ch.to_string(),
                        None => {
                            let name = e.decode()?;
                            resolve_predefined_entity(&name).unwrap_or_default().to_string()
                        }
                    };
                    push_text(target, &resolved, &mut pmid, &mut title, &mut current);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !in_article {
        return Ok(None);
    }

    Ok(Some(ResearchPaper {
        pmid: pmid.trim().to_string(),
        title: collapse_whitespace(&title),
        abstract_text: sections.into_iter().join("\n"),
    }))
}

fn push_text(target: Capture, text: &str, pmid: &mut String, title: &mut String, abstract_part: &mut String) {
    match target {
        Capture::Pmid => pmid.push_str(text),
        Capture::Title => title.push_str(text),
        Capture::Abstract => abstract_part.push_str(text),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}
