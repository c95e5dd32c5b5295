//! One digest run: choose a source, summarize it, find an image, write the post.
//!
//! Every external dependency comes in through a trait so the run can be driven
//! end to end with in-memory fakes.

use crate::api::TextGenerator;
use crate::cli::Variant;
use crate::config::Config;
use crate::images::{resolve_image, ImageSearch, ResolvedImage};
use crate::models::{GeneratedPost, PostMode, ResearchEra, ResearchPaper, TEXTBOOK_TOPICS};
use crate::outputs::markdown::write_post;
use crate::prompts::{research_prompt, textbook_prompt, textbook_title};
use crate::pubmed::LiteratureSearch;
use crate::selector::SourceSelector;
use chrono::{Datelike, NaiveDate};
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Published {
        path: PathBuf,
        mode: PostMode,
        title: String,
        image_fallback: bool,
    },
    /// The search found nothing and the variant has no fallback.
    Skipped,
}

/// What the post will be about, with the prompt already built.
struct PlannedPost {
    mode: PostMode,
    title: String,
    prompt: String,
    image_query: &'static str,
}

/// Components wired together for a single run.
pub struct Pipeline<'a, S, L, G, I> {
    pub config: &'a Config,
    pub selector: S,
    pub literature: &'a L,
    pub generator: &'a G,
    pub images: &'a I,
}

impl<'a, S, L, G, I> Pipeline<'a, S, L, G, I>
where
    S: SourceSelector,
    L: LiteratureSearch,
    G: TextGenerator,
    I: ImageSearch,
{
    /// Execute the run for `today`.
    ///
    /// # Arguments
    ///
    /// * `today` - Publication date; also picks the year for current research
    ///
    /// # Returns
    ///
    /// [`RunOutcome::Published`] with the written path, or
    /// [`RunOutcome::Skipped`] when the `digest` variant finds no paper.
    ///
    /// # Errors
    ///
    /// A failed literature search, a failed Gemini call or a failed write ends
    /// the run. Image lookup failures never do.
    #[instrument(level = "info", skip(self), fields(variant = ?self.config.variant))]
    pub async fn run(mut self, today: NaiveDate) -> Result<RunOutcome, Box<dyn Error>> {
        let Some(plan) = self.plan(today).await? else {
            return Ok(RunOutcome::Skipped);
        };
        info!(mode = plan.mode.as_str(), title = %plan.title, "Generating post");
        debug!(prompt_bytes = plan.prompt.len(), "Built prompt");

        let body = self.generator.generate(&plan.prompt).await?;
        let image = resolve_image(self.images, plan.image_query).await;
        if let ResolvedImage::Fallback { reason } = &image {
            debug!(%reason, "Using fallback image");
        }

        let category = match self.config.variant {
            Variant::Strategist => Some(plan.mode),
            Variant::Digest => None,
        };
        let post = GeneratedPost {
            title: plan.title,
            date: today,
            image_url: image.url().to_string(),
            category,
            body,
        };
        let path = write_post(&self.config.posts_dir, &post).await?;

        Ok(RunOutcome::Published {
            path,
            mode: plan.mode,
            title: post.title,
            image_fallback: image.is_fallback(),
        })
    }

    async fn plan(&mut self, today: NaiveDate) -> Result<Option<PlannedPost>, Box<dyn Error>> {
        match self.config.variant {
            Variant::Strategist => {
                if self.selector.pick_mode() == PostMode::Research {
                    let era = self.selector.pick_era();
                    if let Some(paper) = self.search(era, today).await? {
                        return Ok(Some(self.research_plan(&paper, era)));
                    }
                    warn!("PubMed returned no results; falling back to a textbook topic");
                }
                Ok(Some(self.textbook_plan()))
            }
            Variant::Digest => {
                let era = self.selector.pick_era();
                match self.search(era, today).await? {
                    Some(paper) => Ok(Some(self.research_plan(&paper, era))),
                    None => {
                        info!("PubMed returned no results; nothing to publish today");
                        Ok(None)
                    }
                }
            }
        }
    }

    async fn search(
        &self,
        era: ResearchEra,
        today: NaiveDate,
    ) -> Result<Option<ResearchPaper>, Box<dyn Error>> {
        let query = era.query(today.year());
        info!(?era, %query, "Searching PubMed");
        self.literature.first_match(&query).await
    }

    fn research_plan(&self, paper: &ResearchPaper, era: ResearchEra) -> PlannedPost {
        PlannedPost {
            mode: PostMode::Research,
            title: paper.title.clone(),
            prompt: research_prompt(paper, era.label(), self.config.variant),
            image_query: self.config.research_image_query(),
        }
    }

    fn textbook_plan(&mut self) -> PlannedPost {
        let topic = self.selector.pick_topic(&TEXTBOOK_TOPICS);
        PlannedPost {
            mode: PostMode::Textbook,
            title: textbook_title(topic),
            prompt: textbook_prompt(topic),
            image_query: "anatomy diagram",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::images::FALLBACK_IMAGE_URL;
    use crate::outputs::markdown::split_front_matter;
    use crate::selector::FixedSelector;
    use clap::Parser;
    use std::cell::RefCell;
    use std::path::Path;

    struct FakeLiterature {
        paper: Option<ResearchPaper>,
        queries: RefCell<Vec<String>>,
    }

    impl FakeLiterature {
        fn new(paper: Option<ResearchPaper>) -> Self {
            Self { paper, queries: RefCell::new(Vec::new()) }
        }
    }

    impl LiteratureSearch for FakeLiterature {
        async fn first_match(&self, query: &str) -> Result<Option<ResearchPaper>, Box<dyn Error>> {
            self.queries.borrow_mut().push(query.to_string());
            Ok(self.paper.clone())
        }
    }

    struct FailingLiterature;

    impl LiteratureSearch for FailingLiterature {
        async fn first_match(&self, _query: &str) -> Result<Option<ResearchPaper>, Box<dyn Error>> {
            Err("eutils unavailable".into())
        }
    }

    struct EchoGenerator {
        prompts: RefCell<Vec<String>>,
    }

    impl EchoGenerator {
        fn new() -> Self {
            Self { prompts: RefCell::new(Vec::new()) }
        }
    }

    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok("Generated body text.".to_string())
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, Box<dyn Error>> {
            Err("quota exceeded".into())
        }
    }

    struct FakeImages(Option<&'static str>);

    impl ImageSearch for FakeImages {
        async fn first_photo(&self, _query: &str) -> Result<Option<String>, Box<dyn Error>> {
            match self.0 {
                Some(url) => Ok(Some(url.to_string())),
                None => Err("network unreachable".into()),
            }
        }
    }

    fn config(dir: &Path, variant: Variant) -> Config {
        let mut config = Config::from(Cli::parse_from(["poultry_digest"]));
        config.posts_dir = dir.to_path_buf();
        config.variant = variant;
        config
    }

    fn selector(mode: PostMode, era: ResearchEra) -> FixedSelector {
        FixedSelector { mode, era, topic_index: 3 }
    }

    fn paper() -> ResearchPaper {
        ResearchPaper {
            pmid: "38123456".to_string(),
            title: "Gut Health & the GALT System!".to_string(),
            abstract_text: "Lymphoid tissue matures early.".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn test_strategist_research_post() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Variant::Strategist);
        let literature = FakeLiterature::new(Some(paper()));
        let generator = EchoGenerator::new();
        let images = FakeImages(Some("https://images.pexels.com/lab.jpg"));

        let outcome = Pipeline {
            config: &config,
            selector: selector(PostMode::Research, ResearchEra::Modern),
            literature: &literature,
            generator: &generator,
            images: &images,
        }
        .run(today())
        .await
        .unwrap();

        let expected = dir.path().join("2026-10-19-gut-health--the-galt-system.md");
        assert_eq!(
            outcome,
            RunOutcome::Published {
                path: expected.clone(),
                mode: PostMode::Research,
                title: "Gut Health & the GALT System!".to_string(),
                image_fallback: false,
            }
        );
        assert_eq!(
            literature.queries.borrow().as_slice(),
            ["poultry physiology[Title/Abstract] AND 2026[Date - Publication]"]
        );
        assert!(generator.prompts.borrow()[0].contains("Modern Research Digest"));

        let doc = std::fs::read_to_string(expected).unwrap();
        let (fm, body) = split_front_matter(&doc).unwrap();
        assert_eq!(fm.image, "https://images.pexels.com/lab.jpg");
        assert_eq!(fm.category, Some(PostMode::Research));
        assert!(body.contains("Generated body text."));
    }

    #[tokio::test]
    async fn test_strategist_empty_search_falls_back_to_textbook() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Variant::Strategist);
        let literature = FakeLiterature::new(None);
        let generator = EchoGenerator::new();
        let images = FakeImages(Some("https://images.pexels.com/anatomy.jpg"));

        let outcome = Pipeline {
            config: &config,
            selector: selector(PostMode::Research, ResearchEra::Classic),
            literature: &literature,
            generator: &generator,
            images: &images,
        }
        .run(today())
        .await
        .unwrap();

        let RunOutcome::Published { path, mode, title, .. } = outcome else {
            panic!("expected a published post");
        };
        assert_eq!(mode, PostMode::Textbook);
        assert_eq!(title, format!("Bio-Fundamentals: {}", TEXTBOOK_TOPICS[3]));
        assert_eq!(literature.queries.borrow().len(), 1);

        let doc = std::fs::read_to_string(path).unwrap();
        let (fm, _) = split_front_matter(&doc).unwrap();
        assert_eq!(fm.category, Some(PostMode::Textbook));
        assert!(doc.contains("category: textbook"));
    }

    #[tokio::test]
    async fn test_strategist_textbook_skips_search() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Variant::Strategist);
        let literature = FakeLiterature::new(Some(paper()));
        let generator = EchoGenerator::new();
        let images = FakeImages(Some("https://images.pexels.com/anatomy.jpg"));

        let outcome = Pipeline {
            config: &config,
            selector: selector(PostMode::Textbook, ResearchEra::Modern),
            literature: &literature,
            generator: &generator,
            images: &images,
        }
        .run(today())
        .await
        .unwrap();

        assert!(matches!(outcome, RunOutcome::Published { mode: PostMode::Textbook, .. }));
        assert!(literature.queries.borrow().is_empty());
        assert!(generator.prompts.borrow()[0].contains("Sturkie's Avian Physiology"));
    }

    #[tokio::test]
    async fn test_digest_empty_search_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Variant::Digest);
        let literature = FakeLiterature::new(None);
        let generator = EchoGenerator::new();
        let images = FakeImages(None);

        let outcome = Pipeline {
            config: &config,
            selector: selector(PostMode::Textbook, ResearchEra::Classic),
            literature: &literature,
            generator: &generator,
            images: &images,
        }
        .run(today())
        .await
        .unwrap();

        assert_eq!(outcome, RunOutcome::Skipped);
        assert!(generator.prompts.borrow().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(
            literature.queries.borrow().as_slice(),
            ["poultry physiology[Title] AND (1990[PDAT] : 2012[PDAT])"]
        );
    }

    #[tokio::test]
    async fn test_digest_post_has_no_category() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Variant::Digest);
        let literature = FakeLiterature::new(Some(paper()));
        let generator = EchoGenerator::new();
        let images = FakeImages(Some("https://images.pexels.com/farm.jpg"));

        let outcome = Pipeline {
            config: &config,
            selector: selector(PostMode::Textbook, ResearchEra::Modern),
            literature: &literature,
            generator: &generator,
            images: &images,
        }
        .run(today())
        .await
        .unwrap();

        let RunOutcome::Published { path, mode, .. } = outcome else {
            panic!("expected a published post");
        };
        assert_eq!(mode, PostMode::Research);
        assert!(generator.prompts.borrow()[0].contains("The Hook"));
        let doc = std::fs::read_to_string(path).unwrap();
        let (fm, _) = split_front_matter(&doc).unwrap();
        assert_eq!(fm.category, None);
    }

    #[tokio::test]
    async fn test_image_failure_uses_fallback_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Variant::Strategist);
        let literature = FakeLiterature::new(Some(paper()));
        let generator = EchoGenerator::new();
        let images = FakeImages(None);

        let outcome = Pipeline {
            config: &config,
            selector: selector(PostMode::Research, ResearchEra::Modern),
            literature: &literature,
            generator: &generator,
            images: &images,
        }
        .run(today())
        .await
        .unwrap();

        let RunOutcome::Published { path, image_fallback, .. } = outcome else {
            panic!("expected a published post");
        };
        assert!(image_fallback);
        let doc = std::fs::read_to_string(path).unwrap();
        let (fm, _) = split_front_matter(&doc).unwrap();
        assert_eq!(fm.image, FALLBACK_IMAGE_URL);
        assert_eq!(
            fm.image,
            "https://images.pexels.com/photos/1769279/pexels-photo-1769279.jpeg"
        );
    }

    #[tokio::test]
    async fn test_generator_failure_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Variant::Strategist);
        let literature = FakeLiterature::new(None);
        let images = FakeImages(None);

        let result = Pipeline {
            config: &config,
            selector: selector(PostMode::Textbook, ResearchEra::Modern),
            literature: &literature,
            generator: &FailingGenerator,
            images: &images,
        }
        .run(today())
        .await;

        assert!(result.unwrap_err().to_string().contains("quota exceeded"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_search_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Variant::Strategist);
        let generator = EchoGenerator::new();
        let images = FakeImages(None);

        let result = Pipeline {
            config: &config,
            selector: selector(PostMode::Research, ResearchEra::Modern),
            literature: &FailingLiterature,
            generator: &generator,
            images: &images,
        }
        .run(today())
        .await;

        assert!(result.is_err());
        assert!(generator.prompts.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_same_day_same_title_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Variant::Strategist);
        let literature = FakeLiterature::new(None);
        let generator = EchoGenerator::new();
        let images = FakeImages(None);

        for _ in 0..2 {
            Pipeline {
                config: &config,
                selector: selector(PostMode::Textbook, ResearchEra::Modern),
                literature: &literature,
                generator: &generator,
                images: &images,
            }
            .run(today())
            .await
            .unwrap();
        }

        assert_eq!(generator.prompts.borrow().len(), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
