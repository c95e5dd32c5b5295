//! Branch selection for a run.
//!
//! The pipeline asks a [`SourceSelector`] every question that the daily run
//! answers by coin flip, so tests can force each path.

use crate::models::{PostMode, ResearchEra};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Supplies the random decisions of a run.
pub trait SourceSelector {
    /// Research paper or textbook topic.
    fn pick_mode(&mut self) -> PostMode;
    /// Current-year or classic literature.
    fn pick_era(&mut self) -> ResearchEra;
    /// One topic from a non-empty list.
    fn pick_topic<'a>(&mut self, topics: &[&'a str]) -> &'a str;
}

/// Fair coin flips backed by any [`Rng`].
#[derive(Debug)]
pub struct RandomSelector<R> {
    rng: R,
}

impl<R: Rng> RandomSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSelector<StdRng> {
    /// Seeded when `seed` is given, otherwise seeded from the OS.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng)
    }
}

impl<R: Rng> SourceSelector for RandomSelector<R> {
    fn pick_mode(&mut self) -> PostMode {
        let mode = if self.rng.random_bool(0.5) {
            PostMode::Research
        } else {
            PostMode::Textbook
        };
        debug!(mode = mode.as_str(), "Picked post mode");
        mode
    }

    fn pick_era(&mut self) -> ResearchEra {
        let era = if self.rng.random_bool(0.5) {
            ResearchEra::Classic
        } else {
            ResearchEra::Modern
        };
        debug!(?era, "Picked research era");
        era
    }

    fn pick_topic<'a>(&mut self, topics: &[&'a str]) -> &'a str {
        let idx = self.rng.random_range(0..topics.len());
        topics[idx]
    }
}

/// Selector that replays fixed answers.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedSelector {
    pub mode: PostMode,
    pub era: ResearchEra,
    pub topic_index: usize,
}

#[cfg(test)]
impl SourceSelector for FixedSelector {
    fn pick_mode(&mut self) -> PostMode {
        self.mode
    }

    fn pick_era(&mut self) -> ResearchEra {
        self.era
    }

    fn pick_topic<'a>(&mut self, topics: &[&'a str]) -> &'a str {
        topics[self.topic_index % topics.len()]
    }
}
