//! Sentiment scoring
//!
//! [`SentimentScorer`] is the seam between the pipeline and whatever engine
//! produces polarity scores. The pipeline treats a scorer as a pure function
//! of its input text and may call it from several threads at once.

mod lexicon;

pub use lexicon::LexiconScorer;

use crate::types::SentimentScore;
use std::sync::Arc;

/// Maps text to polarity scores.
///
/// Implementations must return `compound` in [-1, 1] and non-negative
/// `pos`/`neu`/`neg` proportions summing to 1, and must return the same score
/// for the same text.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> SentimentScore;
}

impl<S: SentimentScorer + ?Sized> SentimentScorer for &S {
    fn score(&self, text: &str) -> SentimentScore {
        (**self).score(text)
    }
}

impl<S: SentimentScorer + ?Sized> SentimentScorer for Box<S> {
    fn score(&self, text: &str) -> SentimentScore {
        (**self).score(text)
    }
}

impl<S: SentimentScorer + ?Sized> SentimentScorer for Arc<S> {
    fn score(&self, text: &str) -> SentimentScore {
        (**self).score(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScorer(f64);

    impl SentimentScorer for FixedScorer {
        fn score(&self, _text: &str) -> SentimentScore {
            SentimentScore {
                compound: self.0,
                ..SentimentScore::neutral()
            }
        }
    }

    #[test]
    fn test_boxed_and_shared_scorers_delegate() {
        let boxed: Box<dyn SentimentScorer> = Box::new(FixedScorer(0.4));
        let shared: Arc<dyn SentimentScorer> = Arc::new(FixedScorer(-0.4));

        assert_eq!(boxed.score("anything").compound, 0.4);
        assert_eq!(shared.score("anything").compound, -0.4);
        assert_eq!((&FixedScorer(0.1)).score("x").compound, 0.1);
    }
}
