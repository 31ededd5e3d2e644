//! Lexicon-based scorer
//!
//! A valence lexicon on a -4..4 scale with intensity boosters, a three-token
//! negation window and contrastive "but" weighting. The summed valence `x` is
//! squashed to a compound score with `x / sqrt(x^2 + 15)`.

use super::SentimentScorer;
use crate::types::SentimentScore;
use std::collections::{HashMap, HashSet};

/// Normalization constant of the compound squashing function
const ALPHA: f64 = 15.0;

/// Multiplier applied to a valence preceded by a negation
const NEGATION_SCALAR: f64 = -0.74;

/// Booster strength for one token of distance; decays with distance
const BOOST_INCREMENT: f64 = 0.293;
const BOOST_DECAY: [f64; 3] = [1.0, 0.95, 0.9];

/// Sentiment words and their valence
const VALENCES: &[(&str, f64)] = &[
    // Strongly positive
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("best", 3.2),
    ("brilliant", 2.8),
    ("delicious", 2.7),
    ("excellent", 3.2),
    ("exceptional", 2.9),
    ("fantastic", 2.6),
    ("flawless", 2.8),
    ("incredible", 2.6),
    ("love", 3.2),
    ("loved", 2.9),
    ("loves", 2.7),
    ("outstanding", 3.0),
    ("perfect", 2.7),
    ("superb", 3.1),
    ("wonderful", 2.7),
    ("yummy", 2.4),
    // Positive
    ("beautiful", 2.9),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("favorite", 2.0),
    ("fresh", 1.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("impressed", 2.1),
    ("like", 1.5),
    ("liked", 1.8),
    ("lovely", 2.8),
    ("nice", 1.8),
    ("pleasant", 2.3),
    ("pleased", 1.9),
    ("quality", 1.1),
    ("recommend", 1.5),
    ("recommended", 1.7),
    ("reliable", 1.8),
    ("satisfied", 1.8),
    ("smooth", 1.0),
    ("sturdy", 1.2),
    ("tasty", 2.0),
    ("thanks", 1.9),
    ("useful", 1.9),
    ("value", 1.0),
    ("worth", 0.9),
    // Mildly positive
    ("decent", 0.9),
    ("easy", 1.9),
    ("fine", 0.8),
    ("ok", 0.9),
    ("okay", 0.9),
    ("fair", 1.3),
    ("fast", 0.9),
    ("quick", 1.0),
    // Mildly negative
    ("bland", -1.0),
    ("cheap", -0.3),
    ("dull", -1.7),
    ("expensive", -0.8),
    ("late", -1.0),
    ("mediocre", -1.3),
    ("slow", -1.1),
    ("stale", -1.6),
    ("weak", -1.9),
    // Negative
    ("bad", -2.5),
    ("boring", -1.3),
    ("broke", -1.6),
    ("broken", -2.1),
    ("complaint", -1.5),
    ("damaged", -1.9),
    ("defective", -1.9),
    ("difficult", -1.5),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("dislike", -1.6),
    ("faulty", -1.8),
    ("hard", -0.4),
    ("junk", -1.7),
    ("leak", -1.4),
    ("leaked", -1.4),
    ("missing", -1.2),
    ("overpriced", -1.8),
    ("poor", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("refund", -0.8),
    ("return", -0.4),
    ("sad", -2.1),
    ("sick", -2.3),
    ("sorry", -0.3),
    ("unhappy", -1.8),
    ("useless", -1.8),
    ("waste", -1.8),
    ("wasted", -2.2),
    ("worse", -2.1),
    ("wrong", -2.1),
    // Strongly negative
    ("angry", -2.3),
    ("awful", -2.0),
    ("disgusting", -2.4),
    ("garbage", -2.2),
    ("hate", -2.7),
    ("hated", -3.2),
    ("horrible", -2.5),
    ("nasty", -2.6),
    ("rude", -2.0),
    ("scam", -2.7),
    ("terrible", -2.1),
    ("worst", -3.1),
];

/// Intensity modifiers; negative entries dampen
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOST_INCREMENT),
    ("completely", BOOST_INCREMENT),
    ("extremely", BOOST_INCREMENT),
    ("highly", BOOST_INCREMENT),
    ("incredibly", BOOST_INCREMENT),
    ("really", BOOST_INCREMENT),
    ("so", BOOST_INCREMENT),
    ("super", BOOST_INCREMENT),
    ("totally", BOOST_INCREMENT),
    ("very", BOOST_INCREMENT),
    ("barely", -BOOST_INCREMENT),
    ("hardly", -BOOST_INCREMENT),
    ("marginally", -BOOST_INCREMENT),
    ("slightly", -BOOST_INCREMENT),
    ("somewhat", -BOOST_INCREMENT),
];

/// Negation tokens, including the stems left behind once apostrophes are stripped
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nor", "none", "nobody", "nothing", "neither", "nowhere", "cannot",
    "without", "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "wont", "wouldnt",
    "couldnt", "shouldnt", "cant", "hasnt", "havent", "hadnt", "aint", "don", "doesn", "didn",
    "isn", "wasn", "aren", "weren", "wouldn", "couldn", "shouldn", "hasn", "haven", "hadn",
];

/// Default scoring backend
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<String, f64>,
    boosters: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    /// Create a scorer with the bundled lexicon
    pub fn new() -> Self {
        Self {
            valences: VALENCES
                .iter()
                .map(|(word, valence)| (word.to_string(), *valence))
                .collect(),
            boosters: BOOSTERS
                .iter()
                .map(|(word, scalar)| (word.to_string(), *scalar))
                .collect(),
            negations: NEGATIONS.iter().map(|word| word.to_string()).collect(),
        }
    }

    /// Add or replace a lexicon entry; valence is clamped to [-4, 4]
    pub fn with_word(mut self, word: &str, valence: f64) -> Self {
        self.valences
            .insert(word.to_lowercase(), valence.clamp(-4.0, 4.0));
        self
    }

    /// Number of sentiment-bearing words
    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }

    fn token_valence(&self, tokens: &[String], index: usize) -> f64 {
        let token = tokens[index].as_str();
        let mut valence = match self.valences.get(token) {
            Some(valence) => *valence,
            None => return 0.0,
        };

        let window = tokens[..index].iter().rev().take(3);
        for (distance, previous) in window.enumerate() {
            if let Some(scalar) = self.boosters.get(previous.as_str()) {
                let boost = scalar * BOOST_DECAY[distance];
                valence += if valence > 0.0 { boost } else { -boost };
            }
        }

        if tokens[..index]
            .iter()
            .rev()
            .take(3)
            .any(|previous| self.negations.contains(previous.as_str()))
        {
            valence *= NEGATION_SCALAR;
        }

        valence
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> SentimentScore {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return SentimentScore::neutral();
        }

        let mut sentiments: Vec<f64> = (0..tokens.len())
            .map(|i| self.token_valence(&tokens, i))
            .collect();

        // Contrastive "but": the clause after it dominates
        if let Some(pivot) = tokens.iter().position(|t| t == "but") {
            for (i, sentiment) in sentiments.iter_mut().enumerate() {
                if i < pivot {
                    *sentiment *= 0.5;
                } else if i > pivot {
                    *sentiment *= 1.5;
                }
            }
        }

        let total: f64 = sentiments.iter().sum();
        let compound = (total / (total * total + ALPHA).sqrt()).clamp(-1.0, 1.0);

        let mut pos_sum = 0.0;
        let mut neg_sum = 0.0;
        let mut neu_count = 0.0;
        for sentiment in &sentiments {
            if *sentiment > 0.0 {
                pos_sum += sentiment + 1.0;
            } else if *sentiment < 0.0 {
                neg_sum += 1.0 - sentiment;
            } else {
                neu_count += 1.0;
            }
        }

        let mass = pos_sum + neg_sum + neu_count;
        SentimentScore {
            compound,
            pos: pos_sum / mass,
            neu: neu_count / mass,
            neg: neg_sum / mass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel;
    use crate::classifier::Thresholds;

    fn assert_bounds(score: &SentimentScore) {
        assert!((-1.0..=1.0).contains(&score.compound));
        assert!(score.pos >= 0.0 && score.neu >= 0.0 && score.neg >= 0.0);
        assert!((score.pos + score.neu + score.neg - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_bounds_hold() {
        let scorer = LexiconScorer::new();
        let texts = [
            "",
            "   ",
            "the box arrived on tuesday",
            "great great great great great great great great great great",
            "worst worst worst horrible terrible awful hate",
            "not bad but not great either",
            "absolutely extremely really very good",
            "Good, BAD; ok!",
        ];

        for text in texts {
            assert_bounds(&scorer.score(text));
        }
    }

    #[test]
    fn test_empty_text_is_neutral() {
        let score = LexiconScorer::new().score("");
        assert_eq!(score, SentimentScore::neutral());
    }

    #[test]
    fn test_polarity_of_simple_reviews() {
        let scorer = LexiconScorer::new();
        let thresholds = Thresholds::default();

        let label = |text: &str| thresholds.classify(scorer.score(text).compound);
        assert_eq!(label("great product and excellent value"), SentimentLabel::Positive);
        assert_eq!(label("terrible taste and awful packaging"), SentimentLabel::Negative);
        assert_eq!(label("the package arrived on monday"), SentimentLabel::Neutral);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let scorer = LexiconScorer::new();
        assert!(scorer.score("good").compound > 0.0);
        assert!(scorer.score("not good").compound < 0.0);
        assert!(scorer.score("i don t like it").compound < 0.0);
    }

    #[test]
    fn test_boosters_intensify_and_dampen() {
        let scorer = LexiconScorer::new();
        let plain = scorer.score("good").compound;
        assert!(scorer.score("very good").compound > plain);
        assert!(scorer.score("slightly good").compound < plain);
        assert!(scorer.score("very bad").compound < scorer.score("bad").compound);
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        let scorer = LexiconScorer::new();
        assert!(scorer.score("good taste but terrible packaging").compound < 0.0);
        assert!(scorer.score("terrible packaging but good taste").compound > 0.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = LexiconScorer::new();
        let text = "really lovely tea but slow delivery";
        assert_eq!(scorer.score(text), scorer.score(text));
    }

    #[test]
    fn test_custom_words() {
        let scorer = LexiconScorer::new().with_word("Crunchy", 1.5);
        assert!(scorer.score("crunchy").compound > 0.0);
        assert!(scorer.len() > 100);
    }
}
