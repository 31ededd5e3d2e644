//! Text normalization
//!
//! This module cleans raw review text before scoring. Stages run in a fixed
//! order, each one independently toggleable:
//! 1. Strip markup tags and decode character entities, repeated until stable
//! 2. Strip URL-like tokens
//! 3. Lowercase
//! 4. Replace non-alphanumeric, non-whitespace characters with a space
//! 5. Replace digit runs with a space
//! 6. Collapse whitespace and trim
//!
//! Markup and URL stripping must run before punctuation removal, otherwise
//! `<`, `>`, `:` and `/` are gone before the patterns can match. Every
//! combination of stages is idempotent.

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

static URL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z][a-z0-9+.\-]*://\S+|(?i)\bwww\.\S+").expect("valid url pattern")
});

/// Upper bound on strip/decode passes for nested escapes
const MAX_MARKUP_PASSES: usize = 16;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

/// Stage toggles for the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub strip_markup: bool,
    pub strip_urls: bool,
    pub lowercase: bool,
    pub strip_punctuation: bool,
    pub strip_digits: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            strip_markup: true,
            strip_urls: true,
            lowercase: true,
            strip_punctuation: true,
            strip_digits: true,
        }
    }
}

/// Normalizer for review text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer {
    options: NormalizeOptions,
}

impl TextNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize a possibly-absent text; absent input yields an empty string
    pub fn normalize(&self, text: Option<&str>) -> String {
        match text {
            Some(text) => normalize(text, &self.options),
            None => String::new(),
        }
    }
}

/// Normalize `text` with the given stage toggles.
///
/// Total and pure. The result is a fixed point for any toggle combination:
/// normalizing it again returns it unchanged.
pub fn normalize(text: &str, options: &NormalizeOptions) -> String {
    let mut s = text.to_string();

    if options.strip_markup {
        s = strip_markup(s, options.lowercase);
    }

    if options.strip_urls {
        s = URL_TOKEN.replace_all(&s, " ").into_owned();
    }

    if options.lowercase {
        s = s.to_lowercase();
    }

    if options.strip_punctuation {
        s = s
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();
    }

    if options.strip_digits {
        s = DIGIT_RUN.replace_all(&s, " ").into_owned();
        // A removed digit run can leave a URL on a word boundary
        if options.strip_urls {
            s = URL_TOKEN.replace_all(&s, " ").into_owned();
        }
    }

    collapse_whitespace(&s)
}

/// Strip tags and decode entities until neither changes the text.
///
/// Decoding `&amp;lt;` yields `&lt;`, and decoding `&lt;b&gt;` yields a tag,
/// so one pass is not enough. When lowercasing is on it runs inside the loop
/// too, since `&Amp;` only becomes an entity once lowercased.
fn strip_markup(mut s: String, lowercase: bool) -> String {
    for _ in 0..MAX_MARKUP_PASSES {
        let mut next = {
            let stripped = MARKUP_TAG.replace_all(&s, " ");
            decode_html_entities(&stripped).into_owned()
        };
        if lowercase {
            next = next.to_lowercase();
        }
        if next == s {
            break;
        }
        s = next;
    }
    s
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn defaults() -> NormalizeOptions {
        NormalizeOptions::default()
    }

    #[test]
    fn test_full_cleaning_pipeline() {
        let raw = "<p>I LOVED it!!</p> See https://example.com/x?y=1 &amp; www.shop.com 5 stars";
        assert_eq!(normalize(raw, &defaults()), "i loved it see stars");
    }

    #[test]
    fn test_markup_replaced_with_space() {
        assert_eq!(normalize("good<br/>value", &defaults()), "good value");
    }

    #[test]
    fn test_entities_decoded_before_punctuation() {
        let options = NormalizeOptions {
            strip_punctuation: false,
            ..defaults()
        };
        assert_eq!(normalize("Fish &amp; chips", &options), "fish & chips");
    }

    #[test]
    fn test_url_stripped_before_punctuation() {
        // With punctuation removed first the URL would leave "https example com"
        assert_eq!(normalize("see https://example.com now", &defaults()), "see now");
        assert_eq!(normalize("Visit WWW.Example.com today", &defaults()), "visit today");
    }

    #[test]
    fn test_stage_toggles() {
        let options = NormalizeOptions {
            lowercase: false,
            strip_digits: false,
            ..defaults()
        };
        assert_eq!(normalize("Top 10 Picks!", &options), "Top 10 Picks");

        let none = NormalizeOptions {
            strip_markup: false,
            strip_urls: false,
            lowercase: false,
            strip_punctuation: false,
            strip_digits: false,
        };
        assert_eq!(normalize("  <b>Hi</b>   there ", &none), "<b>Hi</b> there");
    }

    #[test]
    fn test_underscore_is_punctuation() {
        assert_eq!(normalize("snake_case", &defaults()), "snake case");
    }

    #[test]
    fn test_unicode_letters_survive() {
        assert_eq!(normalize("Très BON café!", &defaults()), "très bon café");
    }

    #[test]
    fn test_absent_text_is_empty() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize(None), "");
        assert_eq!(normalizer.normalize(Some("   ")), "");
    }

    #[test]
    fn test_nested_escapes_fully_decoded() {
        let options = NormalizeOptions {
            strip_punctuation: false,
            ..defaults()
        };
        assert_eq!(normalize("fish &amp;amp; chips", &options), "fish & chips");
        assert_eq!(normalize("&lt;b&gt;bold&lt;/b&gt; text", &options), "bold text");
        assert_eq!(normalize("&Amp;lt;i&Amp;gt;quiet", &options), "quiet");
    }

    #[test]
    fn test_url_behind_digits_stripped() {
        let options = NormalizeOptions {
            strip_punctuation: false,
            ..defaults()
        };
        assert_eq!(normalize("deal 1http://x.example.com now", &options), "deal now");
    }

    fn all_option_combinations() -> Vec<NormalizeOptions> {
        (0..32u8)
            .map(|bits| NormalizeOptions {
                strip_markup: bits & 1 != 0,
                strip_urls: bits & 2 != 0,
                lowercase: bits & 4 != 0,
                strip_punctuation: bits & 8 != 0,
                strip_digits: bits & 16 != 0,
            })
            .collect()
    }

    #[test]
    fn test_idempotence() {
        let samples = [
            "<div>Great   product!!! 10/10</div>",
            "Terrible... http://bad.example.org/review?id=3 never again",
            "&lt;b&gt;escaped&lt;/b&gt; markup &amp;amp; twice",
            "fish &amp;amp; chips",
            "&lt;b&gt;bold&lt;/b&gt; text",
            "&Amp;lt;i&Amp;gt;quiet &AMP;amp;",
            "&#60;em&#62;numeric&#60;/em&#62; refs",
            "deal 1http://x.example.com 2www.shop.com now",
            "MiXeD CaSe\twith\nnewlines and émojis 😀",
            "www.site.com/path",
            "",
            "ok",
            "İstanbul ÇAĞ",
            "a <b c",
            "5 < 6 & 7 > 2",
        ];

        let combinations = all_option_combinations();
        assert_eq!(combinations.len(), 32);

        for options in &combinations {
            for sample in samples {
                let once = normalize(sample, options);
                let twice = normalize(&once, options);
                assert_eq!(twice, once, "not idempotent for {sample:?} with {options:?}");
            }
        }
    }
}
