//! Deterministic text -> term-stream pipeline.
//!
//! Pipeline, exactly as specified: strip digit runs, tokenize on maximal
//! word-character runs, lowercase, drop English stopwords, Porter-stem the
//! rest. Mirrors the original `bsbi.py::parse_block`/`retrieve_*` pipeline
//! (`re.sub('[0-9]+', '')` -> `RegexpTokenizer(r'\w+')` -> lowercase/stopword
//! filter -> `PorterStemmer().stem`), ported to the `rust_stemmers` crate's
//! `Algorithm::English` stemmer in place of NLTK's.

use std::collections::HashSet;
use std::sync::LazyLock;

use rust_stemmers::{Algorithm, Stemmer};

/// NLTK's default English stopword list, baked in as a fixed static asset
/// rather than loaded from an external file.
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
        "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
        "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
        "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
        "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
        "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
        "with", "about", "against", "between", "into", "through", "during", "before", "after",
        "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
        "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
        "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
        "will", "just", "don", "don't", "should", "should've", "now", "d", "ll", "m", "o", "re",
        "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn",
        "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma",
        "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
        "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
        "wouldn't",
    ]
    .into_iter()
    .collect()
});

/// Text -> deterministic stream of analyzed term strings.
pub struct Analyzer {
    stemmer: Stemmer,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Analyze `text` into a deterministic, order-preserved stream of terms.
    /// Never emits empty strings.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let without_digits = strip_digit_runs(text);
        tokenize_word_runs(&without_digits)
            .into_iter()
            .filter_map(|token| {
                let lower = token.to_lowercase();
                if lower.is_empty() || STOPWORDS.contains(lower.as_str()) {
                    None
                } else {
                    Some(self.stemmer.stem(&lower).into_owned())
                }
            })
            .collect()
    }
}

/// Replace every maximal run of ASCII digits with the empty string.
fn strip_digit_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if !c.is_ascii_digit() {
            out.push(c);
        }
    }
    out
}

/// Tokenize by maximal runs of word characters (alphanumeric + underscore).
fn tokenize_word_runs(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_example_a() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.analyze("the cat sat on the mat"), vec!["cat", "sat", "mat"]);
    }

    #[test]
    fn s3_example_b() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.analyze("a cat and a dog"), vec!["cat", "dog"]);
    }

    #[test]
    fn strips_digit_runs() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.analyze("room101 door"), vec!["room", "door"]);
    }

    #[test]
    fn empty_text_yields_no_terms() {
        let analyzer = Analyzer::new();
        assert!(analyzer.analyze("").is_empty());
        assert!(analyzer.analyze("   123 456   ").is_empty());
    }

    #[test]
    fn idempotent_on_already_stemmed_terms() {
        let analyzer = Analyzer::new();
        let stems = analyzer.analyze("running runner runs");
        for stem in &stems {
            assert_eq!(&analyzer.analyze(stem), &vec![stem.clone()]);
        }
    }
}
