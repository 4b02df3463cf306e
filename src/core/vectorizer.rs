//! TF-IDF feature extraction over word n-grams.
//!
//! Loaded from an exported vectorizer artifact (`tfidf_vectorizer.json`):
//!
//! ```json
//! {
//!   "vocabulary": {"printer": 0, "printer jammed": 1},
//!   "idf": [1.69, 2.10],
//!   "ngram_range": [1, 2],
//!   "lowercase": true,
//!   "sublinear_tf": false,
//!   "use_idf": true,
//!   "norm": "l2"
//! }
//! ```

use crate::domain::model::SparseVector;
use crate::utils::error::{Result, TriageError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

// Two or more word characters, the default token pattern of the exporting library.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_true")]
    use_idf: bool,
    #[serde(default)]
    norm: Norm,
}

impl TfidfVectorizer {
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Result<Self> {
        let vectorizer = Self {
            vocabulary,
            idf,
            ngram_range: default_ngram_range(),
            lowercase: true,
            sublinear_tf: false,
            use_idf: true,
            norm: Norm::L2,
        };
        vectorizer.check()?;
        Ok(vectorizer)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let vectorizer: Self = serde_json::from_slice(bytes)
            .map_err(|e| TriageError::model(format!("invalid vectorizer artifact: {}", e)))?;
        vectorizer.check()?;
        Ok(vectorizer)
    }

    fn check(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(TriageError::model(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        if let Some((term, index)) = self
            .vocabulary
            .iter()
            .find(|(_, index)| **index >= self.idf.len())
        {
            return Err(TriageError::model(format!(
                "vocabulary term {:?} maps to column {} but idf has {} entries",
                term,
                index,
                self.idf.len()
            )));
        }

        Ok(())
    }

    /// Number of output columns.
    pub fn feature_count(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        TOKEN_PATTERN
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn ngrams(&self, tokens: &[String]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }

    pub fn transform(&self, text: &str) -> SparseVector {
        let tokens = self.tokenize(text);

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for gram in self.ngrams(&tokens) {
            if let Some(&column) = self.vocabulary.get(&gram) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, count)| {
                let tf = if self.sublinear_tf { 1.0 + count.ln() } else { count };
                let weight = if self.use_idf { tf * self.idf[column] } else { tf };
                (column, weight)
            })
            .collect();

        let magnitude = match self.norm {
            Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        if magnitude > 0.0 {
            for (_, value) in &mut entries {
                *value /= magnitude;
            }
        }

        SparseVector { entries }
    }
}
