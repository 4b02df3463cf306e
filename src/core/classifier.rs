//! Linear ticket classifier and its pairing with the TF-IDF vectorizer.

use crate::core::vectorizer::TfidfVectorizer;
use crate::domain::model::{Decision, SparseVector};
use crate::domain::ports::{Storage, TextClassifier};
use crate::utils::error::{Result, TriageError};
use serde::{Deserialize, Serialize};

pub const MODEL_FILE: &str = "ticket_model.json";
pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";

/// One-vs-rest linear model exported as `ticket_model.json`:
/// `{"classes": [...], "coef": [[...], ...], "intercept": [...]}`.
///
/// A two-class model carries a single coefficient row whose sign picks
/// `classes[1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl LinearModel {
    pub fn new(classes: Vec<String>, coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Result<Self> {
        let model = Self {
            classes,
            coef,
            intercept,
        };
        model.check()?;
        Ok(model)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let model: Self = serde_json::from_slice(bytes)
            .map_err(|e| TriageError::model(format!("invalid model artifact: {}", e)))?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<()> {
        if self.classes.len() < 2 {
            return Err(TriageError::model(format!(
                "model needs at least two classes, found {}",
                self.classes.len()
            )));
        }

        let expected_rows = if self.classes.len() == 2 && self.coef.len() == 1 {
            1
        } else {
            self.classes.len()
        };
        if self.coef.len() != expected_rows || self.intercept.len() != expected_rows {
            return Err(TriageError::model(format!(
                "{} classes need {} coefficient rows and intercepts, found {} and {}",
                self.classes.len(),
                expected_rows,
                self.coef.len(),
                self.intercept.len()
            )));
        }

        let width = self.n_features();
        if self.coef.iter().any(|row| row.len() != width) {
            return Err(TriageError::model("coefficient rows differ in width"));
        }

        Ok(())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.coef.first().map(Vec::len).unwrap_or(0)
    }

    fn is_binary(&self) -> bool {
        self.coef.len() == 1
    }

    /// Signed distance to each class hyperplane, one score per class.
    pub fn decision_function(&self, features: &SparseVector) -> Result<Vec<f64>> {
        let width = self.n_features();
        if let Some((column, _)) = features.entries.iter().find(|(column, _)| *column >= width) {
            return Err(TriageError::prediction(format!(
                "feature column {} outside model width {}",
                column, width
            )));
        }

        let raw: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| {
                features
                    .entries
                    .iter()
                    .map(|(column, value)| row[*column] * value)
                    .sum::<f64>()
                    + bias
            })
            .collect();

        if self.is_binary() {
            Ok(vec![0.0, raw[0]])
        } else {
            Ok(raw)
        }
    }

    pub fn predict(&self, features: &SparseVector) -> Result<String> {
        let scores = self.decision_function(features)?;
        let best = argmax(&scores)
            .ok_or_else(|| TriageError::prediction("model produced no finite scores"))?;
        Ok(self.classes[best].clone())
    }
}

/// Index of the largest score; the first one wins ties.
fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if !score.is_finite() {
            return None;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Vectorizer and model loaded together from the model directory.
#[derive(Debug, Clone)]
pub struct TicketClassifier {
    vectorizer: TfidfVectorizer,
    model: LinearModel,
}

impl TicketClassifier {
    pub fn new(vectorizer: TfidfVectorizer, model: LinearModel) -> Result<Self> {
        if vectorizer.feature_count() != model.n_features() {
            return Err(TriageError::model(format!(
                "vectorizer emits {} features but model expects {}",
                vectorizer.feature_count(),
                model.n_features()
            )));
        }
        Ok(Self { vectorizer, model })
    }

    pub async fn load<S: Storage>(
        storage: &S,
        model_file: &str,
        vectorizer_file: &str,
    ) -> Result<Self> {
        tracing::debug!("Loading model artifact {}", model_file);
        let model = LinearModel::from_json_slice(&storage.read_file(model_file).await?)?;

        tracing::debug!("Loading vectorizer artifact {}", vectorizer_file);
        let vectorizer =
            TfidfVectorizer::from_json_slice(&storage.read_file(vectorizer_file).await?)?;

        let classifier = Self::new(vectorizer, model)?;
        tracing::info!(
            "Loaded classifier: {} classes, {} features, {} vocabulary terms",
            classifier.model.classes().len(),
            classifier.model.n_features(),
            classifier.vectorizer.vocabulary_len()
        );
        Ok(classifier)
    }

    /// Predicted label and raw decision scores for already-cleaned text.
    pub fn predict(&self, text: &str) -> Result<Decision> {
        let features = self.vectorizer.transform(text);
        let label = self.model.predict(&features)?;
        let scores = self.model.decision_function(&features)?;
        Ok(Decision { label, scores })
    }
}

impl TextClassifier for TicketClassifier {
    fn classes(&self) -> &[String] {
        self.model.classes()
    }

    fn decide(&self, text: &str) -> Result<Decision> {
        self.predict(text)
    }
}
