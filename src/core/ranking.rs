use crate::domain::model::ClassScore;
use crate::utils::error::{Result, TriageError};

/// Number of entries returned as `top_classes`.
pub const TOP_CLASSES: usize = 3;

/// Softmax over decision scores, paired with labels and sorted high to low.
///
/// The sort is stable, so equal probabilities keep class order and the
/// first entry always matches an argmax that prefers the lowest index.
pub fn rank(classes: &[String], scores: &[f64]) -> Result<Vec<ClassScore>> {
    if classes.len() != scores.len() {
        return Err(TriageError::prediction(format!(
            "{} labels but {} scores",
            classes.len(),
            scores.len()
        )));
    }
    if scores.is_empty() {
        return Err(TriageError::prediction("no scores to rank"));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(TriageError::prediction("non-finite decision score"));
    }

    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exp.iter().sum();

    let mut ranked: Vec<ClassScore> = classes
        .iter()
        .zip(exp)
        .map(|(label, e)| ClassScore {
            label: label.clone(),
            score: e / total,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(ranked)
}

/// Probability assigned to `label`.
pub fn confidence_of(ranked: &[ClassScore], label: &str) -> Result<f64> {
    ranked
        .iter()
        .find(|entry| entry.label == label)
        .map(|entry| entry.score)
        .ok_or_else(|| TriageError::prediction(format!("predicted label {:?} not ranked", label)))
}

pub fn top_classes(ranked: &[ClassScore]) -> Vec<ClassScore> {
    ranked.iter().take(TOP_CLASSES).cloned().collect()
}
