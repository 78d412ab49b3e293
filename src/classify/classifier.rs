use std::collections::BTreeMap;

use crate::error::Result;

/// Class label → confidence. Keys are unique; no ordering is implied.
pub type ClassificationScores = BTreeMap<String, f64>;

/// Maps (model id, image id) to per-label confidence scores.
///
/// Implementations must be shareable across request threads. Any failure,
/// including an unknown model id, is reported as
/// [`Error::Classification`](crate::Error::Classification).
pub trait Classifier: Send + Sync {
    fn classify(&self, model_id: &str, image_id: &str) -> Result<ClassificationScores>;
}

/// Scores sorted by descending confidence, ties broken by label.
pub fn ranked(scores: &ClassificationScores) -> Vec<(&str, f64)> {
    let mut out: Vec<(&str, f64)> = scores.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    out
}
