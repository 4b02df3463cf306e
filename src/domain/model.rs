use serde::{Deserialize, Serialize};

/// Incoming ticket as posted to `/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Ticket {
    /// Text fed to the cleaner: subject and body joined by one space.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.subject, self.body)
    }

    /// The user id, if it is present and non-empty.
    pub fn owner(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub category: String,
    pub confidence: f64,
    pub top_classes: Vec<ClassScore>,
}

/// Raw classifier output before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub label: String,
    pub scores: Vec<f64>,
}

/// Row written to the `history` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub user_id: String,
    pub subject: String,
    pub body: String,
    pub predicted_category: String,
}

/// Sparse feature vector: `(column, value)` pairs sorted by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(usize, f64)>,
}
