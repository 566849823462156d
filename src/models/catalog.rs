use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogCategory {
    Flight,
    Hotel,
    Activity,
}

impl CatalogCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogCategory::Flight => "flight",
            CatalogCategory::Hotel => "hotel",
            CatalogCategory::Activity => "activity",
        }
    }
}

/// Static reference data owned by the catalog store. Costs are per person
/// for flights and activities and per night for hotels, in integer cents.
/// The embedding vector is precomputed at process start and never serialized
/// back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub category: CatalogCategory,
    pub title: String,
    pub location: String,
    pub cost_cents: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing)]
    pub embedding: Vec<f32>,
}

impl CatalogEntry {
    /// Text representation submitted to the embedding model, mirroring how
    /// entries are described in the catalog files.
    pub fn embedding_text(&self) -> String {
        format!("{} {} {}", self.title, self.location, self.tags.join(" "))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// A catalog entry scored against a query. Produced fresh per request.
/// `within_budget` is false only when the cost filter had to be relaxed and
/// this entry exceeds its category cap.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub entry: CatalogEntry,
    pub score: f32,
    pub within_budget: bool,
}
