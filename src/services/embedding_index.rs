use rayon::prelude::*;

use crate::db::catalog::CatalogStore;
use crate::models::catalog::{CatalogCategory, CatalogEntry, RankedCandidate};

/// Read-only similarity index over the embedded catalog, shared across
/// concurrent requests. Ranking is a fresh computation per call.
pub struct EmbeddingIndex {
    flights: Vec<CatalogEntry>,
    hotels: Vec<CatalogEntry>,
    activities: Vec<CatalogEntry>,
}

impl EmbeddingIndex {
    /// Build pools from the catalog store, keeping only entries that carry a
    /// precomputed embedding.
    pub fn build(store: &CatalogStore) -> Self {
        let keep = |entries: &[CatalogEntry]| -> Vec<CatalogEntry> {
            entries
                .iter()
                .filter(|entry| !entry.embedding.is_empty())
                .cloned()
                .collect()
        };

        let flights = keep(&store.flights);
        let hotels = keep(&store.hotels);
        let activities = keep(&store.activities);

        let skipped = (store.flights.len() - flights.len())
            + (store.hotels.len() - hotels.len())
            + (store.activities.len() - activities.len());
        if skipped > 0 {
            eprintln!("EmbeddingIndex: skipped {} catalog entries without embeddings", skipped);
        }
        println!(
            "EmbeddingIndex built: {} flights, {} hotels, {} activities",
            flights.len(),
            hotels.len(),
            activities.len()
        );

        Self { flights, hotels, activities }
    }

    pub fn pool(&self, category: CatalogCategory) -> &[CatalogEntry] {
        match category {
            CatalogCategory::Flight => &self.flights,
            CatalogCategory::Hotel => &self.hotels,
            CatalogCategory::Activity => &self.activities,
        }
    }

    pub fn pool_size(&self, category: CatalogCategory) -> usize {
        self.pool(category).len()
    }

    /// Rank a category pool against a query vector: cosine similarity
    /// descending, ties broken by ascending cost then title, so identical
    /// inputs always produce identical output.
    pub fn rank(&self, query: &[f32], category: CatalogCategory) -> Vec<RankedCandidate> {
        let mut scored: Vec<RankedCandidate> = self
            .pool(category)
            .par_iter()
            .map(|entry| RankedCandidate {
                entry: entry.clone(),
                score: cosine_similarity(query, &entry.embedding),
                within_budget: true,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.entry.cost_cents.cmp(&b.entry.cost_cents))
                .then_with(|| a.entry.title.cmp(&b.entry.title))
        });
        scored
    }

    /// Rank every pool at once, for the catalog-wide semantic search
    /// endpoint.
    pub fn rank_all(&self, query: &[f32], limit: usize) -> Vec<RankedCandidate> {
        let mut all = Vec::new();
        for category in [CatalogCategory::Flight, CatalogCategory::Hotel, CatalogCategory::Activity]
        {
            all.extend(self.rank(query, category));
        }
        all.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.entry.cost_cents.cmp(&b.entry.cost_cents))
                .then_with(|| a.entry.title.cmp(&b.entry.title))
        });
        all.truncate(limit);
        all
    }
}

/// Cosine similarity on raw vectors; normalization is applied here so
/// callers may pass unnormalized embeddings. Mismatched or empty vectors
/// score zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
