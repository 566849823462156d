use std::fs;
use std::path::Path;

use crate::models::catalog::{CatalogCategory, CatalogEntry};
use crate::services::cohere_service::InferenceBackend;

/// Read-only catalog collections, loaded once at process start and shared
/// across requests. The core never mutates them.
pub struct CatalogStore {
    pub flights: Vec<CatalogEntry>,
    pub hotels: Vec<CatalogEntry>,
    pub activities: Vec<CatalogEntry>,
}

impl CatalogStore {
    pub fn load(dir: &Path) -> Self {
        Self {
            flights: load_file(dir, "flights.json"),
            hotels: load_file(dir, "hotels.json"),
            activities: load_file(dir, "activities.json"),
        }
    }

    pub fn len(&self) -> usize {
        self.flights.len() + self.hotels.len() + self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pool(&self, category: CatalogCategory) -> &[CatalogEntry] {
        match category {
            CatalogCategory::Flight => &self.flights,
            CatalogCategory::Hotel => &self.hotels,
            CatalogCategory::Activity => &self.activities,
        }
    }

    /// Precompute embeddings for entries whose data files did not ship a
    /// vector, one batched call per category, run concurrently. Failures are
    /// logged and left in place; unembedded entries are simply excluded from
    /// the similarity index.
    pub async fn ensure_embeddings(&mut self, inference: &dyn InferenceBackend) {
        futures::join!(
            embed_pool(inference, &mut self.flights),
            embed_pool(inference, &mut self.hotels),
            embed_pool(inference, &mut self.activities),
        );
    }
}

async fn embed_pool(inference: &dyn InferenceBackend, entries: &mut [CatalogEntry]) {
    let pending: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.embedding.is_empty())
        .map(|(i, _)| i)
        .collect();

    if pending.is_empty() {
        return;
    }

    let texts: Vec<String> = pending.iter().map(|&i| entries[i].embedding_text()).collect();

    match inference.embed(&texts).await {
        Ok(vectors) if vectors.len() == pending.len() => {
            for (&i, vector) in pending.iter().zip(vectors) {
                entries[i].embedding = vector;
            }
        }
        Ok(vectors) => {
            eprintln!(
                "Embedding count mismatch: expected {}, got {}",
                pending.len(),
                vectors.len()
            );
        }
        Err(err) => {
            eprintln!("Failed to embed {} catalog entries: {}", pending.len(), err);
        }
    }
}

fn load_file(dir: &Path, filename: &str) -> Vec<CatalogEntry> {
    let path = dir.join(filename);
    match fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str::<Vec<CatalogEntry>>(&raw) {
            Ok(entries) => {
                println!("Loaded {} entries from {}", entries.len(), path.display());
                entries
            }
            Err(err) => {
                eprintln!("Failed to parse {}: {}", path.display(), err);
                Vec::new()
            }
        },
        Err(_) => {
            eprintln!("Warning: {} not found, using empty dataset", path.display());
            Vec::new()
        }
    }
}
