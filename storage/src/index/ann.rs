use doctopic_core::error::{DoctopicError, ErrorCode};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("embedding has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl DoctopicError for IndexError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}

/// Exact cosine search by linear scan. Adequate for the few hundred segments
/// of a single document.
pub struct LinearAnnIndex {
    dims: Option<usize>,
    embeddings: HashMap<u64, Vec<f32>>,
}

impl LinearAnnIndex {
    pub fn new() -> Self {
        Self {
            dims: None,
            embeddings: HashMap::new(),
        }
    }

    /// The first insert fixes the dimensionality; later inserts must match.
    pub fn insert(&mut self, id: u64, embedding: Vec<f32>) -> Result<(), IndexError> {
        match self.dims {
            Some(expected) if expected != embedding.len() => {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
            None => self.dims = Some(embedding.len()),
            _ => {}
        }
        self.embeddings.insert(id, embedding);
        Ok(())
    }

    pub fn delete(&mut self, id: u64) -> bool {
        self.embeddings.remove(&id).is_some()
    }

    /// Top-k ids by descending cosine similarity; equal scores order by id so
    /// results are stable across runs.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(u64, f32)> {
        if k == 0 {
            return Vec::new();
        }

        let mut scores: Vec<(u64, f32)> = self
            .embeddings
            .iter()
            .filter_map(|(id, emb)| cosine_similarity(query, emb).map(|score| (*id, score)))
            .collect();

        scores.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scores.truncate(k);
        scores
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

impl Default for LinearAnnIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }

    Some(dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_ranks_by_cosine() {
        let mut index = LinearAnnIndex::new();

        index.insert(1, vec![1.0, 0.0, 0.0]).unwrap();
        index.insert(2, vec![0.0, 1.0, 0.0]).unwrap();
        index.insert(3, vec![0.9, 0.1, 0.0]).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, 1);
        assert_eq!(results[1].0, 3);
    }

    #[test]
    fn ties_break_by_id() {
        let mut index = LinearAnnIndex::new();
        index.insert(9, vec![1.0, 0.0]).unwrap();
        index.insert(4, vec![1.0, 0.0]).unwrap();

        let ids: Vec<u64> = index.search(&[1.0, 0.0], 2).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let mut index = LinearAnnIndex::new();
        index.insert(1, vec![1.0, 0.0]).unwrap();

        let err = index.insert(2, vec![1.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn delete_and_zero_k() {
        let mut index = LinearAnnIndex::new();
        index.insert(1, vec![1.0, 0.0]).unwrap();

        assert!(index.search(&[1.0, 0.0], 0).is_empty());
        assert!(index.delete(1));
        assert!(!index.delete(1));
        assert!(index.is_empty());
    }
}
