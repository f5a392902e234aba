#![allow(dead_code)]

//! Sparse term-weight vectors keyed by term id.

use serde::Serialize;

/// `(term_id, weight)` pairs sorted by term id, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Builds a vector from arbitrary pairs; repeated ids are summed, zero weights dropped.
    pub fn from_pairs(mut pairs: Vec<(usize, f32)>) -> Self {
        pairs.sort_unstable_by_key(|&(id, _)| id);
        let mut entries: Vec<(usize, f32)> = Vec::with_capacity(pairs.len());
        for (id, weight) in pairs {
            match entries.last_mut() {
                Some((last, w)) if *last == id => *w += weight,
                _ => entries.push((id, weight)),
            }
        }
        entries.retain(|&(_, w)| w != 0.0 && w.is_finite());
        Self { entries }
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Scales to unit length. A zero vector stays zero.
    pub fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }

    /// Merge-join dot product.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_id, a_w) = self.entries[i];
            let (b_id, b_w) = other.entries[j];
            match a_id.cmp(&b_id) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn weight(&self, term_id: usize) -> f32 {
        self.entries
            .binary_search_by_key(&term_id, |&(id, _)| id)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }
}
