//! Weighted linear fusion of vector and keyword search results.

use std::collections::HashMap;

use docsqa_storage::Section;

use crate::types::SearchResult;

/// Merge the two sub-search result lists into one ranked candidate list.
///
/// Candidates are unioned by section identity. A candidate absent from one
/// sub-search defaults that signal to 0.0. Scores are never renormalized
/// across sub-searches; the combined score is only meaningful for relative
/// ordering, which is why reranking happens before any absolute threshold.
pub fn fuse(
    vector_results: Vec<(Section, f32)>,
    keyword_results: Vec<(Section, f32)>,
    vector_weight: f32,
    keyword_weight: f32,
) -> Vec<SearchResult> {
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, SearchResult> = HashMap::new();

    for (section, score) in vector_results {
        let id = section.section_id.clone();
        merged.insert(
            id.clone(),
            SearchResult {
                section,
                vector_score: score,
                keyword_score: 0.0,
                combined_score: 0.0,
            },
        );
        order.push(id);
    }

    for (section, score) in keyword_results {
        match merged.get_mut(&section.section_id) {
            Some(result) => result.keyword_score = score,
            None => {
                let id = section.section_id.clone();
                merged.insert(
                    id.clone(),
                    SearchResult {
                        section,
                        vector_score: 0.0,
                        keyword_score: score,
                        combined_score: 0.0,
                    },
                );
                order.push(id);
            }
        }
    }

    let mut results: Vec<SearchResult> = order
        .into_iter()
        .filter_map(|id| merged.remove(&id))
        .map(|mut result| {
            result.combined_score =
                vector_weight * result.vector_score + keyword_weight * result.keyword_score;
            result
        })
        .collect();

    // Stable sort keeps sub-search order for tied scores.
    results.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    results
}
