//! Quality gate and confidence tiering over reranked candidates.

use docsqa_core::config::EvidenceSettings;

use crate::types::{Confidence, Evidence, FilteredEvidence, RankedSection};

/// Filters reranked sections into the final evidence set.
pub struct EvidenceFilter {
    settings: EvidenceSettings,
}

impl EvidenceFilter {
    pub fn new(settings: EvidenceSettings) -> Self {
        Self { settings }
    }

    /// Apply the quality gate, assign a confidence tier, truncate, and
    /// number citations.
    ///
    /// The tier is computed from the count of all candidates that cleared
    /// the gate, before truncation, so it reflects total available
    /// evidence. When the tier is insufficient no evidence is returned;
    /// the orchestrator must not generate an answer in that case.
    pub fn filter(&self, ranked: Vec<RankedSection>, max_sources: usize) -> FilteredEvidence {
        let mut retained: Vec<RankedSection> = ranked
            .into_iter()
            .filter(|candidate| candidate.rerank_score >= self.settings.min_score)
            .collect();

        retained.sort_by(|a, b| {
            b.rerank_score
                .partial_cmp(&a.rerank_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let confidence = self.confidence_tier(retained.len());
        if confidence == Confidence::Insufficient {
            tracing::debug!(
                "Only {} candidates cleared the quality gate, below the insufficient threshold",
                retained.len()
            );
            return FilteredEvidence {
                evidence: Vec::new(),
                confidence,
            };
        }

        retained.truncate(max_sources.min(self.settings.max_sources));

        let evidence = retained
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| Evidence {
                section: candidate.section,
                relevance_score: candidate.rerank_score,
                citation_number: i as u32 + 1,
            })
            .collect();

        FilteredEvidence {
            evidence,
            confidence,
        }
    }

    fn confidence_tier(&self, num_sources: usize) -> Confidence {
        if num_sources <= self.settings.insufficient_threshold {
            Confidence::Insufficient
        } else if num_sources < self.settings.medium_threshold {
            Confidence::Medium
        } else if num_sources < self.settings.high_threshold {
            Confidence::High
        } else {
            Confidence::VeryHigh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsqa_storage::Section;

    fn ranked(id: &str, score: f32) -> RankedSection {
        RankedSection {
            section: Section {
                section_id: id.to_string(),
                doc_id: "doc".to_string(),
                title: None,
                content: format!("content {}", id),
                embedding: None,
                doc_title: "Doc".to_string(),
                url: None,
                breadcrumb: vec![],
                has_code: false,
                has_images: false,
            },
            rerank_score: score,
        }
    }

    fn default_filter() -> EvidenceFilter {
        EvidenceFilter::new(EvidenceSettings::default())
    }

    #[test]
    fn test_quality_gate_is_absolute() {
        // min_score defaults to 0.75.
        let filtered = default_filter().filter(
            vec![ranked("a", 0.74), ranked("b", 0.5), ranked("c", 0.1)],
            5,
        );

        assert!(filtered.evidence.is_empty());
        assert_eq!(filtered.confidence, Confidence::Insufficient);
    }

    #[test]
    fn test_confidence_boundary_table() {
        // Default thresholds: insufficient=2, medium=2, high=3. With both
        // lower thresholds at the same value the medium and high bands are
        // empty, so counts jump from insufficient straight to very_high.
        let filter = default_filter();
        let expected = [
            (0, Confidence::Insufficient),
            (1, Confidence::Insufficient),
            (2, Confidence::Insufficient),
            (3, Confidence::VeryHigh),
            (4, Confidence::VeryHigh),
        ];

        for (n, confidence) in expected {
            let candidates = (0..n).map(|i| ranked(&format!("s{}", i), 0.9)).collect();
            let filtered = filter.filter(candidates, 10);
            assert_eq!(filtered.confidence, confidence, "n = {}", n);
        }
    }

    #[test]
    fn test_confidence_uses_pre_truncation_count() {
        let candidates = (0..8).map(|i| ranked(&format!("s{}", i), 0.9)).collect();
        let filtered = default_filter().filter(candidates, 2);

        assert_eq!(filtered.confidence, Confidence::VeryHigh);
        assert_eq!(filtered.evidence.len(), 2);
    }

    #[test]
    fn test_truncation_caps_at_configured_max() {
        // Configured max_sources defaults to 5; a larger caller request
        // must not exceed it.
        let candidates = (0..8).map(|i| ranked(&format!("s{}", i), 0.9)).collect();
        let filtered = default_filter().filter(candidates, 100);
        assert_eq!(filtered.evidence.len(), 5);
    }

    #[test]
    fn test_citation_numbers_contiguous_and_rank_ordered() {
        let filtered = default_filter().filter(
            vec![ranked("low", 0.8), ranked("high", 0.95), ranked("mid", 0.9)],
            5,
        );

        assert_eq!(filtered.evidence.len(), 3);
        let numbers: Vec<u32> = filtered
            .evidence
            .iter()
            .map(|ev| ev.citation_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        assert_eq!(filtered.evidence[0].section.section_id, "high");
        assert_eq!(filtered.evidence[1].section.section_id, "mid");
        assert_eq!(filtered.evidence[2].section.section_id, "low");
    }

    #[test]
    fn test_distinct_bands_when_thresholds_differ() {
        let filter = EvidenceFilter::new(EvidenceSettings {
            insufficient_threshold: 1,
            medium_threshold: 3,
            high_threshold: 5,
            ..Default::default()
        });

        let tier = |n: usize| {
            let candidates = (0..n).map(|i| ranked(&format!("s{}", i), 0.9)).collect();
            filter.filter(candidates, 10).confidence
        };

        assert_eq!(tier(1), Confidence::Insufficient);
        assert_eq!(tier(2), Confidence::Medium);
        assert_eq!(tier(3), Confidence::High);
        assert_eq!(tier(4), Confidence::High);
        assert_eq!(tier(5), Confidence::VeryHigh);
    }
}
