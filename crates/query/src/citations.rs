//! Citation reconciliation.
//!
//! The answer is generated against the evidence filter's numbering, but
//! the caller receives evidence sorted by relevance. Reconciliation
//! re-sorts the evidence and rewrites every in-text marker to the item's
//! final 1-based position, keeping the marker-to-source mapping bijective.

use crate::types::Evidence;

/// Re-sort evidence by relevance descending and remap in-text citation
/// markers accordingly.
///
/// Remapping runs in two passes, old number to a placeholder and then
/// placeholder to final number, so overlapping numbers never collide
/// mid-rewrite. Returned evidence carries its final citation number equal
/// to its position in the list.
pub fn reconcile(answer_text: &str, evidence: Vec<Evidence>) -> (String, Vec<Evidence>) {
    let mut sorted = evidence;
    sorted.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mapping: Vec<(u32, u32)> = sorted
        .iter()
        .enumerate()
        .map(|(i, item)| (item.citation_number, i as u32 + 1))
        .collect();

    let mut text = answer_text.to_string();
    for (old, new) in &mapping {
        text = text.replace(&format!("[{}]", old), &format!("[TEMP_{}]", new));
    }
    for (_, new) in &mapping {
        text = text.replace(&format!("[TEMP_{}]", new), &format!("[{}]", new));
    }

    for (i, item) in sorted.iter_mut().enumerate() {
        item.citation_number = i as u32 + 1;
    }

    (text, sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsqa_storage::Section;
    use std::collections::HashSet;

    fn evidence(id: &str, number: u32, score: f32) -> Evidence {
        Evidence {
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
            relevance_score: score,
            citation_number: number,
        }
    }

    #[test]
    fn test_already_sorted_is_identity() {
        let (text, sorted) = reconcile(
            "Primeiro [1]. Segundo [2].",
            vec![evidence("a", 1, 0.9), evidence("b", 2, 0.8)],
        );

        assert_eq!(text, "Primeiro [1]. Segundo [2].");
        assert_eq!(sorted[0].section.section_id, "a");
        assert_eq!(sorted[1].citation_number, 2);
    }

    #[test]
    fn test_swap_remaps_both_markers() {
        // Item 2 outranks item 1, so every [2] becomes [1] and vice versa.
        let (text, sorted) = reconcile(
            "Fraco [1]. Forte [2]. Ambos [1][2].",
            vec![evidence("weak", 1, 0.76), evidence("strong", 2, 0.95)],
        );

        assert_eq!(text, "Fraco [2]. Forte [1]. Ambos [2][1].");
        assert_eq!(sorted[0].section.section_id, "strong");
        assert_eq!(sorted[0].citation_number, 1);
        assert_eq!(sorted[1].section.section_id, "weak");
        assert_eq!(sorted[1].citation_number, 2);
    }

    #[test]
    fn test_remap_is_bijective_under_rotation() {
        // Generation-time numbers 1,2,3 end up rotated by the relevance
        // sort; no marker may be dropped or duplicated.
        let (text, sorted) = reconcile(
            "A [1]. B [2]. C [3].",
            vec![
                evidence("a", 1, 0.80),
                evidence("b", 2, 0.95),
                evidence("c", 3, 0.90),
            ],
        );

        assert_eq!(text, "A [3]. B [1]. C [2].");

        let final_numbers: HashSet<u32> =
            sorted.iter().map(|item| item.citation_number).collect();
        assert_eq!(final_numbers, HashSet::from([1, 2, 3]));
        for (i, item) in sorted.iter().enumerate() {
            assert_eq!(item.citation_number, i as u32 + 1);
        }
        assert!(sorted.windows(2).all(|w| w[0].relevance_score >= w[1].relevance_score));
    }

    #[test]
    fn test_double_digit_markers_do_not_collide() {
        let mut items: Vec<Evidence> = (1..=10)
            .map(|n| evidence(&format!("s{}", n), n, 0.7 + 0.01 * n as f32))
            .collect();
        // Highest score last, so order fully reverses.
        let text_in: String = (1..=10).map(|n| format!("[{}]", n)).collect();

        let (text, sorted) = reconcile(&text_in, std::mem::take(&mut items));

        let expected: String = (1..=10).rev().map(|n| format!("[{}]", n)).collect();
        assert_eq!(text, expected);
        assert_eq!(sorted[0].section.section_id, "s10");
        assert_eq!(sorted[9].section.section_id, "s1");
    }

    #[test]
    fn test_empty_evidence() {
        let (text, sorted) = reconcile("sem fontes", vec![]);
        assert_eq!(text, "sem fontes");
        assert!(sorted.is_empty());
    }
}
