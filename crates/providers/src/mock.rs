//! Deterministic mock providers for tests and offline development.
//!
//! The mock embedder hashes character trigrams and word frequencies into a
//! fixed-dimension vector: not semantically accurate, but consistent and
//! content-dependent, which is enough to exercise the retrieval pipeline.

use std::collections::{HashMap, HashSet};

use docsqa_core::AppResult;
use regex::Regex;

use crate::client::{EmbeddingClient, Generation, GenerationClient, RerankClient, VisionClient};

/// Filler words skipped before hashing so that embeddings are driven by
/// content-bearing terms.
const MOCK_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "uma", "que",
    "como", "para", "com", "dos", "das", "por",
];

/// Mock embedding provider.
#[derive(Debug)]
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn generate_mock_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower.split_whitespace() {
            if word.len() > 2 && !MOCK_STOP_WORDS.contains(&word) {
                *word_freq.entry(word).or_insert(0) += 1;
            }
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3) {
                let hash = trigram
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                embedding[hash as usize % self.dimensions] += (*freq as f32).sqrt();
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for MockEmbedder {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_mock_embedding(text))
            .collect())
    }
}

/// Mock reranker scoring by query-term overlap.
///
/// Score = |query terms ∩ text terms| / |query terms|, case-insensitive.
/// A text containing every query term scores 1.0; one containing none
/// scores 0.0.
#[derive(Debug, Default)]
pub struct MockReranker;

impl MockReranker {
    pub fn new() -> Self {
        Self
    }

    fn overlap_score(query: &str, text: &str) -> f32 {
        let query_terms: HashSet<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.len() > 2)
            .map(str::to_string)
            .collect();

        if query_terms.is_empty() {
            return 0.0;
        }

        let text_lower = text.to_lowercase();
        let hits = query_terms
            .iter()
            .filter(|term| text_lower.contains(term.as_str()))
            .count();

        hits as f32 / query_terms.len() as f32
    }
}

#[async_trait::async_trait]
impl RerankClient for MockReranker {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "overlap-v1"
    }

    async fn score_batch(&self, query: &str, texts: &[String]) -> AppResult<Vec<f32>> {
        Ok(texts
            .iter()
            .map(|text| Self::overlap_score(query, text))
            .collect())
    }
}

/// Mock generator producing an answer that cites every labeled source in
/// the user prompt.
#[derive(Debug, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl GenerationClient for MockGenerator {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "canned-v1"
    }

    async fn generate(&self, _system_prompt: &str, user_prompt: &str) -> AppResult<Generation> {
        // Count source labels the same way callers embed them: a citation
        // tag alone at the start of a line.
        let label_re = Regex::new(r"(?m)^\[(\d+)\]").expect("static regex");
        let max_label = label_re
            .captures_iter(user_prompt)
            .filter_map(|cap| cap[1].parse::<u32>().ok())
            .max()
            .unwrap_or(0);

        let text = if max_label == 0 {
            "Não encontrei informação suficiente nas fontes que me foram indexadas como contexto."
                .to_string()
        } else {
            (1..=max_label)
                .map(|n| format!("De acordo com a documentação, este ponto é suportado [{}].", n))
                .collect::<Vec<_>>()
                .join(" ")
        };

        Ok(Generation {
            text,
            latency_ms: 1,
        })
    }
}

/// Mock vision client describing images by size only.
#[derive(Debug, Default)]
pub struct MockVision;

impl MockVision {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl VisionClient for MockVision {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "null-v1"
    }

    async fn describe_image(&self, image: &[u8]) -> AppResult<String> {
        Ok(format!("Imagem técnica ({} bytes)", image.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedder_deterministic_and_normalized() {
        let embedder = MockEmbedder::new(384);
        let a = embedder.embed("como executar testes").await.unwrap();
        let b = embedder.embed("como executar testes").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_mock_embedder_distinguishes_texts() {
        let embedder = MockEmbedder::new(384);
        let a = embedder.embed("jenkins pipeline testing").await.unwrap();
        let b = embedder.embed("database migration guide").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_mock_reranker_overlap() {
        let reranker = MockReranker::new();
        let texts = vec![
            "Executar testes no Jenkins é simples".to_string(),
            "Receitas de bolo de chocolate".to_string(),
        ];
        let scores = reranker
            .score_batch("executar testes jenkins", &texts)
            .await
            .unwrap();

        assert_eq!(scores.len(), 2);
        assert!(scores[0] > 0.9);
        assert_eq!(scores[1], 0.0);
    }

    #[tokio::test]
    async fn test_mock_generator_cites_every_source() {
        let generator = MockGenerator::new();
        let user_prompt = "[1]\nDocument: A\nContent:\nfoo\n\n[2]\nDocument: B\nContent:\nbar\n";
        let generation = generator.generate("sys", user_prompt).await.unwrap();

        assert!(generation.text.contains("[1]"));
        assert!(generation.text.contains("[2]"));
        assert!(!generation.text.contains("[3]"));
    }

    #[tokio::test]
    async fn test_mock_generator_without_sources() {
        let generator = MockGenerator::new();
        let generation = generator.generate("sys", "no labels here").await.unwrap();
        assert!(generation.text.contains("Não encontrei"));
    }
}
