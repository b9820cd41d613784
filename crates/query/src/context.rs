//! Formats the evidence set into the labeled prompt block for the LLM.

use std::sync::Arc;

use docsqa_core::AppResult;
use docsqa_storage::Store;

use crate::types::Evidence;

const BLOCK_SEPARATOR_WIDTH: usize = 80;

/// Serializes evidence into the context string.
///
/// Pure formatting; the citation numbers assigned by the evidence filter
/// pass through unchanged. This string is the only channel by which the
/// LLM learns which number corresponds to which source.
pub struct ContextBuilder {
    store: Arc<Store>,
}

impl ContextBuilder {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn build(&self, evidence: &[Evidence]) -> AppResult<String> {
        let mut parts: Vec<String> = Vec::new();

        for item in evidence {
            let section = &item.section;

            let mut header = format!("[{}]\n", item.citation_number);
            header.push_str(&format!("Document: {}\n", section.doc_title));
            if let Some(title) = &section.title {
                header.push_str(&format!("Section: {}\n", title));
            }
            if !section.breadcrumb.is_empty() {
                header.push_str(&format!("Path: {}\n", section.breadcrumb.join(" > ")));
            }
            parts.push(header);

            if section.has_images {
                let descriptions = self
                    .store
                    .image_descriptions_for_section(&section.section_id)?;
                if !descriptions.is_empty() {
                    parts.push("\n[Images in this section]".to_string());
                    for description in descriptions {
                        parts.push(format!("- {}", description));
                    }
                    parts.push(String::new());
                }
            }

            parts.push(format!("Content:\n{}\n", section.content));
            parts.push(format!("{}\n", "-".repeat(BLOCK_SEPARATOR_WIDTH)));
        }

        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsqa_storage::{NewDocument, NewImage, NewSection, Section};

    fn evidence_for(section: Section, number: u32) -> Evidence {
        Evidence {
            section,
            relevance_score: 0.9,
            citation_number: number,
        }
    }

    fn plain_section(id: &str, content: &str) -> Section {
        Section {
            section_id: id.to_string(),
            doc_id: "doc".to_string(),
            title: Some("Execução".to_string()),
            content: content.to_string(),
            embedding: None,
            doc_title: "Guia de Testes".to_string(),
            url: None,
            breadcrumb: vec!["Engenharia".to_string(), "Testes".to_string()],
            has_code: false,
            has_images: false,
        }
    }

    #[test]
    fn test_build_labels_every_block() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let builder = ContextBuilder::new(store);

        let context = builder
            .build(&[
                evidence_for(plain_section("s1", "Primeiro conteudo."), 1),
                evidence_for(plain_section("s2", "Segundo conteudo."), 2),
            ])
            .unwrap();

        assert!(context.contains("[1]\nDocument: Guia de Testes"));
        assert!(context.contains("[2]\nDocument: Guia de Testes"));
        assert!(context.contains("Section: Execução"));
        assert!(context.contains("Path: Engenharia > Testes"));
        assert!(context.contains("Content:\nPrimeiro conteudo."));
        assert!(context.contains(&"-".repeat(80)));
    }

    #[test]
    fn test_build_includes_cached_image_descriptions() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        store
            .upsert_document(&NewDocument {
                title: "Guia".to_string(),
                url: None,
                file_path: "docs/guia.md".to_string(),
                breadcrumb: vec![],
                content_hash: "h1".to_string(),
                sections: vec![NewSection {
                    title: None,
                    content: "Veja o diagrama da arquitetura.".to_string(),
                    embedding: None,
                    section_order: 0,
                    has_code: false,
                    has_images: true,
                    images: vec![NewImage {
                        image_hash: "imghash".to_string(),
                        image_path: "images/arch.png".to_string(),
                        alt_text: None,
                    }],
                }],
            })
            .unwrap();
        store
            .cache_image_description("imghash", "Diagrama com tres camadas")
            .unwrap();

        let (section, _) = store.keyword_search("diagrama", 1).unwrap().remove(0);
        let builder = ContextBuilder::new(store);
        let context = builder.build(&[evidence_for(section, 1)]).unwrap();

        assert!(context.contains("[Images in this section]"));
        assert!(context.contains("- Diagrama com tres camadas"));
    }

    #[test]
    fn test_build_empty_evidence() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let builder = ContextBuilder::new(store);
        assert_eq!(builder.build(&[]).unwrap(), "");
    }
}
