//! Ingestion orchestration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use docsqa_core::config::IngestionSettings;
use docsqa_core::{AppResult, Settings};
use docsqa_providers::{create_embedder, create_vision, EmbeddingClient};
use docsqa_storage::{NewDocument, NewImage, NewSection, Store};
use serde::Serialize;

use crate::fetcher;
use crate::images::ImageProcessor;
use crate::markdown::{self, ParsedDocument};

/// Counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IngestionReport {
    pub processed_files: usize,
    pub added_documents: usize,
    pub updated_documents: usize,
    pub removed_documents: usize,
    pub duration_ms: u64,
}

/// Runs the ingestion pipeline: scan, parse, describe images, embed,
/// write.
pub struct IngestionService {
    store: Arc<Store>,
    embedder: Arc<dyn EmbeddingClient>,
    image_processor: ImageProcessor,
    settings: IngestionSettings,
}

impl IngestionService {
    pub fn new(settings: &Settings, store: Arc<Store>) -> AppResult<Self> {
        let embedder = create_embedder(&settings.models.embedding)?;
        let vision = create_vision(&settings.models.vision)?;

        Ok(Self {
            image_processor: ImageProcessor::new(store.clone(), vision),
            store,
            embedder,
            settings: settings.ingestion.clone(),
        })
    }

    /// Ingest every markdown file under the configured docs directory and
    /// prune documents whose source file has disappeared.
    pub async fn ingest_all(&self) -> AppResult<IngestionReport> {
        let files = fetcher::fetch_markdown_files(&self.settings.docs_dir)?;
        let mut report = self.ingest_files(&files).await?;

        // Full scans are authoritative: anything indexed but no longer on
        // disk is removed.
        let on_disk: Vec<String> = files
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect();
        for indexed in self.store.document_paths()? {
            if !on_disk.contains(&indexed) {
                tracing::info!("Pruning document with missing source: {}", indexed);
                let outcome = self.store.remove_document(&indexed)?;
                report.removed_documents += outcome.deleted;
            }
        }

        Ok(report)
    }

    /// Ingest a specific set of markdown files.
    ///
    /// Unchanged documents (same content hash) are skipped by the store;
    /// embeddings are still computed before the gate is consulted, so
    /// callers wanting cheap re-runs should rely on the report counters
    /// rather than timing.
    pub async fn ingest_files(&self, files: &[PathBuf]) -> AppResult<IngestionReport> {
        let start = Instant::now();
        let mut report = IngestionReport::default();

        tracing::info!("Starting ingestion of {} files", files.len());

        for (idx, file_path) in files.iter().enumerate() {
            tracing::info!(
                "Processing file {}/{}: {:?}",
                idx + 1,
                files.len(),
                file_path
            );

            let parsed = markdown::parse_file(
                file_path,
                &self.settings.docs_dir,
                self.settings.docs_base_url.as_deref(),
            )?;

            let base_dir = file_path.parent().unwrap_or(&self.settings.docs_dir);
            let image_hashes = self
                .image_processor
                .process(&parsed.all_images(), base_dir)
                .await?;

            let document = self.to_new_document(parsed, &image_hashes).await?;
            let outcome = self.store.upsert_document(&document)?;

            report.processed_files += 1;
            report.added_documents += outcome.added;
            report.updated_documents += outcome.updated;
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Ingestion completed: {} files, {} added, {} updated in {} ms",
            report.processed_files,
            report.added_documents,
            report.updated_documents,
            report.duration_ms
        );

        Ok(report)
    }

    async fn to_new_document(
        &self,
        parsed: ParsedDocument,
        image_hashes: &std::collections::HashMap<String, String>,
    ) -> AppResult<NewDocument> {
        // Title plus content per section, embedded in one batch.
        let texts: Vec<String> = parsed
            .sections
            .iter()
            .map(|section| match &section.title {
                Some(title) => format!("{}\n\n{}", title, section.content),
                None => section.content.clone(),
            })
            .collect();

        let embeddings = self.embedder.embed_batch(&texts).await?;

        let sections = parsed
            .sections
            .into_iter()
            .enumerate()
            .map(|(i, section)| NewSection {
                title: section.title,
                content: section.content,
                embedding: embeddings.get(i).cloned(),
                section_order: section.order,
                has_code: section.has_code,
                has_images: section.has_images,
                images: section
                    .images
                    .into_iter()
                    .filter_map(|image| {
                        image_hashes.get(&image.path).map(|hash| NewImage {
                            image_hash: hash.clone(),
                            image_path: image.path,
                            alt_text: image.alt_text,
                        })
                    })
                    .collect(),
            })
            .collect();

        Ok(NewDocument {
            title: parsed.title,
            url: parsed.url,
            file_path: parsed.file_path,
            breadcrumb: parsed.breadcrumb,
            content_hash: parsed.content_hash,
            sections,
        })
    }
}
