//! SQLite store for documents, sections, image descriptions and traces.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use docsqa_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::records::{
    DocumentStats, NewDocument, NewTrace, Section, TraceDetail, TraceDetailCitation, WriteOutcome,
};

/// Handle over the SQLite database.
///
/// A single connection guarded by a mutex. Writes happen inside one
/// transaction per logical unit (one document, one trace), so a failed
/// write leaves no partial rows behind.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (and initialize) the database at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;

        create_tables(&conn)?;
        tracing::debug!("Opened database at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Storage(format!("Failed to open in-memory database: {}", e)))?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Storage("Database lock poisoned".to_string()))
    }

    /// Write a document and its sections, gated on the content hash.
    ///
    /// An unchanged document (same `file_path`, same `content_hash`) is a
    /// no-op. A changed one has its sections replaced wholesale. Everything
    /// runs in one transaction.
    pub fn upsert_document(&self, doc: &NewDocument) -> AppResult<WriteOutcome> {
        let conn = self.lock()?;

        let existing: Option<(String, String)> = conn
            .query_row(
                "SELECT doc_id, content_hash FROM documents WHERE file_path = ?1",
                params![doc.file_path],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| AppError::Storage(format!("Failed to look up document: {}", e)))?;

        if let Some((_, hash)) = &existing {
            if hash == &doc.content_hash {
                tracing::debug!("Document unchanged, skipping: {}", doc.file_path);
                return Ok(WriteOutcome::default());
            }
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| AppError::Storage(format!("Failed to begin transaction: {}", e)))?;

        let now = Utc::now().to_rfc3339();
        let breadcrumb_json = serde_json::to_string(&doc.breadcrumb)?;

        let (doc_id, outcome) = match existing {
            Some((doc_id, _)) => {
                tx.execute(
                    "DELETE FROM sections_fts WHERE doc_id = ?1",
                    params![doc_id],
                )
                .map_err(|e| AppError::Storage(format!("Failed to clear search rows: {}", e)))?;
                tx.execute(
                    "DELETE FROM section_images WHERE section_id IN
                     (SELECT section_id FROM sections WHERE doc_id = ?1)",
                    params![doc_id],
                )
                .map_err(|e| AppError::Storage(format!("Failed to clear image rows: {}", e)))?;
                tx.execute("DELETE FROM sections WHERE doc_id = ?1", params![doc_id])
                    .map_err(|e| AppError::Storage(format!("Failed to clear sections: {}", e)))?;
                tx.execute(
                    "UPDATE documents SET title = ?1, url = ?2, breadcrumb = ?3,
                     content_hash = ?4, updated_at = ?5 WHERE doc_id = ?6",
                    params![
                        doc.title,
                        doc.url,
                        breadcrumb_json,
                        doc.content_hash,
                        now,
                        doc_id
                    ],
                )
                .map_err(|e| AppError::Storage(format!("Failed to update document: {}", e)))?;

                (
                    doc_id,
                    WriteOutcome {
                        updated: 1,
                        ..Default::default()
                    },
                )
            }
            None => {
                let doc_id = Uuid::new_v4().to_string();
                tx.execute(
                    "INSERT INTO documents
                     (doc_id, title, url, file_path, breadcrumb, content_hash, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                    params![
                        doc_id,
                        doc.title,
                        doc.url,
                        doc.file_path,
                        breadcrumb_json,
                        doc.content_hash,
                        now
                    ],
                )
                .map_err(|e| AppError::Storage(format!("Failed to insert document: {}", e)))?;

                (
                    doc_id,
                    WriteOutcome {
                        added: 1,
                        ..Default::default()
                    },
                )
            }
        };

        for section in &doc.sections {
            let section_id = Uuid::new_v4().to_string();
            let embedding_bytes = section.embedding.as_deref().map(embedding_to_bytes);

            tx.execute(
                "INSERT INTO sections
                 (section_id, doc_id, title, content, embedding, section_order, has_code, has_images)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    section_id,
                    doc_id,
                    section.title,
                    section.content,
                    embedding_bytes,
                    section.section_order as i64,
                    section.has_code,
                    section.has_images
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to insert section: {}", e)))?;

            tx.execute(
                "INSERT INTO sections_fts (section_id, doc_id, title, content)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    section_id,
                    doc_id,
                    section.title.as_deref().unwrap_or(""),
                    section.content
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to index section: {}", e)))?;

            for image in &section.images {
                tx.execute(
                    "INSERT OR REPLACE INTO section_images
                     (section_id, image_hash, image_path, alt_text)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![section_id, image.image_hash, image.image_path, image.alt_text],
                )
                .map_err(|e| AppError::Storage(format!("Failed to insert image row: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit document: {}", e)))?;

        tracing::debug!(
            "Wrote document {} ({} sections)",
            doc.file_path,
            doc.sections.len()
        );
        Ok(outcome)
    }

    /// Remove a document (and its sections) by source file path.
    pub fn remove_document(&self, file_path: &str) -> AppResult<WriteOutcome> {
        let conn = self.lock()?;

        let doc_id: Option<String> = conn
            .query_row(
                "SELECT doc_id FROM documents WHERE file_path = ?1",
                params![file_path],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Storage(format!("Failed to look up document: {}", e)))?;

        let Some(doc_id) = doc_id else {
            return Ok(WriteOutcome::default());
        };

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| AppError::Storage(format!("Failed to begin transaction: {}", e)))?;

        tx.execute(
            "DELETE FROM sections_fts WHERE doc_id = ?1",
            params![doc_id],
        )
        .map_err(|e| AppError::Storage(format!("Failed to clear search rows: {}", e)))?;
        tx.execute(
            "DELETE FROM section_images WHERE section_id IN
             (SELECT section_id FROM sections WHERE doc_id = ?1)",
            params![doc_id],
        )
        .map_err(|e| AppError::Storage(format!("Failed to clear image rows: {}", e)))?;
        tx.execute("DELETE FROM sections WHERE doc_id = ?1", params![doc_id])
            .map_err(|e| AppError::Storage(format!("Failed to delete sections: {}", e)))?;
        tx.execute("DELETE FROM documents WHERE doc_id = ?1", params![doc_id])
            .map_err(|e| AppError::Storage(format!("Failed to delete document: {}", e)))?;

        tx.commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit removal: {}", e)))?;

        tracing::debug!("Removed document {}", file_path);
        Ok(WriteOutcome {
            deleted: 1,
            ..Default::default()
        })
    }

    /// All indexed source file paths. Used to prune documents whose source
    /// files no longer exist.
    pub fn document_paths(&self) -> AppResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT file_path FROM documents ORDER BY file_path")
            .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        let paths = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| AppError::Storage(format!("Failed to list documents: {}", e)))?
            .collect::<Result<Vec<String>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to read document row: {}", e)))?;

        Ok(paths)
    }

    /// Top-k sections by cosine similarity against `query_embedding`.
    ///
    /// Sections without an embedding are skipped. Scores are raw cosine
    /// similarity, higher is better.
    pub fn vector_search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<(Section, f32)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "{} WHERE s.embedding IS NOT NULL",
                SECTION_SELECT
            ))
            .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        let sections = stmt
            .query_map([], section_from_row)
            .map_err(|e| AppError::Storage(format!("Failed to query sections: {}", e)))?
            .collect::<Result<Vec<Section>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to read section row: {}", e)))?;

        let mut results: Vec<(Section, f32)> = sections
            .into_iter()
            .filter_map(|section| {
                let embedding = section.embedding.as_deref()?;
                let score = cosine_similarity(query_embedding, embedding);
                Some((section, score))
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        tracing::debug!("Vector search returned {} sections", results.len());
        Ok(results)
    }

    /// Top-k sections by full-text match against `query`.
    ///
    /// The query is reduced to its alphanumeric terms joined with OR, so
    /// user punctuation never reaches the FTS parser. Scores are negated
    /// bm25 ranks, higher is better. Queries with no indexable terms
    /// return an empty list.
    pub fn keyword_search(&self, query: &str, top_k: usize) -> AppResult<Vec<(Section, f32)>> {
        let Some(match_expr) = fts_match_expression(query) else {
            return Ok(Vec::new());
        };

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT section_id, -bm25(sections_fts) AS rank
                 FROM sections_fts WHERE sections_fts MATCH ?1
                 ORDER BY rank DESC LIMIT ?2",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        let ranked = stmt
            .query_map(params![match_expr, top_k as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)? as f32))
            })
            .map_err(|e| AppError::Storage(format!("Failed to run keyword search: {}", e)))?
            .collect::<Result<Vec<(String, f32)>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to read search row: {}", e)))?;

        let mut results = Vec::with_capacity(ranked.len());
        for (section_id, score) in ranked {
            if let Some(section) = load_section(&conn, &section_id)? {
                results.push((section, score));
            }
        }

        tracing::debug!("Keyword search returned {} sections", results.len());
        Ok(results)
    }

    /// Cached image descriptions for a section's images, keyed by the
    /// image content hash. Images not yet described are omitted.
    pub fn image_descriptions_for_section(&self, section_id: &str) -> AppResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT si.alt_text, ic.description
                 FROM section_images si
                 JOIN image_cache ic ON ic.image_hash = si.image_hash
                 WHERE si.section_id = ?1
                 ORDER BY si.image_path",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        let descriptions = stmt
            .query_map(params![section_id], |row| {
                let alt_text: Option<String> = row.get(0)?;
                let description: String = row.get(1)?;
                Ok(match alt_text {
                    Some(alt) if !alt.is_empty() => format!("{}: {}", alt, description),
                    _ => description,
                })
            })
            .map_err(|e| AppError::Storage(format!("Failed to query image rows: {}", e)))?
            .collect::<Result<Vec<String>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to read image row: {}", e)))?;

        Ok(descriptions)
    }

    /// Look up a cached image description by content hash.
    pub fn cached_image_description(&self, image_hash: &str) -> AppResult<Option<String>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT description FROM image_cache WHERE image_hash = ?1",
            params![image_hash],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| AppError::Storage(format!("Failed to read image cache: {}", e)))
    }

    /// Cache an image description, keyed by content hash.
    pub fn cache_image_description(&self, image_hash: &str, description: &str) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO image_cache (image_hash, description, created_at)
             VALUES (?1, ?2, ?3)",
            params![image_hash, description, Utc::now().to_rfc3339()],
        )
        .map_err(|e| AppError::Storage(format!("Failed to write image cache: {}", e)))?;
        Ok(())
    }

    /// Persist a complete query trace in one transaction.
    pub fn log_trace(&self, trace: &NewTrace) -> AppResult<()> {
        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| AppError::Storage(format!("Failed to begin transaction: {}", e)))?;

        tx.execute(
            "INSERT INTO query_traces
             (trace_id, query_text, user_id, confidence,
              embedding_model, reranker_model, llm_model, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                trace.trace_id,
                trace.query_text,
                trace.user_id,
                trace.confidence,
                trace.embedding_model,
                trace.reranker_model,
                trace.llm_model,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e| AppError::Storage(format!("Failed to insert trace: {}", e)))?;

        for citation in &trace.citations {
            tx.execute(
                "INSERT INTO trace_citations
                 (trace_id, citation_number, section_id, relevance_score,
                  doc_title, section_title, url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    trace.trace_id,
                    citation.citation_number,
                    citation.section_id,
                    citation.relevance_score as f64,
                    citation.doc_title,
                    citation.section_title,
                    citation.url
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to insert trace citation: {}", e)))?;
        }

        tx.execute(
            "INSERT INTO trace_answers (trace_id, answer_text, generation_time_ms, token_count)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                trace.trace_id,
                trace.answer.answer_text,
                trace.answer.generation_time_ms as i64,
                trace.answer.token_count as i64
            ],
        )
        .map_err(|e| AppError::Storage(format!("Failed to insert trace answer: {}", e)))?;

        tx.commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit trace: {}", e)))?;

        tracing::debug!("Logged trace {}", trace.trace_id);
        Ok(())
    }

    /// Load a persisted trace with its citations and answer.
    pub fn load_trace(&self, trace_id: &str) -> AppResult<Option<TraceDetail>> {
        let conn = self.lock()?;

        let header = conn
            .query_row(
                "SELECT t.query_text, t.user_id, t.confidence, t.created_at,
                        t.embedding_model, t.reranker_model, t.llm_model,
                        a.answer_text, a.generation_time_ms, a.token_count
                 FROM query_traces t
                 JOIN trace_answers a ON a.trace_id = t.trace_id
                 WHERE t.trace_id = ?1",
                params![trace_id],
                |row| {
                    Ok(TraceDetail {
                        trace_id: trace_id.to_string(),
                        query_text: row.get(0)?,
                        user_id: row.get(1)?,
                        confidence: row.get(2)?,
                        created_at: row.get(3)?,
                        embedding_model: row.get(4)?,
                        reranker_model: row.get(5)?,
                        llm_model: row.get(6)?,
                        answer_text: row.get(7)?,
                        generation_time_ms: row.get::<_, i64>(8)? as u64,
                        token_count: row.get::<_, i64>(9)? as u32,
                        citations: Vec::new(),
                    })
                },
            )
            .optional()
            .map_err(|e| AppError::Storage(format!("Failed to load trace: {}", e)))?;

        let Some(mut detail) = header else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare(
                "SELECT citation_number, section_id, relevance_score,
                        doc_title, section_title, url
                 FROM trace_citations WHERE trace_id = ?1
                 ORDER BY citation_number",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        detail.citations = stmt
            .query_map(params![trace_id], |row| {
                Ok(TraceDetailCitation {
                    citation_number: row.get::<_, i64>(0)? as u32,
                    section_id: row.get(1)?,
                    relevance_score: row.get::<_, f64>(2)? as f32,
                    doc_title: row.get(3)?,
                    section_title: row.get(4)?,
                    url: row.get(5)?,
                })
            })
            .map_err(|e| AppError::Storage(format!("Failed to query citations: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to read citation row: {}", e)))?;

        Ok(Some(detail))
    }

    /// Corpus and audit-log counters.
    pub fn stats(&self) -> AppResult<DocumentStats> {
        let conn = self.lock()?;

        let count = |table: &str| -> AppResult<usize> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get::<_, i64>(0).map(|v| v as usize)
            })
            .map_err(|e| AppError::Storage(format!("Failed to count {}: {}", table, e)))
        };

        Ok(DocumentStats {
            documents: count("documents")?,
            sections: count("sections")?,
            traces: count("query_traces")?,
        })
    }
}

fn create_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            doc_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            url TEXT,
            file_path TEXT NOT NULL UNIQUE,
            breadcrumb TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sections (
            section_id TEXT PRIMARY KEY,
            doc_id TEXT NOT NULL,
            title TEXT,
            content TEXT NOT NULL,
            embedding BLOB,
            section_order INTEGER NOT NULL,
            has_code INTEGER NOT NULL DEFAULT 0,
            has_images INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (doc_id) REFERENCES documents(doc_id)
        );

        CREATE INDEX IF NOT EXISTS idx_sections_doc ON sections(doc_id);

        CREATE VIRTUAL TABLE IF NOT EXISTS sections_fts USING fts5(
            section_id UNINDEXED,
            doc_id UNINDEXED,
            title,
            content
        );

        CREATE TABLE IF NOT EXISTS image_cache (
            image_hash TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS section_images (
            section_id TEXT NOT NULL,
            image_hash TEXT NOT NULL,
            image_path TEXT NOT NULL,
            alt_text TEXT,
            PRIMARY KEY (section_id, image_path)
        );

        CREATE TABLE IF NOT EXISTS query_traces (
            trace_id TEXT PRIMARY KEY,
            query_text TEXT NOT NULL,
            user_id TEXT,
            confidence TEXT NOT NULL,
            embedding_model TEXT NOT NULL,
            reranker_model TEXT NOT NULL,
            llm_model TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trace_citations (
            trace_id TEXT NOT NULL,
            citation_number INTEGER NOT NULL,
            section_id TEXT NOT NULL,
            relevance_score REAL NOT NULL,
            doc_title TEXT NOT NULL,
            section_title TEXT,
            url TEXT,
            PRIMARY KEY (trace_id, citation_number)
        );

        CREATE TABLE IF NOT EXISTS trace_answers (
            trace_id TEXT PRIMARY KEY,
            answer_text TEXT NOT NULL,
            generation_time_ms INTEGER NOT NULL,
            token_count INTEGER NOT NULL
        );
        "#,
    )
    .map_err(|e| AppError::Storage(format!("Failed to create tables: {}", e)))?;

    Ok(())
}

const SECTION_SELECT: &str = "SELECT s.section_id, s.doc_id, s.title, s.content, s.embedding,
        s.has_code, s.has_images, d.title, d.url, d.breadcrumb
 FROM sections s JOIN documents d ON d.doc_id = s.doc_id";

fn section_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Section> {
    let embedding_bytes: Option<Vec<u8>> = row.get(4)?;
    let embedding = match embedding_bytes {
        Some(bytes) => Some(
            bytes_to_embedding(&bytes)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        ),
        None => None,
    };

    let breadcrumb_json: String = row.get(9)?;
    let breadcrumb: Vec<String> = serde_json::from_str(&breadcrumb_json)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    Ok(Section {
        section_id: row.get(0)?,
        doc_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        embedding,
        has_code: row.get(5)?,
        has_images: row.get(6)?,
        doc_title: row.get(7)?,
        url: row.get(8)?,
        breadcrumb,
    })
}

fn load_section(conn: &Connection, section_id: &str) -> AppResult<Option<Section>> {
    conn.query_row(
        &format!("{} WHERE s.section_id = ?1", SECTION_SELECT),
        params![section_id],
        section_from_row,
    )
    .optional()
    .map_err(|e| AppError::Storage(format!("Failed to load section: {}", e)))
}

/// Reduce a free-form query to an FTS5 match expression: quoted
/// alphanumeric terms joined with OR. Returns None when nothing is
/// indexable.
fn fts_match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(|term| format!("\"{}\"", term))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Storage(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        embedding.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(embedding)
}

/// Cosine similarity between two vectors; 0.0 on length mismatch or a
/// zero vector.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
