//! Markdown parsing into document and section data.
//!
//! Documents title from the first H1; H2 and H3 headers both open a new
//! section, with any text before the first header kept as an untitled
//! intro section. HTML headers are normalized to markdown before
//! splitting, since parts of the corpus are exported HTML.

use std::path::Path;

use docsqa_core::{AppError, AppResult};
use regex::Regex;
use sha2::{Digest, Sha256};

/// An image reference found in a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Path as written in the document, usually relative to it
    pub path: String,
    pub alt_text: Option<String>,
}

/// One parsed section.
#[derive(Debug, Clone)]
pub struct ParsedSection {
    pub title: Option<String>,
    pub content: String,
    pub order: usize,
    pub has_code: bool,
    pub has_images: bool,
    pub images: Vec<ImageRef>,
}

/// One parsed document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub file_path: String,
    pub title: String,
    pub url: Option<String>,
    pub breadcrumb: Vec<String>,
    pub content_hash: String,
    pub sections: Vec<ParsedSection>,
}

impl ParsedDocument {
    pub fn all_images(&self) -> Vec<ImageRef> {
        self.sections
            .iter()
            .flat_map(|section| section.images.iter().cloned())
            .collect()
    }
}

/// Parse a markdown file.
///
/// `docs_dir` anchors the breadcrumb and the optional documentation URL
/// (relative path with `.md` swapped for `.html` appended to
/// `docs_base_url`).
pub fn parse_file(
    file_path: &Path,
    docs_dir: &Path,
    docs_base_url: Option<&str>,
) -> AppResult<ParsedDocument> {
    let content = std::fs::read_to_string(file_path)
        .map_err(|e| AppError::Ingestion(format!("Failed to read {:?}: {}", file_path, e)))?;

    let content_hash = format!("{:x}", Sha256::digest(content.as_bytes()));
    let relative = file_path.strip_prefix(docs_dir).unwrap_or(file_path);

    let breadcrumb: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|part| part.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();

    let url = docs_base_url.map(|base| {
        let html_path = relative.to_string_lossy().replace('\\', "/");
        let html_path = match html_path.strip_suffix(".md") {
            Some(stem) => format!("{}.html", stem),
            None => html_path,
        };
        format!("{}/{}", base.trim_end_matches('/'), html_path)
    });

    Ok(ParsedDocument {
        file_path: file_path.to_string_lossy().to_string(),
        title: extract_title(&content),
        url,
        breadcrumb,
        content_hash,
        sections: parse_sections(&content),
    })
}

fn extract_title(content: &str) -> String {
    let md_h1 = Regex::new(r"(?m)^#\s+(.+)$").expect("static regex");
    if let Some(cap) = md_h1.captures(content) {
        return cap[1].trim().to_string();
    }

    let html_h1 = Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("static regex");
    if let Some(cap) = html_h1.captures(content) {
        let tag_strip = Regex::new(r"<[^>]+>").expect("static regex");
        return tag_strip.replace_all(&cap[1], "").trim().to_string();
    }

    "Untitled".to_string()
}

fn parse_sections(content: &str) -> Vec<ParsedSection> {
    // Normalize HTML headers so one splitter handles both flavors.
    let html_h2 = Regex::new(r"(?is)<h2[^>]*>(.*?)</h2>").expect("static regex");
    let html_h3 = Regex::new(r"(?is)<h3[^>]*>(.*?)</h3>").expect("static regex");
    let content = html_h2.replace_all(content, "\n## $1\n");
    let content = html_h3.replace_all(&content, "\n### $1\n");

    let header = Regex::new(r"(?m)^(##|###)\s+(.+)$").expect("static regex");

    let mut sections = Vec::new();
    let mut order = 0;
    let mut last_title: Option<String> = None;
    let mut last_end = 0;

    for cap in header.captures_iter(&content) {
        let whole = cap.get(0).expect("capture 0 always present");
        let body = &content[last_end..whole.start()];

        if last_title.is_some() || !body.trim().is_empty() {
            sections.push(build_section(last_title.take(), body, order));
            order += 1;
        }

        last_title = Some(cap[2].trim().to_string());
        last_end = whole.end();
    }

    let tail = &content[last_end..];
    if last_title.is_some() || !tail.trim().is_empty() {
        sections.push(build_section(last_title, tail, order));
    }

    sections
}

fn build_section(title: Option<String>, content: &str, order: usize) -> ParsedSection {
    let images = extract_images(content);
    let has_code = content.contains("```")
        || content
            .lines()
            .any(|line| line.starts_with("    ") && !line.trim().is_empty());

    ParsedSection {
        title,
        content: content.trim().to_string(),
        order,
        has_code,
        has_images: !images.is_empty(),
        images,
    }
}

fn extract_images(content: &str) -> Vec<ImageRef> {
    let md_image = Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("static regex");
    let html_tag = Regex::new(r"(?i)<img[^>]*>").expect("static regex");
    let src_attr = Regex::new(r#"(?i)src\s*=\s*["']([^"']+)["']"#).expect("static regex");
    let alt_attr = Regex::new(r#"(?i)alt\s*=\s*["']([^"']*)["']"#).expect("static regex");

    // Collected with byte offsets so both syntaxes interleave in
    // document order.
    let mut found: Vec<(usize, ImageRef)> = Vec::new();

    for cap in md_image.captures_iter(content) {
        let offset = cap.get(0).expect("capture 0 always present").start();
        let alt = cap[1].trim();
        found.push((
            offset,
            ImageRef {
                path: cap[2].to_string(),
                alt_text: (!alt.is_empty()).then(|| alt.to_string()),
            },
        ));
    }

    for tag in html_tag.find_iter(content) {
        // src and alt can appear in any order inside the tag, so pull
        // each attribute out separately.
        let Some(src) = src_attr.captures(tag.as_str()) else {
            continue;
        };
        let alt_text = alt_attr
            .captures(tag.as_str())
            .map(|cap| cap[1].trim().to_string())
            .filter(|alt| !alt.is_empty());
        found.push((
            tag.start(),
            ImageRef {
                path: src[1].to_string(),
                alt_text,
            },
        ));
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, image)| image).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = "\
# Guia de Testes

Introdução ao processo de testes.

## Executando no Jenkins

Use o pipeline padrao:

```bash
make test
```

## Cobertura

![Painel de cobertura](images/coverage.png)

Relatorios ficam no artefato coverage.

### Limiares

O limiar minimo e 80%.
";

    fn write_sample(dir: &Path) -> std::path::PathBuf {
        let sub = dir.join("guides");
        fs::create_dir_all(&sub).unwrap();
        let path = sub.join("testes.md");
        fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn test_parse_extracts_title_sections_and_breadcrumb() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());

        let doc = parse_file(&path, dir.path(), Some("https://docs.example.com")).unwrap();

        assert_eq!(doc.title, "Guia de Testes");
        assert_eq!(doc.breadcrumb, vec!["guides"]);
        assert_eq!(
            doc.url.as_deref(),
            Some("https://docs.example.com/guides/testes.html")
        );
        assert_eq!(doc.content_hash.len(), 64);

        assert_eq!(doc.sections.len(), 4);
        assert_eq!(doc.sections[0].title, None);
        assert!(doc.sections[0].content.contains("Introdução"));
        assert_eq!(doc.sections[1].title.as_deref(), Some("Executando no Jenkins"));
        assert!(doc.sections[1].has_code);
        assert_eq!(doc.sections[2].title.as_deref(), Some("Cobertura"));
        assert!(doc.sections[2].has_images);
        assert_eq!(doc.sections[3].title.as_deref(), Some("Limiares"));

        for (i, section) in doc.sections.iter().enumerate() {
            assert_eq!(section.order, i);
        }
    }

    #[test]
    fn test_parse_extracts_markdown_and_html_images() {
        let images = extract_images(
            "![Painel](images/a.png) e <img src=\"images/b.png\" alt=\"Fluxo\"> e ![](images/c.png)",
        );

        assert_eq!(images.len(), 3);
        assert_eq!(images[0].path, "images/a.png");
        assert_eq!(images[0].alt_text.as_deref(), Some("Painel"));
        assert_eq!(images[1].path, "images/b.png");
        assert_eq!(images[1].alt_text.as_deref(), Some("Fluxo"));
        assert_eq!(images[2].path, "images/c.png");
        assert_eq!(images[2].alt_text, None);
    }

    #[test]
    fn test_html_image_attributes_in_any_order() {
        let images = extract_images("<img alt=\"Diagrama\" src=\"images/d.png\" width=\"80\">");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].path, "images/d.png");
        assert_eq!(images[0].alt_text.as_deref(), Some("Diagrama"));

        // A tag without src references nothing.
        assert!(extract_images("<img class=\"thumb\">").is_empty());
    }

    #[test]
    fn test_html_headers_are_normalized() {
        let sections = parse_sections("intro\n<h2>Configuração</h2>\ncorpo da secção");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].title.as_deref(), Some("Configuração"));
        assert_eq!(sections[1].content, "corpo da secção");
    }

    #[test]
    fn test_title_fallbacks() {
        assert_eq!(
            extract_title("<h1 class=\"big\">Manual <b>HTML</b></h1>"),
            "Manual HTML"
        );
        assert_eq!(extract_title("sem cabecalho nenhum"), "Untitled");
    }

    #[test]
    fn test_unchanged_content_hashes_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());

        let first = parse_file(&path, dir.path(), None).unwrap();
        let second = parse_file(&path, dir.path(), None).unwrap();
        assert_eq!(first.content_hash, second.content_hash);

        fs::write(&path, format!("{}\nnova linha\n", SAMPLE)).unwrap();
        let third = parse_file(&path, dir.path(), None).unwrap();
        assert_ne!(first.content_hash, third.content_hash);
    }
}
