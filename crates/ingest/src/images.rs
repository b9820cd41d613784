//! Image description generation with content-hash memoization.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use docsqa_core::{AppError, AppResult};
use docsqa_providers::VisionClient;
use docsqa_storage::Store;
use sha2::{Digest, Sha256};

use crate::markdown::ImageRef;

/// Describes document images through the vision provider, caching each
/// description in the store keyed by the image's content hash. Re-used
/// images across documents hit the cache instead of the provider.
pub struct ImageProcessor {
    store: Arc<Store>,
    vision: Arc<dyn VisionClient>,
}

impl ImageProcessor {
    pub fn new(store: Arc<Store>, vision: Arc<dyn VisionClient>) -> Self {
        Self { store, vision }
    }

    /// Resolve image references against `base_dir`, describe any image not
    /// yet cached, and return the content hash per reference path.
    ///
    /// References whose file does not exist are skipped; broken links are
    /// common in exported documentation and must not fail ingestion.
    pub async fn process(
        &self,
        images: &[ImageRef],
        base_dir: &Path,
    ) -> AppResult<HashMap<String, String>> {
        let mut hashes = HashMap::new();

        for image in images {
            let image_path = if Path::new(&image.path).is_absolute() {
                Path::new(&image.path).to_path_buf()
            } else {
                base_dir.join(&image.path)
            };

            if !image_path.is_file() {
                tracing::debug!("Skipping missing image: {:?}", image_path);
                continue;
            }

            let image_hash = hash_file(&image_path)?;

            if self.store.cached_image_description(&image_hash)?.is_none() {
                let bytes = std::fs::read(&image_path).map_err(|e| {
                    AppError::Ingestion(format!("Failed to read image {:?}: {}", image_path, e))
                })?;
                let description = self.vision.describe_image(&bytes).await?;
                self.store
                    .cache_image_description(&image_hash, &description)?;
                tracing::debug!("Described image {:?}", image_path);
            }

            hashes.insert(image.path.clone(), image_hash);
        }

        Ok(hashes)
    }
}

/// SHA-256 of a file's contents, streamed in 4 KiB chunks.
fn hash_file(path: &Path) -> AppResult<String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| AppError::Ingestion(format!("Failed to open {:?}: {}", path, e)))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 4096];
    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|e| AppError::Ingestion(format!("Failed to read {:?}: {}", path, e)))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsqa_providers::MockVision;
    use std::fs;

    fn image_ref(path: &str) -> ImageRef {
        ImageRef {
            path: path.to_string(),
            alt_text: None,
        }
    }

    #[tokio::test]
    async fn test_process_describes_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("images")).unwrap();
        fs::write(dir.path().join("images/arch.png"), b"fake png bytes").unwrap();

        let store = Arc::new(Store::open_in_memory().unwrap());
        let processor = ImageProcessor::new(store.clone(), Arc::new(MockVision::new()));

        let hashes = processor
            .process(&[image_ref("images/arch.png")], dir.path())
            .await
            .unwrap();

        assert_eq!(hashes.len(), 1);
        let hash = &hashes["images/arch.png"];
        let description = store.cached_image_description(hash).unwrap().unwrap();
        assert!(description.contains("14 bytes"));

        // Second pass hits the cache and returns the same hash.
        let again = processor
            .process(&[image_ref("images/arch.png")], dir.path())
            .await
            .unwrap();
        assert_eq!(again["images/arch.png"], *hash);
    }

    #[tokio::test]
    async fn test_missing_image_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open_in_memory().unwrap());
        let processor = ImageProcessor::new(store, Arc::new(MockVision::new()));

        let hashes = processor
            .process(&[image_ref("images/nope.png")], dir.path())
            .await
            .unwrap();
        assert!(hashes.is_empty());
    }

    #[test]
    fn test_hash_file_is_content_based() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        fs::write(&a, b"same bytes").unwrap();
        fs::write(&b, b"same bytes").unwrap();

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }
}
