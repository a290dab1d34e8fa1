use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ParserConfig;
use crate::extract::Extractor;
use crate::hash;
use crate::recognizer::{OcrBackend, OcrError};
use crate::table;
use crate::types::{ItemSource, ParsedReceipt};

/// Image extensions picked up by [`ReceiptPipeline::process_dir`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Orchestrates: hash → OCR → table items, falling back to line pairing.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
    extractor: Extractor,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, config: &ParserConfig) -> Self {
        Self { recognizer, extractor: Extractor::new(config) }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Process raw image bytes (from an upload or file read).
    pub fn process_bytes(&self, data: &[u8]) -> Result<ParsedReceipt, PipelineError> {
        let hash_hex = hash::receipt_id(data);
        let output = self.recognizer.recognize(data)?;
        let lines = output.text_lines();

        let table_items = if output.cells.is_empty() {
            None
        } else {
            match table::extract_table_items(&output.cells) {
                Ok(items) => Some(items),
                Err(e) => {
                    debug!(receipt = %hash_hex, "table mode unavailable: {e}");
                    None
                }
            }
        };

        let (items, source) = match table_items {
            Some(items) => (items, ItemSource::Table),
            None => (self.extractor.extract(&lines), ItemSource::Lines),
        };

        info!(receipt = %hash_hex, lines = lines.len(), items = items.len(), ?source, "receipt parsed");
        Ok(ParsedReceipt { hash_hex, lines, items, source })
    }

    /// Process a file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ParsedReceipt, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes)
    }

    /// Process every supported image in `dir`, in file-name order.
    /// A failing file is logged and reported without stopping the batch.
    pub async fn process_dir(
        &self,
        dir: &Path,
    ) -> Result<Vec<(PathBuf, Result<ParsedReceipt, PipelineError>)>, PipelineError> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_supported_image(&path) && entry.file_type().await?.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = self.process_file(&path).await;
            if let Err(e) = &result {
                warn!("Receipt {} failed: {e}", path.display());
            }
            results.push((path, result));
        }
        Ok(results)
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{MockRecognizer, UnavailableRecognizer};
    use crate::types::{DetectedLine, ItemPriceEntry, OcrOutput, TableCell};
    use rust_decimal_macros::dec;

    fn pipeline(text: &str) -> ReceiptPipeline<MockRecognizer> {
        ReceiptPipeline::new(MockRecognizer::from_text(text), &ParserConfig::default())
    }

    #[test]
    fn process_bytes_pairs_lines() {
        let result = pipeline("Veg Burger\n120.00\nGST\n12.00").process_bytes(b"img").unwrap();
        assert_eq!(result.hash_hex.len(), 64);
        assert_eq!(result.source, ItemSource::Lines);
        assert_eq!(result.lines.len(), 4);
        assert_eq!(result.items, vec![ItemPriceEntry::new("Veg Burger", dec!(120.00))]);
    }

    #[test]
    fn process_bytes_prefers_table_when_header_found() {
        let output = OcrOutput {
            lines: vec![DetectedLine::line("Item"), DetectedLine::line("Amount")],
            cells: vec![
                TableCell::new(1, 1, "Item"),
                TableCell::new(1, 2, "Amount"),
                TableCell::new(2, 1, "Misal Pav"),
                TableCell::new(2, 2, "3.50"),
            ],
        };
        let p = ReceiptPipeline::new(MockRecognizer::new(output), &ParserConfig::default());
        let result = p.process_bytes(b"img").unwrap();
        assert_eq!(result.source, ItemSource::Table);
        // Table mode does not apply the price range.
        assert_eq!(result.items, vec![ItemPriceEntry::new("Misal Pav", dec!(3.50))]);
    }

    #[test]
    fn process_bytes_falls_back_when_table_has_no_header() {
        let output = OcrOutput {
            lines: vec![DetectedLine::line("Chai"), DetectedLine::line("20.00")],
            cells: vec![TableCell::new(1, 1, "Chai"), TableCell::new(1, 2, "20.00")],
        };
        let p = ReceiptPipeline::new(MockRecognizer::new(output), &ParserConfig::default());
        let result = p.process_bytes(b"img").unwrap();
        assert_eq!(result.source, ItemSource::Lines);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn process_bytes_surfaces_ocr_errors() {
        let p = ReceiptPipeline::new(UnavailableRecognizer, &ParserConfig::default());
        assert!(matches!(
            p.process_bytes(b"img"),
            Err(PipelineError::Ocr(OcrError::NotAvailable))
        ));
    }

    #[test]
    fn same_bytes_same_id() {
        let p = pipeline("irrelevant");
        let r1 = p.process_bytes(b"same").unwrap();
        let r2 = p.process_bytes(b"same").unwrap();
        assert_eq!(r1.hash_hex, r2.hash_hex);
    }

    #[tokio::test]
    async fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bill1.jpg");
        tokio::fs::write(&path, b"jpeg bytes").await.unwrap();

        let result = pipeline("Chai\n20.00").process_file(&path).await.unwrap();
        assert_eq!(result.hash_hex, hash::receipt_id(b"jpeg bytes"));
        assert_eq!(result.items.len(), 1);
    }

    #[tokio::test]
    async fn process_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline("").process_file(&dir.path().join("nope.png")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[tokio::test]
    async fn process_dir_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PNG", "a.jpg", "notes.txt", "c.webp"] {
            tokio::fs::write(dir.path().join(name), name.as_bytes()).await.unwrap();
        }
        tokio::fs::create_dir(dir.path().join("d.jpeg")).await.unwrap();

        let results = pipeline("Chai\n20.00").process_dir(dir.path()).await.unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.webp"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[tokio::test]
    async fn process_dir_reports_per_file_failures() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("bill.jpg"), b"x").await.unwrap();
        let p = ReceiptPipeline::new(UnavailableRecognizer, &ParserConfig::default());
        let results = p.process_dir(dir.path()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].1.is_err());
    }
}
