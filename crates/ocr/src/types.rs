use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Granularity tag attached to each detection by the OCR service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    #[default]
    Line,
    Word,
}

/// A single piece of recognized text as reported by the OCR service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedLine {
    pub text: String,
    #[serde(default)]
    pub kind: DetectionKind,
    /// Service-reported confidence (0–100). Carried through, never used for parsing.
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl DetectedLine {
    pub fn line(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: DetectionKind::Line, confidence: None }
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: DetectionKind::Word, confidence: None }
    }
}

/// One cell of a detected table, with 1-based row and column indices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableCell {
    pub row: u32,
    pub column: u32,
    pub text: String,
}

impl TableCell {
    pub fn new(row: u32, column: u32, text: impl Into<String>) -> Self {
        Self { row, column, text: text.into() }
    }
}

/// Everything an OCR backend returns for one image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OcrOutput {
    pub lines: Vec<DetectedLine>,
    /// Table cells, when the backend supports table analysis.
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

impl OcrOutput {
    /// Build an output from plain text, one `Line` detection per non-blank line.
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(DetectedLine::line)
            .collect();
        Self { lines, cells: vec![] }
    }

    /// Line-level detections in reading order; word detections are dropped.
    pub fn text_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter(|d| d.kind == DetectionKind::Line)
            .map(|d| d.text.clone())
            .collect()
    }
}

/// A recovered (item name, price) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemPriceEntry {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl ItemPriceEntry {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self { name: name.into(), price }
    }
}

/// Which strategy produced a receipt's items.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    Table,
    Lines,
}

/// The result of running one receipt through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedReceipt {
    /// SHA-256 hex digest of the uploaded bytes.
    pub hash_hex: String,
    pub lines: Vec<String>,
    pub items: Vec<ItemPriceEntry>,
    pub source: ItemSource,
}

impl ParsedReceipt {
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|i| i.price).sum()
    }
}
