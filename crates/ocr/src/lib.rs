// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod classify;
pub mod config;
pub mod extract;
pub mod hash;
pub mod pipeline;
pub mod price;
pub mod recognizer;
pub mod table;
pub mod types;

pub use classify::LineClassifier;
pub use config::{AlphaRule, ConfigError, FailureAdvance, ParserConfig, PriceRange, PriceSelection};
pub use extract::Extractor;
pub use hash::receipt_id;
pub use pipeline::{PipelineError, ReceiptPipeline};
pub use price::{parse_price, PriceLocator, PriceScan};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
pub use table::{extract_table_items, TableError};
pub use types::{
    DetectedLine, DetectionKind, ItemPriceEntry, ItemSource, OcrOutput, ParsedReceipt, TableCell,
};
