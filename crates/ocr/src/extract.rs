use tracing::debug;

use crate::classify::LineClassifier;
use crate::config::{FailureAdvance, ParserConfig};
use crate::price::PriceLocator;
use crate::types::ItemPriceEntry;

/// Pairs item-name lines with the price that follows them.
///
/// Works on OCR lines alone: no coordinates, no table structure. A single
/// forward pass classifies each line, and for every item line looks ahead
/// a bounded window for a plausible price.
#[derive(Debug, Clone)]
pub struct Extractor {
    classifier: LineClassifier,
    locator: PriceLocator,
    on_failure: FailureAdvance,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl Extractor {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            classifier: LineClassifier::new(config),
            locator: PriceLocator::new(config),
            on_failure: config.on_failure,
        }
    }

    /// Extract (name, price) pairs in line order. Never fails: input with
    /// no recognizable items yields an empty list.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> Vec<ItemPriceEntry> {
        let mut items = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].as_ref();
            if !self.classifier.classify(line) {
                i += 1;
                continue;
            }

            let scan = self.locator.find_price(lines, i + 1, &self.classifier);
            match scan.price {
                Some(price) => {
                    debug!(line = i, name = line.trim(), %price, "matched item");
                    items.push(ItemPriceEntry::new(line.trim(), price));
                    i += 1 + scan.consumed;
                }
                None => {
                    i += match self.on_failure {
                        FailureAdvance::OneLine => 1,
                        FailureAdvance::SkipWindow => 1 + scan.consumed,
                    };
                }
            }
        }

        items
    }
}
