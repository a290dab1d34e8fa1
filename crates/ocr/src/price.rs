use rust_decimal::Decimal;
use std::str::FromStr;

use crate::classify::LineClassifier;
use crate::config::{ParserConfig, PriceRange, PriceSelection};

re!(re_bare_price, r"^\d+(?:\.\d{1,2})?$");

/// Outcome of one lookahead scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceScan {
    pub price: Option<Decimal>,
    /// Lines examined from the scan start, so the caller can step past them.
    pub consumed: usize,
}

/// Searches the lines following an item name for its price.
#[derive(Debug, Clone)]
pub struct PriceLocator {
    range: PriceRange,
    window_size: usize,
    selection: PriceSelection,
    stop_at_next_item: bool,
}

impl PriceLocator {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            range: config.price_range,
            window_size: config.window_size,
            selection: config.selection,
            stop_at_next_item: config.stop_at_next_item,
        }
    }

    /// Scan up to `window_size - 1` lines starting at `start`.
    ///
    /// With early stop enabled, a line that `classifier` accepts as an item
    /// ends the scan and is left unconsumed.
    pub fn find_price<S: AsRef<str>>(
        &self,
        lines: &[S],
        start: usize,
        classifier: &LineClassifier,
    ) -> PriceScan {
        let end = start
            .saturating_add(self.window_size.saturating_sub(1))
            .min(lines.len());
        let window = lines.get(start..end).unwrap_or(&[]);

        let mut price: Option<Decimal> = None;
        let mut consumed = 0;
        for (offset, line) in window.iter().enumerate() {
            let line = line.as_ref();
            if self.stop_at_next_item && classifier.classify(line) {
                break;
            }
            consumed = offset + 1;

            let Some(value) = parse_price(line).filter(|v| self.range.contains(*v)) else {
                continue;
            };
            match self.selection {
                PriceSelection::First => {
                    price = Some(value);
                    break;
                }
                PriceSelection::Last => price = Some(value),
                PriceSelection::Maximum => price = Some(price.map_or(value, |p| p.max(value))),
            }
        }

        PriceScan { price, consumed }
    }
}

/// A bare decimal with at most two fractional digits, e.g. `99` or `120.00`.
/// Anything else, including currency symbols, is not a price.
pub fn parse_price(line: &str) -> Option<Decimal> {
    let line = line.trim();
    if !re_bare_price().is_match(line) {
        return None;
    }
    Decimal::from_str(line).ok()
}
