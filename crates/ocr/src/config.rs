use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse parser config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid price range: min {min} must be below max {max}")]
    InvertedRange { min: Decimal, max: Decimal },
    #[error("Minimum letter run must be at least 1")]
    ZeroLetterRun,
}

/// Substrings that disqualify a line from being an item name.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "gst", "rate", "qty", "amount", "total", "invoice", "date", "bill", "hsn", "tax",
    "sub total", "fssai", "thank",
];

/// Unit tokens allowed after a bare quantity, e.g. `0.500 KG`, `1.000 No`.
pub const DEFAULT_QUANTITY_UNITS: &[&str] = &["kg", "g", "no", "pcs"];

/// How many letters an item-name line must contain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlphaRule {
    /// At least one alphabetic character anywhere.
    AnyLetter,
    /// A run of at least this many consecutive alphabetic characters.
    MinRun(usize),
}

impl Default for AlphaRule {
    fn default() -> Self {
        AlphaRule::MinRun(3)
    }
}

/// Which qualifying price wins when the lookahead window holds several.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceSelection {
    First,
    Last,
    /// Line totals usually follow the smaller unit rate, so the largest wins.
    #[default]
    Maximum,
}

/// Where the cursor goes after an item line finds no price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureAdvance {
    /// Reconsider the very next line.
    #[default]
    OneLine,
    /// Skip every line the failed scan examined.
    SkipWindow,
}

/// Bounds a number must fall within to be taken as an item price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
    pub min_inclusive: bool,
    pub max_inclusive: bool,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Decimal::from(5),
            max: Decimal::from(2000),
            min_inclusive: true,
            max_inclusive: true,
        }
    }
}

impl PriceRange {
    pub fn inclusive(min: Decimal, max: Decimal) -> Self {
        Self { min, max, min_inclusive: true, max_inclusive: true }
    }

    pub fn exclusive(min: Decimal, max: Decimal) -> Self {
        Self { min, max, min_inclusive: false, max_inclusive: false }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        let above = if self.min_inclusive { value >= self.min } else { value > self.min };
        let below = if self.max_inclusive { value <= self.max } else { value < self.max };
        above && below
    }
}

/// Tunables for the line-to-price parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    /// Matched case-insensitively as substrings.
    pub denylist: Vec<String>,
    pub quantity_units: Vec<String>,
    pub alpha_rule: AlphaRule,
    pub price_range: PriceRange,
    /// Lookahead span, counting the item line itself.
    pub window_size: usize,
    pub selection: PriceSelection,
    /// End the lookahead at a line that is itself an item name.
    pub stop_at_next_item: bool,
    pub on_failure: FailureAdvance,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            quantity_units: DEFAULT_QUANTITY_UNITS.iter().map(|s| s.to_string()).collect(),
            alpha_rule: AlphaRule::default(),
            price_range: PriceRange::default(),
            window_size: 4,
            selection: PriceSelection::default(),
            stop_at_next_item: true,
            on_failure: FailureAdvance::default(),
        }
    }
}

impl ParserConfig {
    /// Parse a (possibly partial) TOML document; missing keys keep their defaults.
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let PriceRange { min, max, min_inclusive, max_inclusive } = self.price_range;
        if min > max || (min == max && !(min_inclusive && max_inclusive)) {
            return Err(ConfigError::InvertedRange { min, max });
        }
        if self.alpha_rule == AlphaRule::MinRun(0) {
            return Err(ConfigError::ZeroLetterRun);
        }
        Ok(())
    }

    pub fn with_window(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_range(mut self, range: PriceRange) -> Self {
        self.price_range = range;
        self
    }

    pub fn with_selection(mut self, selection: PriceSelection) -> Self {
        self.selection = selection;
        self
    }
}
