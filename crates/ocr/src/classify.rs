use std::collections::HashSet;

use crate::config::{AlphaRule, ParserConfig};

re!(re_quantity, r"^(?:\d+(?:\.\d+)?)?\s*(\p{L}*)$");

/// Decides whether an OCR line plausibly names a purchased item.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    denylist: Vec<String>,
    units: HashSet<String>,
    alpha_rule: AlphaRule,
}

impl LineClassifier {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            denylist: config.denylist.iter().map(|d| d.to_lowercase()).collect(),
            units: config.quantity_units.iter().map(|u| u.to_lowercase()).collect(),
            alpha_rule: config.alpha_rule,
        }
    }

    /// True when the line has enough letters, avoids every denylisted
    /// keyword, and is not a bare quantity such as `0.500 KG`.
    pub fn classify(&self, line: &str) -> bool {
        let line = line.trim();
        if !has_letters(line, self.alpha_rule) {
            return false;
        }
        let lower = line.to_lowercase();
        if self.denylist.iter().any(|d| lower.contains(d.as_str())) {
            return false;
        }
        !self.is_bare_quantity(&lower)
    }

    fn is_bare_quantity(&self, lower: &str) -> bool {
        match re_quantity().captures(lower) {
            Some(c) => {
                let unit = c.get(1).map_or("", |m| m.as_str());
                unit.is_empty() || self.units.contains(unit)
            }
            None => false,
        }
    }
}

fn has_letters(line: &str, rule: AlphaRule) -> bool {
    match rule {
        AlphaRule::AnyLetter => line.chars().any(char::is_alphabetic),
        AlphaRule::MinRun(min) => {
            let mut run = 0usize;
            for c in line.chars() {
                if c.is_alphabetic() {
                    run += 1;
                    if run >= min {
                        return true;
                    }
                } else {
                    run = 0;
                }
            }
            false
        }
    }
}
