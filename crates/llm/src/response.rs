use std::str::FromStr;
use std::sync::OnceLock;

use billsplit_ocr::ItemPriceEntry;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::StructuringError;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_currency, r"(?i)₹|\brs\.?|\binr\b|\$");
re!(re_number, r"^\d+(?:\.\d+)?$");
re!(re_bullet,
    r"(?i)^\s*(?:[-*•]|\d+[.)])?\s*(.+?)\s*(?:—|–|-|:)\s*((?:₹|rs\.?|inr|\$)?\s*[\d,]+(?:\.\d+)?)\s*/?-?\s*$");

const NAME_KEYS: &[&str] = &["name", "item", "item_name", "description"];
const PRICE_KEYS: &[&str] = &["price", "amount", "total", "cost"];

/// Best-effort parse of a model reply into item/price pairs.
///
/// Tries a JSON array of objects, then a JSON `name -> price` object, then
/// bulleted `Name — Price` lines. Entries whose price cannot be read are
/// dropped rather than failing the whole reply.
pub fn parse_response(text: &str) -> Result<Vec<ItemPriceEntry>, StructuringError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(StructuringError::EmptyResponse);
    }

    if let Some(items) = parse_json(text).filter(|items| !items.is_empty()) {
        return Ok(items);
    }

    let items: Vec<ItemPriceEntry> = text.lines().filter_map(parse_bullet_line).collect();
    if items.is_empty() {
        return Err(StructuringError::Unparseable(preview(text)));
    }
    Ok(items)
}

fn parse_json(text: &str) -> Option<Vec<ItemPriceEntry>> {
    if let Some(slice) = between(text, '[', ']') {
        if let Ok(Value::Array(values)) = serde_json::from_str::<Value>(slice) {
            return Some(values.iter().filter_map(entry_from_object).collect());
        }
    }
    if let Some(slice) = between(text, '{', '}') {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(slice) {
            if let Some(Value::Array(values)) = map.get("items") {
                return Some(values.iter().filter_map(entry_from_object).collect());
            }
            return Some(
                map.iter()
                    .filter_map(|(name, price)| {
                        Some(ItemPriceEntry::new(name.trim(), price_from_value(price)?))
                    })
                    .collect(),
            );
        }
    }
    None
}

fn between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn entry_from_object(value: &Value) -> Option<ItemPriceEntry> {
    let obj = value.as_object()?;
    let name = NAME_KEYS.iter().find_map(|k| obj.get(*k)?.as_str())?.trim();
    let price = PRICE_KEYS.iter().find_map(|k| price_from_value(obj.get(*k)?))?;
    (!name.is_empty()).then(|| ItemPriceEntry::new(name, price))
}

fn price_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

/// `₹ 1,250.00`, `Rs. 99`, `$5.50` → plain decimal.
fn parse_amount(text: &str) -> Option<Decimal> {
    let stripped = re_currency().replace_all(text, "");
    let clean = stripped.replace(',', "");
    let clean = clean.trim();
    if !re_number().is_match(clean) {
        return None;
    }
    Decimal::from_str(clean).ok()
}

fn parse_bullet_line(line: &str) -> Option<ItemPriceEntry> {
    let c = re_bullet().captures(line)?;
    let name = c.get(1)?.as_str().trim_matches(|ch: char| ch == '*' || ch.is_whitespace());
    if name.is_empty() {
        return None;
    }
    let price = parse_amount(c.get(2)?.as_str())?;
    Some(ItemPriceEntry::new(name, price))
}

fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}
