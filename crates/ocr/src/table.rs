use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

use crate::types::{ItemPriceEntry, TableCell};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("No table cells detected")]
    Empty,
    #[error("Could not find both an item and an amount column in the table header")]
    ColumnsNotFound,
}

/// Read item/amount pairs from a table whose first row is a header.
///
/// The item column is the last header cell mentioning "item"; the amount
/// column the last other cell mentioning "amount" or "amt". Column structure
/// is taken at face value, so no price range is applied here.
pub fn extract_table_items(cells: &[TableCell]) -> Result<Vec<ItemPriceEntry>, TableError> {
    if cells.is_empty() {
        return Err(TableError::Empty);
    }

    let mut rows: BTreeMap<u32, BTreeMap<u32, &str>> = BTreeMap::new();
    for cell in cells {
        rows.entry(cell.row).or_default().insert(cell.column, cell.text.trim());
    }

    let header = rows.get(&1).ok_or(TableError::ColumnsNotFound)?;
    let (item_col, amount_col) = locate_columns(header).ok_or(TableError::ColumnsNotFound)?;

    let items = rows
        .range(2..)
        .filter_map(|(_, row)| {
            let name = *row.get(&item_col)?;
            let amount = *row.get(&amount_col)?;
            if name.is_empty() || amount.is_empty() {
                return None;
            }
            Some(ItemPriceEntry::new(name, parse_amount_cell(amount)?))
        })
        .collect();
    Ok(items)
}

fn locate_columns(header: &BTreeMap<u32, &str>) -> Option<(u32, u32)> {
    let mut item_col = None;
    let mut amount_col = None;
    for (&col, text) in header {
        let text = text.to_lowercase();
        // A header naming the item is never read as the amount.
        if text.contains("item") {
            item_col = Some(col);
        } else if text.contains("amount") || text.contains("amt") {
            amount_col = Some(col);
        }
    }
    Some((item_col?, amount_col?))
}

/// Keep only digits and dots, e.g. `₹ 1,250.00` → `1250.00`.
fn parse_amount_cell(text: &str) -> Option<Decimal> {
    let clean: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    Decimal::from_str(&clean).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn grid(rows: &[&[&str]]) -> Vec<TableCell> {
        rows.iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(c, text)| TableCell::new(r as u32 + 1, c as u32 + 1, *text))
            })
            .collect()
    }

    #[test]
    fn reads_item_and_amount_columns() {
        let cells = grid(&[
            &["Item", "Qty", "Rate", "Amount"],
            &["Nachani Ladoo", "0.500", "420.00", "210.00"],
            &["Kaju Katli", "1", "99.00", "₹ 99.00"],
        ]);
        let items = extract_table_items(&cells).unwrap();
        assert_eq!(
            items,
            vec![
                ItemPriceEntry::new("Nachani Ladoo", dec!(210.00)),
                ItemPriceEntry::new("Kaju Katli", dec!(99.00)),
            ]
        );
    }

    #[test]
    fn header_matching_is_case_insensitive_and_accepts_amt() {
        let cells = grid(&[&["ITEM NAME", "AMT"], &["Tea", "1,250.50"]]);
        assert_eq!(
            extract_table_items(&cells).unwrap(),
            vec![ItemPriceEntry::new("Tea", dec!(1250.50))]
        );
    }

    #[test]
    fn cell_order_does_not_matter() {
        let mut cells = grid(&[&["Item", "Amount"], &["Tea", "20"], &["Coffee", "30"]]);
        cells.reverse();
        let names: Vec<_> = extract_table_items(&cells).unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Tea", "Coffee"]);
    }

    #[test]
    fn skips_blank_and_unparseable_rows() {
        let cells = grid(&[
            &["Item", "Amount"],
            &["Tea", ""],
            &["", "30"],
            &["Coffee", "n/a"],
            &["Samosa", "15"],
        ]);
        assert_eq!(
            extract_table_items(&cells).unwrap(),
            vec![ItemPriceEntry::new("Samosa", dec!(15))]
        );
    }

    #[test]
    fn later_matching_headers_win() {
        let cells = grid(&[
            &["Item Code", "Item Name", "Amt Before Tax", "Amount"],
            &["21069099", "Kaju Katli", "94.29", "99.00"],
        ]);
        assert_eq!(
            extract_table_items(&cells).unwrap(),
            vec![ItemPriceEntry::new("Kaju Katli", dec!(99.00))]
        );
    }

    #[test]
    fn item_header_is_never_the_amount_column() {
        let cells = grid(&[&["Description", "Item Amount"], &["Tea", "20"]]);
        assert_eq!(extract_table_items(&cells), Err(TableError::ColumnsNotFound));
    }

    #[test]
    fn missing_columns_is_an_error() {
        let cells = grid(&[&["Description", "Amount"], &["Tea", "20"]]);
        assert_eq!(extract_table_items(&cells), Err(TableError::ColumnsNotFound));
    }

    #[test]
    fn no_cells_is_an_error() {
        assert_eq!(extract_table_items(&[]), Err(TableError::Empty));
    }
}
