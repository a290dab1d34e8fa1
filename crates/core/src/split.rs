use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("At least one person is required")]
    NoPeople,
    #[error("Item '{item}' is shared by unknown person '{person}'")]
    UnknownPerson { item: String, person: String },
    #[error("Item '{0}' is not assigned to anyone")]
    Unassigned(String),
    #[error("Person '{0}' is listed more than once")]
    DuplicatePerson(String),
    #[error("Amounts must not be negative: {0}")]
    NegativeAmount(Money),
    #[error("Amount is too large to split: {0}")]
    AmountTooLarge(Money),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitItem {
    pub name: String,
    pub price: Money,
    /// Names of the people sharing this item, each paying an equal part.
    pub shared_by: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRequest {
    pub items: Vec<SplitItem>,
    pub people: Vec<String>,
    /// Receipt-level tax, distributed in proportion to each subtotal.
    #[serde(default = "Money::zero")]
    pub tax: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonShare {
    pub name: String,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

/// Divide itemized costs and proportional tax among `request.people`.
///
/// Every amount is settled in whole cents: the item parts add up to each
/// item price and the tax parts add up to `request.tax`, so the grand total
/// of all shares always equals the receipt total.
pub fn split(request: &SplitRequest) -> Result<Vec<PersonShare>, SplitError> {
    let index = people_index(&request.people)?;
    if request.tax.is_negative() {
        return Err(SplitError::NegativeAmount(request.tax));
    }

    let mut subtotals = vec![0i64; request.people.len()];
    for item in &request.items {
        if item.price.is_negative() {
            return Err(SplitError::NegativeAmount(item.price));
        }
        if item.shared_by.is_empty() {
            return Err(SplitError::Unassigned(item.name.clone()));
        }

        let mut sharers = Vec::with_capacity(item.shared_by.len());
        let mut seen = HashSet::new();
        for person in &item.shared_by {
            let idx = *index.get(person.as_str()).ok_or_else(|| SplitError::UnknownPerson {
                item: item.name.clone(),
                person: person.clone(),
            })?;
            if !seen.insert(idx) {
                return Err(SplitError::DuplicatePerson(person.clone()));
            }
            sharers.push(idx);
        }

        let cents = cents_of(item.price)?;
        for (idx, part) in sharers.iter().zip(divide_evenly(cents, sharers.len())) {
            subtotals[*idx] = subtotals[*idx]
                .checked_add(part)
                .ok_or(SplitError::AmountTooLarge(item.price))?;
        }
    }

    let taxes = divide_proportionally(cents_of(request.tax)?, &subtotals);

    request
        .people
        .iter()
        .zip(subtotals.iter().zip(taxes))
        .map(|(name, (&subtotal, tax))| {
            let total = subtotal
                .checked_add(tax)
                .ok_or(SplitError::AmountTooLarge(request.tax))?;
            Ok(PersonShare {
                name: name.clone(),
                subtotal: Money::from_cents(subtotal),
                tax: Money::from_cents(tax),
                total: Money::from_cents(total),
            })
        })
        .collect()
}

/// Split a single total equally, ignoring individual items.
pub fn split_evenly(total: Money, people: &[String]) -> Result<Vec<PersonShare>, SplitError> {
    people_index(people)?;
    if total.is_negative() {
        return Err(SplitError::NegativeAmount(total));
    }

    Ok(people
        .iter()
        .zip(divide_evenly(cents_of(total)?, people.len()))
        .map(|(name, cents)| PersonShare {
            name: name.clone(),
            subtotal: Money::from_cents(cents),
            tax: Money::zero(),
            total: Money::from_cents(cents),
        })
        .collect())
}

fn people_index(people: &[String]) -> Result<HashMap<&str, usize>, SplitError> {
    if people.is_empty() {
        return Err(SplitError::NoPeople);
    }
    let mut index = HashMap::with_capacity(people.len());
    for (idx, name) in people.iter().enumerate() {
        if index.insert(name.as_str(), idx).is_some() {
            return Err(SplitError::DuplicatePerson(name.clone()));
        }
    }
    Ok(index)
}

fn cents_of(amount: Money) -> Result<i64, SplitError> {
    amount.to_cents().ok_or(SplitError::AmountTooLarge(amount))
}

/// Equal parts; leftover cents go one each to the earliest recipients.
fn divide_evenly(cents: i64, parts: usize) -> Vec<i64> {
    let n = parts as i64;
    let (base, rem) = (cents / n, cents % n);
    (0..n).map(|i| base + i64::from(i < rem)).collect()
}

/// Largest-remainder apportionment of `cents` by `weights`.
/// Falls back to an equal split when every weight is zero.
fn divide_proportionally(cents: i64, weights: &[i64]) -> Vec<i64> {
    let total_weight: i128 = weights.iter().map(|&w| i128::from(w)).sum();
    if total_weight == 0 {
        return divide_evenly(cents, weights.len());
    }

    let mut parts = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for (idx, &w) in weights.iter().enumerate() {
        let scaled = i128::from(cents) * i128::from(w);
        parts.push((scaled / total_weight) as i64);
        remainders.push((scaled % total_weight, idx));
    }

    let leftover = cents - parts.iter().sum::<i64>();
    // Stable sort keeps earlier people first among equal remainders.
    remainders.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, idx) in remainders.into_iter().take(leftover.max(0) as usize) {
        parts[idx] += 1;
    }
    parts
}
