//! Read-side helpers over a corpus: search, filtering, pagination, lookup.

use crate::record::Record;

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 50;

/// Case-insensitive substring match against title and brand.
pub fn search<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| {
            r.title.to_lowercase().contains(&needle) || r.brand.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn find_by_id<'a>(records: &'a [Record], id: &str) -> Option<&'a Record> {
    records.iter().find(|r| r.id == id)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
}

impl RecordFilter {
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(brand) = self.brand.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            if !record.brand.to_lowercase().contains(&brand.to_lowercase()) {
                return false;
            }
        }

        // Records whose price cannot be read are not excluded by price bounds.
        if let Some(price) = record.current_price.as_deref().and_then(parse_price) {
            if self.min_price.is_some_and(|min| price < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating {
            match record.rating.as_deref().and_then(|r| r.trim().parse::<f64>().ok()) {
                Some(rating) if rating >= min_rating => {}
                _ => return false,
            }
        }

        true
    }

    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Reads a currency-formatted price such as `₹25,999`, `Rs. 25,999` or
/// `₹ 1,09,990.00`. Only the first numeric run counts, so a dotted currency
/// prefix is not mistaken for a decimal point.
pub fn parse_price(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, ',' | '.'))
        .filter(|c| *c != ',')
        .collect();
    digits.trim_end_matches('.').parse().ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Slices one page out of `items`. Page numbers start at 1; a page below 1 is
/// treated as 1 and a limit outside `1..=MAX_PAGE_LIMIT` falls back to
/// [`DEFAULT_PAGE_LIMIT`].
pub fn paginate<T>(items: &[T], page: usize, limit: usize) -> Page<'_, T> {
    let page = page.max(1);
    let limit = if (1..=MAX_PAGE_LIMIT).contains(&limit) {
        limit
    } else {
        DEFAULT_PAGE_LIMIT
    };
    let total = items.len();
    let start = (page - 1).saturating_mul(limit).min(total);
    let end = start.saturating_add(limit).min(total);
    Page {
        items: &items[start..end],
        page,
        limit,
        total,
        total_pages: total.div_ceil(limit),
        has_next: end < total,
        has_prev: page > 1,
    }
}
