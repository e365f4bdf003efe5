use std::fmt;

use crate::record::Record;

/// Heuristic identity of a product: `title (trimmed) | current_price | brand`.
///
/// Kept as a structured key rather than a joined string so a `|` inside a title
/// cannot make two different records collide. Comparison is exact and
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    title: String,
    current_price: String,
    brand: String,
}

impl Signature {
    pub fn of(record: &Record) -> Self {
        Self {
            title: record.title.trim().to_string(),
            current_price: record.current_price.clone().unwrap_or_default(),
            brand: record.brand.clone(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.title, self.current_price, self.brand)
    }
}
