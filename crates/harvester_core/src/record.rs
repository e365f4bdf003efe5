use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// Title used when a fragment carries no readable product title.
pub const UNKNOWN_TITLE: &str = "Unknown Product";

/// One normalized product entry.
///
/// Field names on the wire follow the persisted payload (`product_id`, `image`,
/// `url`), so corpora written by earlier harvester runs stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "product_id")]
    pub id: String,
    pub title: String,
    pub brand: String,
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(default)]
    pub offers: Vec<String>,
    pub availability: String,
}

impl Record {
    /// Duplicate-detection key for this record.
    pub fn signature(&self) -> Signature {
        Signature::of(self)
    }
}

/// Which kind of harvest last wrote the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    InitialLoad,
    LoadMore,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::InitialLoad => "initial_load",
            Provenance::LoadMore => "load_more",
        }
    }
}

/// The persisted record list plus its envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    pub products: Vec<Record>,
    pub total_products: usize,
    pub scraped_at: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub scraper_version: String,
    #[serde(default)]
    pub provenance: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_products_added: Option<usize>,
}

pub const SCRAPER_VERSION: &str = "2.1";

impl Corpus {
    /// Corpus created by an initial harvest; replaces whatever was stored.
    pub fn seeded(products: Vec<Record>, source: &str, scraped_at: String) -> Self {
        Self {
            total_products: products.len(),
            products,
            scraped_at,
            source: source.to_string(),
            scraper_version: SCRAPER_VERSION.to_string(),
            provenance: Provenance::InitialLoad,
            new_products_added: None,
        }
    }

    /// Corpus produced by a reveal-more merge.
    pub fn grown(products: Vec<Record>, added: usize, source: &str, scraped_at: String) -> Self {
        Self {
            total_products: products.len(),
            products,
            scraped_at,
            source: source.to_string(),
            scraper_version: SCRAPER_VERSION.to_string(),
            provenance: Provenance::LoadMore,
            new_products_added: Some(added),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
