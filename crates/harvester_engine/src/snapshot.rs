//! Corpus (de)serialization over a [`SnapshotStore`].

use harvester_core::{Corpus, Record};

use crate::store::SnapshotStore;
use crate::{FailureKind, HarvestError};

/// Key holding the bare record list.
pub const PRODUCTS_KEY: &str = "products";
/// Key holding the full envelope (records + metadata).
pub const ENVELOPE_KEY: &str = "scraped_content";

/// Reads the stored corpus. The envelope key is authoritative.
pub fn load_corpus(store: &dyn SnapshotStore) -> Result<Option<Corpus>, HarvestError> {
    let Some(bytes) = store
        .get(ENVELOPE_KEY)
        .map_err(|err| HarvestError::new(FailureKind::StoreUnavailable, err.to_string()))?
    else {
        return Ok(None);
    };
    let corpus: Corpus = serde_json::from_slice(&bytes).map_err(|err| {
        HarvestError::new(
            FailureKind::StoreCorrupt,
            format!("malformed {ENVELOPE_KEY} envelope: {err}"),
        )
    })?;
    Ok(Some(corpus))
}

/// Writes the record list and then the envelope.
///
/// The two writes are not atomic as a pair; a concurrent writer outside this
/// engine wins if it writes last.
pub fn save_corpus(store: &dyn SnapshotStore, corpus: &Corpus) -> Result<(), HarvestError> {
    let products = encode(&corpus.products)?;
    let envelope = encode(corpus)?;
    store
        .set(PRODUCTS_KEY, &products)
        .and_then(|_| store.set(ENVELOPE_KEY, &envelope))
        .map_err(|err| HarvestError::new(FailureKind::StoreUnavailable, err.to_string()))?;
    engine_logging::engine_info!(
        "stored corpus of {} records ({})",
        corpus.total_products,
        corpus.provenance.as_str()
    );
    Ok(())
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HarvestError> {
    serde_json::to_vec(value)
        .map_err(|err| HarvestError::new(FailureKind::StoreUnavailable, err.to_string()))
}

/// Convenience for read-only callers that only need the records.
pub fn load_records(store: &dyn SnapshotStore) -> Result<Vec<Record>, HarvestError> {
    Ok(load_corpus(store)?.map(|c| c.products).unwrap_or_default())
}
