use harvester_core::{Corpus, Provenance, Record};
use harvester_engine::{
    load_corpus, load_records, save_corpus, FailureKind, FileStore, SnapshotStore, StoreError,
    ENVELOPE_KEY, PRODUCTS_KEY,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn record(id: &str, title: &str) -> Record {
    Record {
        id: id.to_string(),
        title: title.to_string(),
        brand: title.split_whitespace().next().unwrap_or("Croma").to_string(),
        image_url: None,
        detail_url: Some(format!("https://www.croma.com/p/{id}")),
        rating: None,
        review_count: None,
        current_price: Some("₹9,999".to_string()),
        original_price: None,
        discount: None,
        offers: Vec::new(),
        availability: "Standard Delivery by Tomorrow".to_string(),
    }
}

#[test]
fn file_store_round_trips_corpus_under_both_keys() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path().join("snapshots"));
    let corpus = Corpus::grown(
        vec![record("1", "Sony Bravia"), record("2", "LG OLED")],
        1,
        "https://www.croma.com/televisions-accessories/c/997",
        "2026-03-01T10:00:00+00:00".to_string(),
    );

    save_corpus(&store, &corpus).unwrap();

    assert!(temp.path().join("snapshots/products.json").is_file());
    assert!(temp.path().join("snapshots/scraped_content.json").is_file());
    let loaded = load_corpus(&store).unwrap().unwrap();
    assert_eq!(loaded, corpus);
    assert_eq!(loaded.provenance, Provenance::LoadMore);

    let products: Vec<Record> =
        serde_json::from_slice(&store.get(PRODUCTS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(products, corpus.products);
}

#[test]
fn missing_envelope_reads_as_absent() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());

    assert_eq!(load_corpus(&store).unwrap(), None);
    assert!(load_records(&store).unwrap().is_empty());
}

#[test]
fn envelope_is_authoritative_over_products_key() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());
    let corpus = Corpus::seeded(
        vec![record("1", "Sony Bravia")],
        "https://www.croma.com",
        "2026-03-01T10:00:00+00:00".to_string(),
    );
    save_corpus(&store, &corpus).unwrap();
    store.set(PRODUCTS_KEY, b"[]").unwrap();

    assert_eq!(load_records(&store).unwrap(), corpus.products);
}

#[test]
fn malformed_envelope_is_store_corrupt() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());
    store.set(ENVELOPE_KEY, b"not json").unwrap();

    let err = load_corpus(&store).unwrap_err();

    assert_eq!(err.kind, FailureKind::StoreCorrupt);
}

#[test]
fn keys_cannot_escape_the_store_directory() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());

    for key in ["../products", "a/b", "", "products.json"] {
        let err = store.set(key, b"[]").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)), "{key:?}: {err}");
    }
}

#[test]
fn unwritable_directory_is_store_unavailable() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("file");
    std::fs::write(&blocker, "x").unwrap();
    let store = FileStore::new(&blocker);
    let corpus = Corpus::seeded(
        vec![record("1", "Sony Bravia")],
        "https://www.croma.com",
        "2026-03-01T10:00:00+00:00".to_string(),
    );

    let err = save_corpus(&store, &corpus).unwrap_err();

    assert_eq!(err.kind, FailureKind::StoreUnavailable);
}
