use harvester_core::{BaseOrigin, Record};
use harvester_engine::{ExtractionDefaults, Extractor, RecordExtractor, Rejection};
use pretty_assertions::assert_eq;

fn extractor() -> RecordExtractor {
    RecordExtractor::new(ExtractionDefaults {
        base_origin: BaseOrigin::parse("https://www.croma.com").unwrap(),
        default_brand: "Croma".to_string(),
        default_availability: "Standard Delivery by Tomorrow".to_string(),
    })
}

const FULL_TILE: &str = r#"
<li class="product-item">
  <div class="cp-product" id="300123">
    <div data-testid="product-img"><img src="/medias/tv.png" alt=""></div>
    <h3 class="product-title"><a href="/samsung-tv/p/300123">Samsung  108 cm
        Crystal 4K TV</a></h3>
    <span class="rating-text">4.3</span>
    <span class="rating-text-icon"><span>&#9733;</span><span>(128)</span></span>
    <span data-testid="new-price">&#8377; 32,990</span>
    <span data-testid="old-price">&#8377;46,900</span>
    <span class="discount-newsearch-plp">29% Off</span>
    <span class="tagsForPlp">Bank Offer</span>
    <span class="tagsForPlp">   </span>
    <span class="tagsForPlp">No Cost EMI</span>
    <span class="delivery-text-msg"><span>Express Delivery in 2 hours</span></span>
  </div>
</li>"#;

#[test]
fn extracts_every_field_of_a_complete_tile() {
    let record = extractor().extract(FULL_TILE, 1).unwrap();

    assert_eq!(
        record,
        Record {
            id: "300123".to_string(),
            title: "Samsung 108 cm Crystal 4K TV".to_string(),
            brand: "Samsung".to_string(),
            image_url: Some("https://www.croma.com/medias/tv.png".to_string()),
            detail_url: Some("https://www.croma.com/samsung-tv/p/300123".to_string()),
            rating: Some("4.3".to_string()),
            review_count: Some("128".to_string()),
            current_price: Some("₹32,990".to_string()),
            original_price: Some("₹46,900".to_string()),
            discount: Some("29% Off".to_string()),
            offers: vec!["Bank Offer".to_string(), "No Cost EMI".to_string()],
            availability: "Express Delivery in 2 hours".to_string(),
        }
    );
}

#[test]
fn bare_container_yields_defaults() {
    let record = extractor()
        .extract(r#"<div class="cp-product"></div>"#, 7)
        .unwrap();

    assert_eq!(
        record,
        Record {
            id: "source_7".to_string(),
            title: "Unknown Product".to_string(),
            brand: "Croma".to_string(),
            image_url: None,
            detail_url: None,
            rating: None,
            review_count: None,
            current_price: None,
            original_price: None,
            discount: None,
            offers: Vec::new(),
            availability: "Standard Delivery by Tomorrow".to_string(),
        }
    );
}

#[test]
fn blank_title_counts_as_missing() {
    let record = extractor()
        .extract(
            r#"<div class="cp-product" id=" "><h3 class="product-title"><a href="/p/1">   </a></h3></div>"#,
            3,
        )
        .unwrap();

    assert_eq!(record.id, "source_3");
    assert_eq!(record.title, "Unknown Product");
    assert_eq!(record.brand, "Croma");
    assert_eq!(record.detail_url.as_deref(), Some("https://www.croma.com/p/1"));
}

#[test]
fn fragment_without_container_is_rejected() {
    let result = extractor().extract(
        r#"<li class="product-item"><div class="product"><h3 class="product-title"><a>LG TV</a></h3></div></li>"#,
        1,
    );

    assert_eq!(result, Err(Rejection::ContainerMissing));
}

#[test]
fn lazy_image_falls_back_to_data_src() {
    let tile = r#"<div class="cp-product" id="9">
        <div data-testid="product-img">
          <img src="data:image/gif;base64,R0lGOD" data-src="//media.croma.com/tv9.png">
        </div>
      </div>"#;

    let record = extractor().extract(tile, 1).unwrap();

    assert_eq!(
        record.image_url.as_deref(),
        Some("https://media.croma.com/tv9.png")
    );
}

#[test]
fn absolute_links_pass_through() {
    let tile = r#"<div class="cp-product" id="9">
        <h3 class="product-title"><a href="https://partner.example/tv/9">Onida Smart 32</a></h3>
      </div>"#;

    let record = extractor().extract(tile, 1).unwrap();

    assert_eq!(record.detail_url.as_deref(), Some("https://partner.example/tv/9"));
    assert_eq!(record.brand, "Onida");
}

#[test]
fn non_numeric_rating_and_reviews_are_dropped() {
    let tile = r#"<div class="cp-product" id="9">
        <span class="rating-text">New</span>
        <span class="rating-text-icon"><span>no reviews yet</span></span>
      </div>"#;

    let record = extractor().extract(tile, 1).unwrap();

    assert_eq!(record.rating, None);
    assert_eq!(record.review_count, None);
}
