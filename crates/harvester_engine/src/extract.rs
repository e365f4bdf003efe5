use harvester_core::{absolutize, BaseOrigin, Record, UNKNOWN_TITLE};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Values substituted when a fragment does not supply them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionDefaults {
    pub base_origin: BaseOrigin,
    pub default_brand: String,
    pub default_availability: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The fragment has no product container; it is incidental markup.
    #[error("fragment has no product container")]
    ContainerMissing,
}

pub trait Extractor: Send + Sync {
    /// Turn one rendered item into a record. `index` is the 1-based position of
    /// the item on the surface.
    fn extract(&self, fragment: &str, index: usize) -> Result<Record, Rejection>;
}

const CONTAINER: &str = "div.cp-product";
const TITLE_LINK: &str = "h3.product-title a";
const IMAGE: &str = "div[data-testid=\"product-img\"] img";
const RATING: &str = "span.rating-text";
const REVIEW_COUNT: &str = "span.rating-text-icon span:last-child";
const CURRENT_PRICE: &str = "span[data-testid=\"new-price\"]";
const ORIGINAL_PRICE: &str = "span[data-testid=\"old-price\"]";
const DISCOUNT: &str = "span.discount-newsearch-plp";
const OFFER: &str = "span.tagsForPlp";
const DELIVERY: &str = "span.delivery-text-msg span";

/// Selector-driven extractor for product tiles.
///
/// Every field follows "primary selector, else fallback"; a field whose markup
/// is missing or malformed is omitted or defaulted on its own and never aborts
/// the record. Only a missing product container rejects the fragment.
#[derive(Debug)]
pub struct RecordExtractor {
    defaults: ExtractionDefaults,
    container: Option<Selector>,
    title_link: Option<Selector>,
    image: Option<Selector>,
    rating: Option<Selector>,
    review_count: Option<Selector>,
    current_price: Option<Selector>,
    original_price: Option<Selector>,
    discount: Option<Selector>,
    offer: Option<Selector>,
    delivery: Option<Selector>,
    rating_pattern: Option<Regex>,
    review_pattern: Option<Regex>,
}

impl RecordExtractor {
    pub fn new(defaults: ExtractionDefaults) -> Self {
        Self {
            defaults,
            container: Selector::parse(CONTAINER).ok(),
            title_link: Selector::parse(TITLE_LINK).ok(),
            image: Selector::parse(IMAGE).ok(),
            rating: Selector::parse(RATING).ok(),
            review_count: Selector::parse(REVIEW_COUNT).ok(),
            current_price: Selector::parse(CURRENT_PRICE).ok(),
            original_price: Selector::parse(ORIGINAL_PRICE).ok(),
            discount: Selector::parse(DISCOUNT).ok(),
            offer: Selector::parse(OFFER).ok(),
            delivery: Selector::parse(DELIVERY).ok(),
            rating_pattern: Regex::new(r"^\d+(\.\d+)?$").ok(),
            review_pattern: Regex::new(r"\((\d+)\)").ok(),
        }
    }

    pub fn defaults(&self) -> &ExtractionDefaults {
        &self.defaults
    }

    fn rating(&self, root: ElementRef) -> Option<String> {
        let text = first_text(root, &self.rating)?;
        let pattern = self.rating_pattern.as_ref()?;
        pattern.is_match(&text).then_some(text)
    }

    fn review_count(&self, root: ElementRef) -> Option<String> {
        let text = first_text(root, &self.review_count)?;
        let caps = self.review_pattern.as_ref()?.captures(&text)?;
        caps.get(1).map(|m| m.as_str().to_string())
    }

    fn image_url(&self, root: ElementRef) -> Option<String> {
        let img = first(root, &self.image)?;
        let src = img
            .value()
            .attr("src")
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.starts_with("data:"))
            .or_else(|| img.value().attr("data-src"))?;
        absolutize(src, &self.defaults.base_origin)
    }
}

impl Extractor for RecordExtractor {
    fn extract(&self, fragment: &str, index: usize) -> Result<Record, Rejection> {
        let doc = Html::parse_fragment(fragment);
        let root = doc.root_element();
        let container = first(root, &self.container).ok_or(Rejection::ContainerMissing)?;

        let id = container
            .value()
            .attr("id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("source_{index}"));

        let title_link = first(root, &self.title_link);
        let title = title_link.map(text_of).filter(|t| !t.is_empty());
        let brand = title
            .as_deref()
            .and_then(|t| t.split_whitespace().next())
            .map(str::to_string)
            .unwrap_or_else(|| self.defaults.default_brand.clone());
        let detail_url = title_link
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| absolutize(href, &self.defaults.base_origin));

        let current_price = first_text(root, &self.current_price)
            .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect::<String>());

        let offers = self
            .offer
            .as_ref()
            .map(|sel| {
                root.select(sel)
                    .map(text_of)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let availability = first_text(root, &self.delivery)
            .unwrap_or_else(|| self.defaults.default_availability.clone());

        Ok(Record {
            id,
            title: title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            brand,
            image_url: self.image_url(root),
            detail_url,
            rating: self.rating(root),
            review_count: self.review_count(root),
            current_price,
            original_price: first_text(root, &self.original_price),
            discount: first_text(root, &self.discount),
            offers,
            availability,
        })
    }
}

fn first<'a>(root: ElementRef<'a>, selector: &Option<Selector>) -> Option<ElementRef<'a>> {
    selector.as_ref().and_then(|sel| root.select(sel).next())
}

/// Trimmed, whitespace-collapsed text of the first match; `None` when blank.
fn first_text(root: ElementRef, selector: &Option<Selector>) -> Option<String> {
    first(root, selector).map(text_of).filter(|t| !t.is_empty())
}

fn text_of(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
