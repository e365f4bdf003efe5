//! A rendering backend for server-rendered listings.
//!
//! The fetched document is treated as fully materialized: moving the reveal
//! position changes nothing, and a "reveal more" control is followed as a link
//! whose page contributes its items to the surface.

use std::ops::Range;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_trace};
use harvester_core::ImageTally;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::decode::decode_html;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::render::{ControlHandle, ControlMatchers, RenderBackend, Renderer, SurfaceSpec};
use crate::RenderError;

const CLICKABLE: &str = "button, a, [role=\"button\"]";
const LAZY_MARKERS: [&str; 3] = ["placeholder", "lazy", "spinner"];

pub struct StaticPageBackend {
    fetcher: Arc<dyn Fetcher>,
}

impl StaticPageBackend {
    pub fn new(settings: FetchSettings) -> Self {
        Self::with_fetcher(Arc::new(ReqwestFetcher::new(settings)))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait::async_trait]
impl RenderBackend for StaticPageBackend {
    async fn launch(&self) -> Result<Box<dyn Renderer>, RenderError> {
        Ok(Box::new(StaticPageRenderer::new(self.fetcher.clone())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageState {
    Resolved,
    Pending,
    Absent,
}

#[derive(Debug, Clone)]
struct StaticItem {
    html: String,
    image: ImageState,
}

pub struct StaticPageRenderer {
    fetcher: Arc<dyn Fetcher>,
    surface: Option<SurfaceSpec>,
    page_url: Option<Url>,
    page_html: String,
    items: Vec<StaticItem>,
    reveal_position: u64,
}

impl StaticPageRenderer {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            surface: None,
            page_url: None,
            page_html: String::new(),
            items: Vec::new(),
            reveal_position: 0,
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<(Url, String), RenderError> {
        let output = self.fetcher.fetch(url).await?;
        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref())
            .map_err(|err| RenderError::Other(err.to_string()))?;
        let final_url = Url::parse(&output.metadata.final_url)
            .map_err(|err| RenderError::Other(format!("bad final url: {err}")))?;
        Ok((final_url, decoded.html))
    }

    fn surface(&self) -> Result<&SurfaceSpec, RenderError> {
        self.surface.as_ref().ok_or(RenderError::NotLoaded)
    }

    fn absorb_page(&mut self, url: Url, html: String) -> Result<usize, RenderError> {
        let items = parse_items(&html, self.surface()?)?;
        let added = items.len();
        self.items.extend(items);
        self.page_url = Some(url);
        self.page_html = html;
        Ok(added)
    }
}

#[async_trait::async_trait]
impl Renderer for StaticPageRenderer {
    async fn load(&mut self, surface: &SurfaceSpec) -> Result<(), RenderError> {
        self.surface = Some(surface.clone());
        self.items.clear();
        self.reveal_position = 0;
        let (url, html) = self.fetch_page(&surface.url).await?;
        let count = self.absorb_page(url, html)?;
        engine_debug!("static surface {} holds {} items", surface.url, count);
        Ok(())
    }

    async fn has_element(&mut self, selector: &str) -> Result<bool, RenderError> {
        let selector = parse_selector(selector)?;
        let doc = Html::parse_document(&self.page_html);
        let present = doc.select(&selector).next().is_some();
        Ok(present)
    }

    async fn item_count(&mut self) -> Result<usize, RenderError> {
        Ok(self.items.len())
    }

    async fn advance_reveal(&mut self, by: u32) -> Result<(), RenderError> {
        self.reveal_position += u64::from(by);
        engine_trace!("static reveal position {}", self.reveal_position);
        Ok(())
    }

    async fn image_tally(&mut self) -> Result<ImageTally, RenderError> {
        let mut tally = ImageTally::default();
        for item in &self.items {
            match item.image {
                ImageState::Resolved => tally.resolved += 1,
                ImageState::Pending => tally.pending += 1,
                ImageState::Absent => {}
            }
        }
        Ok(tally)
    }

    async fn find_control(
        &mut self,
        matchers: &ControlMatchers,
    ) -> Result<Option<ControlHandle>, RenderError> {
        find_control_in(&self.page_html, matchers)
    }

    async fn activate_control(&mut self, control: &ControlHandle) -> Result<(), RenderError> {
        let Some(locator) = control.locator.as_deref() else {
            engine_debug!(
                "control {:?} has no link target; nothing to follow on a static page",
                control.label
            );
            return Ok(());
        };
        let base = self.page_url.as_ref().ok_or(RenderError::NotLoaded)?;
        let next = base
            .join(locator)
            .map_err(|err| RenderError::Other(format!("bad control target {locator:?}: {err}")))?;
        let (url, html) = self.fetch_page(next.as_str()).await?;
        let added = self.absorb_page(url, html)?;
        engine_debug!("followed {} and gained {} items", next, added);
        Ok(())
    }

    async fn item_fragments(&mut self, range: Range<usize>) -> Result<Vec<String>, RenderError> {
        let len = self.items.len();
        let range = range.start.min(len)..range.end.min(len);
        Ok(self.items[range].iter().map(|item| item.html.clone()).collect())
    }

    async fn close(&mut self) {
        self.items.clear();
        self.page_html.clear();
        self.page_url = None;
    }
}

fn parse_selector(selector: &str) -> Result<Selector, RenderError> {
    Selector::parse(selector).map_err(|err| RenderError::Selector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

fn parse_items(html: &str, surface: &SurfaceSpec) -> Result<Vec<StaticItem>, RenderError> {
    let doc = Html::parse_document(html);
    let img = parse_selector("img")?;
    for scoped in surface.item_selectors() {
        let selector = parse_selector(&scoped)?;
        let items: Vec<StaticItem> = doc
            .select(&selector)
            .map(|el| StaticItem {
                html: el.html(),
                image: image_state(el.select(&img).next()),
            })
            .collect();
        if !items.is_empty() {
            return Ok(items);
        }
    }
    Ok(Vec::new())
}

fn image_state(img: Option<ElementRef>) -> ImageState {
    let Some(img) = img else {
        return ImageState::Absent;
    };
    let src = img.value().attr("src").map(str::trim).unwrap_or("");
    let lazy_class = img
        .value()
        .classes()
        .any(|class| LAZY_MARKERS.iter().any(|m| class.contains(m)));
    let placeholder_src = LAZY_MARKERS.iter().any(|m| src.contains(m));
    if src.is_empty() || src.starts_with("data:") || lazy_class || placeholder_src {
        ImageState::Pending
    } else {
        ImageState::Resolved
    }
}

fn find_control_in(
    html: &str,
    matchers: &ControlMatchers,
) -> Result<Option<ControlHandle>, RenderError> {
    let doc = Html::parse_document(html);

    for raw in &matchers.selectors {
        let selector = parse_selector(raw)?;
        if let Some(el) = doc.select(&selector).find(|el| is_usable(*el)) {
            return Ok(Some(handle_for(el)));
        }
    }

    let clickable = parse_selector(CLICKABLE)?;
    let found = doc.select(&clickable).find(|el| {
        let text = el.text().collect::<String>();
        let text = text.trim();
        is_usable(*el)
            && matchers
                .labels
                .iter()
                .any(|label| label.trim().eq_ignore_ascii_case(text))
    });
    Ok(found.map(handle_for))
}

fn is_usable(el: ElementRef) -> bool {
    let value = el.value();
    if value.attr("disabled").is_some() || value.attr("hidden").is_some() {
        return false;
    }
    if value.attr("aria-disabled") == Some("true") {
        return false;
    }
    let style: String = value
        .attr("style")
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    !style.contains("display:none") && !style.contains("visibility:hidden")
}

fn handle_for(el: ElementRef) -> ControlHandle {
    let label = el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
    let locator = el
        .value()
        .attr("href")
        .or_else(|| el.value().attr("data-href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:"))
        .map(str::to_string);
    ControlHandle { label, locator }
}
