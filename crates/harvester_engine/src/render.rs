//! The rendering capability the harvester consumes.
//!
//! A backend hands out one [`Renderer`] per harvest call. The engine never
//! assumes a particular rendering technology; it only moves the reveal
//! position, samples counts, looks for controls and reads item markup.

use std::ops::Range;

use harvester_core::ImageTally;
use serde::{Deserialize, Serialize};

use crate::RenderError;

/// Where the listing lives and how its items are found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub url: String,
    /// Candidate list containers, most specific first.
    pub containers: Vec<String>,
    /// Item selector, scoped to the first container present.
    pub item_selector: String,
}

impl SurfaceSpec {
    /// Scoped item selectors in fallback order, ending with the bare selector.
    pub fn item_selectors(&self) -> impl Iterator<Item = String> + '_ {
        self.containers
            .iter()
            .map(move |container| format!("{container} {}", self.item_selector))
            .chain(std::iter::once(self.item_selector.clone()))
    }
}

/// Ways of recognising a "reveal more" control. Any match counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlMatchers {
    /// CSS selectors tried in order.
    pub selectors: Vec<String>,
    /// Button or link labels, compared case-insensitively after trimming.
    pub labels: Vec<String>,
}

impl Default for ControlMatchers {
    fn default() -> Self {
        Self {
            selectors: vec![
                "button.view-more".to_string(),
                "button.load-more".to_string(),
                "a.load-more".to_string(),
                "[data-testid=\"load-more\"]".to_string(),
            ],
            labels: vec![
                "View More".to_string(),
                "Load More".to_string(),
                "Show More".to_string(),
            ],
        }
    }
}

/// A located expansion control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlHandle {
    /// Visible label, for logs.
    pub label: String,
    /// Backend-specific locator (an href for static pages).
    pub locator: Option<String>,
}

#[async_trait::async_trait]
pub trait Renderer: Send {
    /// Load the listing. Items may keep materializing afterwards.
    async fn load(&mut self, surface: &SurfaceSpec) -> Result<(), RenderError>;

    async fn has_element(&mut self, selector: &str) -> Result<bool, RenderError>;

    /// Number of items currently materialized.
    async fn item_count(&mut self) -> Result<usize, RenderError>;

    /// Move the reveal position forward by `by` units.
    async fn advance_reveal(&mut self, by: u32) -> Result<(), RenderError>;

    async fn image_tally(&mut self) -> Result<ImageTally, RenderError>;

    /// First visible, enabled control matching `matchers`.
    async fn find_control(
        &mut self,
        matchers: &ControlMatchers,
    ) -> Result<Option<ControlHandle>, RenderError>;

    async fn activate_control(&mut self, control: &ControlHandle) -> Result<(), RenderError>;

    /// Outer markup of the items in `range`, in revealed order. Out-of-range
    /// positions are clamped.
    async fn item_fragments(&mut self, range: Range<usize>) -> Result<Vec<String>, RenderError>;

    /// Release whatever the renderer holds. Called once on every exit path.
    async fn close(&mut self);
}

#[async_trait::async_trait]
pub trait RenderBackend: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Renderer>, RenderError>;
}
