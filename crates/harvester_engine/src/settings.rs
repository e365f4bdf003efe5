use std::fs;
use std::path::Path;
use std::time::Duration;

use harvester_core::{BaseOrigin, OriginError, PollSettings};
use serde::{Deserialize, Serialize};

use crate::extract::ExtractionDefaults;
use crate::render::{ControlMatchers, SurfaceSpec};
use crate::reveal::RevealSettings;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse settings: {0}")]
    Parse(String),
    #[error(transparent)]
    Origin(#[from] OriginError),
}

/// Everything a harvest needs to know about its target listing.
///
/// Loaded from RON; every field is optional and falls back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    pub target_url: String,
    pub base_origin: String,
    pub default_brand: String,
    pub default_availability: String,
    /// Items revealed by an initial harvest when no count is given, and the
    /// base reveal depth before a reveal-more pass.
    pub initial_target: usize,
    pub poll: PollKnobs,
    pub surface: SurfaceKnobs,
    pub reveal: RevealKnobs,
    pub controls: ControlMatchers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollKnobs {
    pub control_threshold: usize,
    pub reveal_step: u32,
    pub settle_ms: u64,
    pub max_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceKnobs {
    pub containers: Vec<String>,
    pub item_selector: String,
    pub wait_ms: u64,
    pub poll_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealKnobs {
    pub wait_ms: u64,
    pub poll_ms: u64,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            target_url: "https://www.croma.com/televisions-accessories/c/997".to_string(),
            base_origin: "https://www.croma.com".to_string(),
            default_brand: "Croma".to_string(),
            default_availability: "Standard Delivery by Tomorrow".to_string(),
            initial_target: 12,
            poll: PollKnobs::default(),
            surface: SurfaceKnobs::default(),
            reveal: RevealKnobs::default(),
            controls: ControlMatchers::default(),
        }
    }
}

impl Default for PollKnobs {
    fn default() -> Self {
        let base = PollSettings::default();
        Self {
            control_threshold: base.control_threshold,
            reveal_step: base.reveal_step,
            settle_ms: base.settle.as_millis() as u64,
            max_steps: base.max_steps,
        }
    }
}

impl Default for SurfaceKnobs {
    fn default() -> Self {
        Self {
            containers: vec!["#product-list-back".to_string(), "ul.product-list".to_string()],
            item_selector: "li.product-item".to_string(),
            wait_ms: 15_000,
            poll_ms: 250,
        }
    }
}

impl Default for RevealKnobs {
    fn default() -> Self {
        Self {
            wait_ms: 8_000,
            poll_ms: 500,
        }
    }
}

impl HarvestSettings {
    pub fn from_ron_str(text: &str) -> Result<Self, SettingsError> {
        ron::from_str(text).map_err(|err| SettingsError::Parse(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|err| SettingsError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_ron_str(&text)
    }

    pub fn poll_settings(&self, target: usize) -> PollSettings {
        PollSettings {
            target,
            control_threshold: self.poll.control_threshold,
            reveal_step: self.poll.reveal_step,
            settle: Duration::from_millis(self.poll.settle_ms),
            max_steps: self.poll.max_steps,
        }
    }

    pub fn surface_spec(&self) -> SurfaceSpec {
        SurfaceSpec {
            url: self.target_url.clone(),
            containers: self.surface.containers.clone(),
            item_selector: self.surface.item_selector.clone(),
        }
    }

    pub fn surface_wait(&self) -> Duration {
        Duration::from_millis(self.surface.wait_ms)
    }

    pub fn surface_poll(&self) -> Duration {
        Duration::from_millis(self.surface.poll_ms.max(1))
    }

    pub fn reveal_settings(&self) -> RevealSettings {
        RevealSettings {
            ceiling: Duration::from_millis(self.reveal.wait_ms),
            poll_interval: Duration::from_millis(self.reveal.poll_ms.max(1)),
        }
    }

    pub fn extraction_defaults(&self) -> Result<ExtractionDefaults, SettingsError> {
        Ok(ExtractionDefaults {
            base_origin: BaseOrigin::parse(&self.base_origin)?,
            default_brand: self.default_brand.clone(),
            default_availability: self.default_availability.clone(),
        })
    }
}
