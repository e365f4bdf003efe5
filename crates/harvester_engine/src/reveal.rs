//! The explicit "reveal more" pass: one activation, a bounded wait, and the
//! index range of the items that appeared.

use std::ops::Range;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use tokio::time::{sleep, Instant};

use crate::render::{ControlMatchers, Renderer};
use crate::RenderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSettings {
    /// Longest time to wait for new items after activation.
    pub ceiling: Duration,
    pub poll_interval: Duration,
}

/// Result of a reveal-more pass. Only `Revealed` carries new items; the other
/// two are ordinary outcomes, not failures.
///
/// Ranges start at the live item count when the pass begins. On a surface
/// that already shows more than the initial target, the items between the
/// target and that count belong to neither an initial nor a reveal-more pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Items in `range` materialized after the control was activated.
    Revealed { range: Range<usize> },
    ControlNotFound { revealed: usize },
    /// The control was activated but the count did not grow within the ceiling.
    NoNewItems { revealed: usize },
}

impl RevealOutcome {
    pub fn new_range(&self) -> Range<usize> {
        match self {
            RevealOutcome::Revealed { range } => range.clone(),
            RevealOutcome::ControlNotFound { revealed } | RevealOutcome::NoNewItems { revealed } => {
                *revealed..*revealed
            }
        }
    }
}

pub async fn reveal_more(
    renderer: &mut dyn Renderer,
    matchers: &ControlMatchers,
    settings: &RevealSettings,
) -> Result<RevealOutcome, RenderError> {
    let previous = renderer.item_count().await?;
    let Some(control) = renderer.find_control(matchers).await? else {
        engine_debug!("no expansion control at {previous} items");
        return Ok(RevealOutcome::ControlNotFound { revealed: previous });
    };

    engine_info!("activating expansion control {:?} at {previous} items", control.label);
    renderer.activate_control(&control).await?;

    let deadline = Instant::now() + settings.ceiling;
    let mut last = previous;
    loop {
        sleep(settings.poll_interval).await;
        let count = renderer.item_count().await?;
        // Stop once the count has grown and held still for one interval.
        if count > previous && count == last {
            break;
        }
        last = count;
        if Instant::now() >= deadline {
            break;
        }
    }

    if last <= previous {
        engine_debug!("activation revealed nothing new ({previous} items)");
        return Ok(RevealOutcome::NoNewItems { revealed: previous });
    }
    Ok(RevealOutcome::Revealed {
        range: previous..last,
    })
}
