//! Executes the core poller's effects against a live renderer.

use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use harvester_core::{update, Effect, Msg, PollReport, PollSettings, PollState};
use tokio::time::{sleep, Instant};

use crate::progress::ProgressSink;
use crate::render::{ControlMatchers, Renderer, SurfaceSpec};
use crate::{HarvestEvent, RenderError};

/// Drive one convergence poll to completion.
///
/// Every wait is a bounded sleep and the poller caps its own step count, so
/// this always returns.
pub async fn run_poll(
    renderer: &mut dyn Renderer,
    settings: PollSettings,
    matchers: &ControlMatchers,
    sink: &dyn ProgressSink,
) -> Result<PollReport, RenderError> {
    let (mut state, mut effects) = update(PollState::new(settings), Msg::Start);

    loop {
        let mut next = None;
        for effect in effects {
            match effect {
                Effect::SampleCount => {
                    next = Some(Msg::CountSampled(renderer.item_count().await?));
                }
                Effect::AdvanceAndSample { by, settle } => {
                    renderer.advance_reveal(by).await?;
                    sleep(settle).await;
                    let count = renderer.item_count().await?;
                    engine_trace!("step {} revealed {}", state.steps(), count);
                    next = Some(Msg::CountSampled(count));
                }
                Effect::SampleImages => {
                    next = Some(Msg::ImagesSampled(renderer.image_tally().await?));
                }
                Effect::ProbeExpansionControl => {
                    let found = renderer.find_control(matchers).await?;
                    if let Some(control) = &found {
                        engine_debug!("expansion control visible: {:?}", control.label);
                    }
                    next = Some(Msg::ControlProbed(found.is_some()));
                }
                Effect::ReportProgress(progress) => sink.emit(HarvestEvent::Progress(progress)),
                Effect::Finish(report) => return Ok(report),
            }
        }

        let Some(msg) = next else {
            return Err(RenderError::Other(format!(
                "poller stalled in {:?}",
                state.phase()
            )));
        };
        (state, effects) = update(state, msg);
    }
}

/// Wait until one of the surface's containers is present.
///
/// Returns the matching container, or `None` once `ceiling` has elapsed.
pub async fn await_surface(
    renderer: &mut dyn Renderer,
    surface: &SurfaceSpec,
    ceiling: Duration,
    interval: Duration,
) -> Result<Option<String>, RenderError> {
    let deadline = Instant::now() + ceiling;
    loop {
        for container in &surface.containers {
            if renderer.has_element(container).await? {
                return Ok(Some(container.clone()));
            }
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(interval).await;
    }
}
