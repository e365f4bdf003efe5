use crate::report::{PollReport, Termination};
use crate::state::Awaiting;
use crate::{Effect, Msg, PollPhase, PollState};

/// Pure update function: applies an observation to the poller and returns the
/// next effects to execute.
///
/// At most one effect per call asks for a new observation, so a driver can run
/// the effects in order and feed back the single resulting [`Msg`]. Messages
/// that do not answer the pending request are ignored.
pub fn update(mut state: PollState, msg: Msg) -> (PollState, Vec<Effect>) {
    let effects = match (state.phase, msg) {
        (PollPhase::Idle, Msg::Start) => {
            state.phase = PollPhase::Probing;
            state.awaiting = Awaiting::Count;
            vec![Effect::SampleCount]
        }
        (PollPhase::Probing, Msg::CountSampled(count)) if state.awaiting == Awaiting::Count => {
            if count >= state.settings.target {
                state.revealed = count;
                enter_stable_at_cap(&mut state)
            } else {
                // Anything already rendered counts as growth from nothing.
                state.phase = PollPhase::Incrementing;
                on_count(&mut state, count)
            }
        }
        (PollPhase::Incrementing, Msg::CountSampled(count))
            if state.awaiting == Awaiting::Count =>
        {
            on_count(&mut state, count)
        }
        (PollPhase::Incrementing, Msg::ImagesSampled(tally))
            if state.awaiting == Awaiting::Images =>
        {
            state.images = Some(tally);
            let mut effects = vec![Effect::ReportProgress(state.progress())];
            effects.extend(continue_incrementing(&mut state));
            effects
        }
        (PollPhase::Incrementing, Msg::ControlProbed(found))
            if state.awaiting == Awaiting::Control =>
        {
            if found {
                finish(&mut state, Termination::FoundExpansionControl)
            } else {
                next_step(&mut state)
            }
        }
        (PollPhase::StableAtCap, Msg::ImagesSampled(tally))
            if state.awaiting == Awaiting::Images =>
        {
            state.images = Some(tally);
            let mut effects = vec![Effect::ReportProgress(state.progress())];
            effects.extend(finish(&mut state, Termination::StableAtCap));
            effects
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn on_count(state: &mut PollState, count: usize) -> Vec<Effect> {
    let grew = count > state.revealed;
    state.revealed = count;
    if count >= state.settings.target {
        return enter_stable_at_cap(state);
    }
    if grew {
        state.awaiting = Awaiting::Images;
        return vec![Effect::SampleImages];
    }
    continue_incrementing(state)
}

fn continue_incrementing(state: &mut PollState) -> Vec<Effect> {
    if state.revealed >= state.settings.control_threshold {
        state.awaiting = Awaiting::Control;
        return vec![Effect::ProbeExpansionControl];
    }
    next_step(state)
}

fn next_step(state: &mut PollState) -> Vec<Effect> {
    if state.steps >= state.settings.max_steps {
        return finish(state, Termination::MaxStepsExhausted);
    }
    state.steps += 1;
    state.awaiting = Awaiting::Count;
    vec![Effect::AdvanceAndSample {
        by: state.settings.reveal_step,
        settle: state.settings.settle,
    }]
}

fn enter_stable_at_cap(state: &mut PollState) -> Vec<Effect> {
    state.phase = PollPhase::StableAtCap;
    state.awaiting = Awaiting::Images;
    vec![Effect::SampleImages]
}

fn finish(state: &mut PollState, termination: Termination) -> Vec<Effect> {
    state.phase = PollPhase::Done;
    state.awaiting = Awaiting::Nothing;
    vec![Effect::Finish(PollReport {
        ready: state.revealed.min(state.settings.target),
        revealed: state.revealed,
        termination,
        steps: state.steps,
        images: state.images,
    })]
}
