use harvester_core::{update, Msg, PollPhase, PollSettings, PollState};

#[test]
fn idle_ignores_everything_but_start() {
    let state = PollState::new(PollSettings::default());
    for msg in [Msg::CountSampled(3), Msg::ControlProbed(true)] {
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}

#[test]
fn unrequested_observation_is_ignored() {
    let (state, _) = update(PollState::new(PollSettings::default()), Msg::Start);
    // The poller asked for a count, not a control probe.
    let (next, effects) = update(state.clone(), Msg::ControlProbed(true));
    assert_eq!(state, next);
    assert_eq!(next.phase(), PollPhase::Probing);
    assert!(effects.is_empty());
}

#[test]
fn done_is_terminal() {
    let settings = PollSettings {
        target: 1,
        ..PollSettings::default()
    };
    let (state, _) = update(PollState::new(settings), Msg::Start);
    let (state, _) = update(state, Msg::CountSampled(1));
    let (state, _) = update(state, Msg::ImagesSampled(Default::default()));
    assert_eq!(state.phase(), PollPhase::Done);

    let (next, effects) = update(state.clone(), Msg::Start);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
