use pitch_journey::{
    BundledLoader, Dataset, HeadlessController, Journey, JourneyConfig, JourneyError,
    JourneyEvent, MapLayer, PitchEngine, PromptCommand, Step, headless_controller,
};

fn controller() -> HeadlessController {
    PitchEngine::new(BundledLoader).create_headless().unwrap()
}

/// Press the prompt button carrying `command`, as the viewer would.
fn press(ctl: &mut HeadlessController, command: &PromptCommand) {
    let prompt = ctl.chat().current().cloned().unwrap();
    assert!(
        prompt.offers(command),
        "prompt '{}' does not offer {command:?}",
        prompt.title
    );
    ctl.dispatch(command).unwrap();
}

fn position(events: &[JourneyEvent], wanted: &JourneyEvent) -> usize {
    events
        .iter()
        .position(|event| event == wanted)
        .unwrap_or_else(|| panic!("missing event {wanted:?}"))
}

#[test]
fn viewer_can_walk_the_whole_presentation_with_prompt_buttons() {
    let mut ctl = controller();
    let transition_ms = ctl.config().transition_ms;
    let auto_advance_ms = ctl.config().auto_advance_ms;

    ctl.begin(Journey::A);
    press(&mut ctl, &PromptCommand::Advance(Step::A2));
    assert!(ctl.map().is_visible(MapLayer::ResourceMarkers));
    assert!(ctl.map().is_visible(MapLayer::BoundaryCircle));

    press(&mut ctl, &PromptCommand::Explore("water".into()));
    press(&mut ctl, &PromptCommand::Explore("power".into()));
    press(&mut ctl, &PromptCommand::Advance(Step::A3));
    press(&mut ctl, &PromptCommand::Transition(Journey::B));

    ctl.advance_clock(transition_ms);
    assert_eq!(ctl.session().step(), Some(Step::B1));
    assert!(!ctl.map().is_visible(MapLayer::ResourceMarkers));
    assert_eq!(ctl.map().legend, Some(Journey::B));

    ctl.advance_clock(auto_advance_ms);
    assert_eq!(ctl.session().step(), Some(Step::B4));
    press(&mut ctl, &PromptCommand::ReviewCompany("helix-bio".into()));
    assert!(ctl.session().explored_companies().contains("helix-bio"));
    press(&mut ctl, &PromptCommand::Advance(Step::B6));
    assert!(ctl.map().is_visible(MapLayer::InfrastructureRoads));
    press(&mut ctl, &PromptCommand::Advance(Step::B7));
    assert!(ctl.map().is_visible(MapLayer::FutureZones));
    assert!(ctl.map().is_visible(MapLayer::ScienceParks));
    press(&mut ctl, &PromptCommand::Transition(Journey::C));

    ctl.advance_clock(transition_ms);
    assert_eq!(ctl.session().step(), Some(Step::C1));
    assert!(!ctl.map().is_visible(MapLayer::InfrastructureRoads));
    assert!(ctl.map().is_visible(MapLayer::PropertyMarkers));

    press(&mut ctl, &PromptCommand::Advance(Step::Complete));
    assert!(ctl.map().is_visible(MapLayer::RouteLines));
    assert!(ctl.chat().current().unwrap().input_enabled);

    press(&mut ctl, &PromptCommand::Restart);
    assert_eq!(ctl.session().step(), None);
    ctl.advance_clock(ctl.config().restart_pause_ms);
    assert_eq!(ctl.session().step(), Some(Step::A1));
    assert_eq!(ctl.session().journey(), Some(Journey::A));
}

#[test]
fn journey_a_exploration_gates_the_continuation() {
    let mut ctl = controller();
    ctl.begin(Journey::A);
    ctl.advance(Step::A2).unwrap();

    let continuation = PromptCommand::Advance(Step::A3);
    ctl.select_explore_item("water").unwrap();
    assert!(!ctl.chat().current().unwrap().offers(&continuation));
    ctl.select_explore_item("water").unwrap();
    assert_eq!(ctl.session().explored_resources().len(), 1);

    ctl.select_explore_item("power").unwrap();
    assert!(ctl.chat().current().unwrap().offers(&continuation));
    ctl.advance(Step::A3).unwrap();
}

#[test]
fn leaving_journey_b_follows_the_documented_order() {
    let mut ctl = controller();
    ctl.begin(Journey::B);
    ctl.advance(Step::B4).unwrap();
    ctl.select_company("northwind-compute").unwrap();
    ctl.advance(Step::B6).unwrap();
    ctl.advance(Step::B7).unwrap();
    ctl.take_events();

    ctl.transition_to_next_journey().unwrap();
    ctl.advance_clock(ctl.config().transition_ms);
    let events = ctl.take_events();

    let order = [
        JourneyEvent::PromptArchived(Step::B7),
        JourneyEvent::PromptHidden,
        JourneyEvent::PanelHidden,
        JourneyEvent::LayerHidden(MapLayer::InfrastructureRoads),
        JourneyEvent::TransitionStarted {
            from: Journey::B,
            to: Journey::C,
        },
        JourneyEvent::TransitionFinished(Journey::C),
        JourneyEvent::JourneyBegan(Journey::C),
        JourneyEvent::StepEntered(Step::C1),
    ];
    let positions: Vec<usize> = order.iter().map(|e| position(&events, e)).collect();
    assert!(
        positions.windows(2).all(|pair| pair[0] < pair[1]),
        "events out of order: {events:#?}"
    );
    assert!(ctl.chat().history().is_empty());
}

#[test]
fn illegal_moves_leave_the_session_untouched() {
    let mut ctl = controller();
    assert!(matches!(
        ctl.advance(Step::A2),
        Err(JourneyError::InvalidTransition { from: None, .. })
    ));
    assert!(ctl.restore_last_prompt().is_err());

    ctl.begin(Journey::A);
    let session = ctl.session().clone();
    let events = ctl.events().len();
    let prompt = ctl.chat().current().cloned();

    assert!(ctl.advance(Step::B4).is_err());
    assert!(ctl.advance(Step::A3).is_err());
    assert!(ctl.select_company("helix-bio").is_err());
    assert!(ctl.transition_to_next_journey().is_err());
    assert!(ctl.dispatch(&PromptCommand::Transition(Journey::C)).is_err());
    assert!(ctl.ask_follow_up("When can I visit?").is_err());

    assert_eq!(ctl.session(), &session);
    assert_eq!(ctl.events().len(), events);
    assert_eq!(ctl.chat().current().cloned(), prompt);
}

#[test]
fn restart_cancels_pending_journey_work() {
    let mut ctl = controller();
    ctl.begin(Journey::B);
    ctl.restart();
    assert!(ctl.scheduler().pending().len() == 1);
    assert_eq!(ctl.advance_clock(60_000), 1);
    assert_eq!(ctl.session().step(), Some(Step::A1));
    assert!(!ctl.map().is_visible(MapLayer::CompanyMarkers));
}

#[test]
fn a_slow_transition_is_not_interrupted_by_early_clock_ticks() {
    let config = JourneyConfig {
        transition_ms: 5_000,
        ..JourneyConfig::default()
    };
    let mut ctl = headless_controller(Dataset::bundled().unwrap(), config).unwrap();
    ctl.begin(Journey::A);
    ctl.advance(Step::A2).unwrap();
    ctl.select_explore_item("water").unwrap();
    ctl.select_explore_item("power").unwrap();
    ctl.advance(Step::A3).unwrap();
    ctl.transition_to_next_journey().unwrap();

    assert_eq!(ctl.advance_clock(4_999), 0);
    assert_eq!(ctl.session().step(), Some(Step::A3));
    assert_eq!(ctl.map().transition, Some(Journey::B));
    assert_eq!(ctl.advance_clock(1), 1);
    assert_eq!(ctl.session().step(), Some(Step::B1));
    assert_eq!(ctl.map().transition, None);
}
