use pitch_journey::{
    DashboardCategory, DashboardView, Journey, JourneyConfig, JourneyEvent, MapLayer, PanelKind,
    PanelTarget, PromptCommand, Step,
};

use super::{Expectation, Script, ScriptStep};

/// Short key and description of every built-in scenario.
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Full tour using prompt buttons"),
        ("explore-gate", "Journey A continuation needs every required resource"),
        ("journey-handoff", "B7 to C transition ordering and history reset"),
        ("auto-advance", "B1 pauses then reveals company markers"),
        ("restart", "Restart clears the map and begins journey A again"),
        ("chat-history", "Chat back and prompt restoration"),
        ("panel-history", "Panel back restores content and scroll"),
        ("dashboard", "Dashboard drill-down and breadcrumb home"),
        ("evidence", "Evidence deep link and disclosure toggles"),
        ("illegal-moves", "Rejected operations leave state untouched"),
        ("follow-up", "Free-form questions after the tour"),
    ]
}

pub fn find_scenario(key: &str) -> Option<Script> {
    let script = match key {
        "smoke" => smoke(),
        "explore-gate" => explore_gate(),
        "journey-handoff" => journey_handoff(),
        "auto-advance" => auto_advance(),
        "restart" => restart(),
        "chat-history" => chat_history(),
        "panel-history" => panel_history(),
        "dashboard" => dashboard(),
        "evidence" => evidence(),
        "illegal-moves" => illegal_moves(),
        "follow-up" => follow_up(),
        _ => return None,
    };
    Some(script)
}

fn scripted(key: &str) -> Script {
    let description = list_scenarios()
        .into_iter()
        .find(|(name, _)| *name == key)
        .map_or("", |(_, description)| description);
    Script::new(key, description)
}

fn press(command: PromptCommand) -> ScriptStep {
    ScriptStep::Press { command }
}

fn step_is(step: Step) -> Expectation {
    Expectation::Step { step: Some(step) }
}

fn layer(layer: MapLayer, visible: bool) -> Expectation {
    Expectation::LayerVisible { layer, visible }
}

fn rejected(attempt: ScriptStep) -> ScriptStep {
    ScriptStep::ExpectRejected {
        attempt: Box::new(attempt),
    }
}

fn transition_wait() -> ScriptStep {
    ScriptStep::Wait {
        ms: JourneyConfig::default().transition_ms,
    }
}

fn auto_advance_wait() -> ScriptStep {
    ScriptStep::Wait {
        ms: JourneyConfig::default().auto_advance_ms,
    }
}

fn explored_journey_a(key: &str) -> Script {
    scripted(key)
        .then(ScriptStep::Begin {
            journey: Journey::A,
        })
        .then(press(PromptCommand::Advance(Step::A2)))
        .then(press(PromptCommand::Explore("water".into())))
        .then(press(PromptCommand::Explore("power".into())))
}

fn smoke() -> Script {
    explored_journey_a("smoke")
        .then(press(PromptCommand::Advance(Step::A3)))
        .then(press(PromptCommand::Transition(Journey::B)))
        .then(transition_wait())
        .expect(step_is(Step::B1))
        .expect(Expectation::Legend {
            journey: Some(Journey::B),
        })
        .then(auto_advance_wait())
        .expect(step_is(Step::B4))
        .then(press(PromptCommand::ReviewCompany("northwind-compute".into())))
        .then(press(PromptCommand::Advance(Step::B6)))
        .then(press(PromptCommand::Advance(Step::B7)))
        .then(press(PromptCommand::Transition(Journey::C)))
        .then(transition_wait())
        .expect(step_is(Step::C1))
        .then(press(PromptCommand::Advance(Step::Complete)))
        .expect(layer(MapLayer::RouteLines, true))
        .expect(Expectation::PromptOffers {
            command: PromptCommand::Restart,
        })
}

fn explore_gate() -> Script {
    let continuation = PromptCommand::Advance(Step::A3);
    scripted("explore-gate")
        .then(ScriptStep::Begin {
            journey: Journey::A,
        })
        .then(ScriptStep::Advance { to: Step::A2 })
        .expect(layer(MapLayer::ResourceMarkers, true))
        .expect(layer(MapLayer::BoundaryCircle, true))
        .then(ScriptStep::Explore { id: "water".into() })
        .expect(Expectation::PromptLacks {
            command: continuation.clone(),
        })
        .then(rejected(ScriptStep::Advance { to: Step::A3 }))
        .then(ScriptStep::Explore { id: "fibre".into() })
        .expect(Expectation::PromptLacks {
            command: continuation.clone(),
        })
        .then(ScriptStep::Explore { id: "power".into() })
        .expect(Expectation::Explored { id: "power".into() })
        .expect(Expectation::PromptOffers {
            command: continuation,
        })
        .then(ScriptStep::Advance { to: Step::A3 })
        .expect(step_is(Step::A3))
}

fn journey_handoff() -> Script {
    scripted("journey-handoff")
        .then(ScriptStep::Begin {
            journey: Journey::B,
        })
        .then(ScriptStep::Advance { to: Step::B4 })
        .then(ScriptStep::ReviewCompany {
            id: "ridgeline-logistics".into(),
        })
        .then(ScriptStep::Advance { to: Step::B6 })
        .then(ScriptStep::Advance { to: Step::B7 })
        .then(ScriptStep::ClearEvents)
        .then(ScriptStep::Transition)
        .expect(Expectation::ChatOpen { open: false })
        .expect(Expectation::PanelOpen { open: false })
        .expect(layer(MapLayer::InfrastructureRoads, false))
        .then(rejected(ScriptStep::Transition))
        .then(transition_wait())
        .expect(Expectation::EventsInOrder {
            events: vec![
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
            ],
        })
        .expect(step_is(Step::C1))
        .expect(Expectation::ChatHistoryLen { len: 0 })
        .expect(layer(MapLayer::PropertyMarkers, true))
}

fn auto_advance() -> Script {
    scripted("auto-advance")
        .then(ScriptStep::Begin {
            journey: Journey::B,
        })
        .expect(layer(MapLayer::CompanyMarkers, false))
        .then(ScriptStep::Wait { ms: 500 })
        .expect(step_is(Step::B1))
        .then(auto_advance_wait())
        .expect(step_is(Step::B4))
        .expect(layer(MapLayer::CompanyMarkers, true))
        .then(ScriptStep::ToggleLayer {
            layer: MapLayer::CompanyMarkers,
        })
        .expect(layer(MapLayer::CompanyMarkers, false))
}

fn restart() -> Script {
    explored_journey_a("restart")
        .then(ScriptStep::OpenEvidence {
            group: "water-permits".into(),
            item: None,
        })
        .then(ScriptStep::Restart)
        .expect(Expectation::Step { step: None })
        .expect(Expectation::ChatOpen { open: false })
        .expect(Expectation::PanelOpen { open: false })
        .expect(Expectation::Legend { journey: None })
        .expect(layer(MapLayer::ResourceMarkers, false))
        .expect(Expectation::EvidenceExpanded {
            group: "water-permits".into(),
            expanded: false,
        })
        .then(ScriptStep::Wait {
            ms: JourneyConfig::default().restart_pause_ms,
        })
        .expect(step_is(Step::A1))
        .expect(Expectation::ChatHistoryLen { len: 0 })
}

fn chat_history() -> Script {
    scripted("chat-history")
        .then(ScriptStep::Begin {
            journey: Journey::A,
        })
        .then(ScriptStep::Advance { to: Step::A2 })
        .expect(Expectation::ChatHistoryLen { len: 1 })
        .then(ScriptStep::Explore { id: "water".into() })
        .expect(Expectation::ChatHistoryLen { len: 1 })
        .then(ScriptStep::DismissPrompt)
        .then(ScriptStep::RestorePrompt)
        .then(ScriptStep::RestorePrompt)
        .expect(Expectation::ChatOpen { open: true })
        .expect(Expectation::ChatHistoryLen { len: 1 })
        .then(ScriptStep::ChatBack)
        .expect(Expectation::PromptTitle {
            title: "Welcome to Halden Ridge Innovation Quarter".into(),
        })
        .expect(step_is(Step::A2))
        .then(rejected(ScriptStep::ChatBack))
}

fn panel_history() -> Script {
    scripted("panel-history")
        .then(ScriptStep::OpenPanel {
            target: PanelTarget::Property("plot-7".into()),
        })
        .then(ScriptStep::ScrollPanel { offset: 140 })
        .then(ScriptStep::OpenPanel {
            target: PanelTarget::SciencePark("ridge-science-park".into()),
        })
        .expect(Expectation::PanelScroll { offset: 0 })
        .then(ScriptStep::OpenPanel {
            target: PanelTarget::SciencePark("ridge-science-park".into()),
        })
        .expect(Expectation::PanelHistoryLen { len: 1 })
        .then(ScriptStep::PanelBack)
        .expect(Expectation::PanelShows {
            kind: PanelKind::Property("plot-7".into()),
        })
        .expect(Expectation::PanelScroll { offset: 140 })
        .then(rejected(ScriptStep::PanelBack))
}

fn dashboard() -> Script {
    let category = DashboardView::Category(DashboardCategory::Properties);
    let entity = DashboardView::Entity(DashboardCategory::Properties, "canal-yard".into());
    scripted("dashboard")
        .then(ScriptStep::OpenDashboard {
            view: DashboardView::Overview,
            clear_history: false,
        })
        .then(ScriptStep::OpenDashboard {
            view: category,
            clear_history: false,
        })
        .then(ScriptStep::OpenDashboard {
            view: entity.clone(),
            clear_history: false,
        })
        .expect(Expectation::PanelShows {
            kind: PanelKind::Dashboard(entity),
        })
        .expect(Expectation::PanelHistoryLen { len: 2 })
        .then(ScriptStep::OpenDashboard {
            view: DashboardView::Overview,
            clear_history: true,
        })
        .expect(Expectation::PanelHistoryLen { len: 0 })
        .then(rejected(ScriptStep::OpenDashboard {
            view: DashboardView::Entity(DashboardCategory::Companies, "acme".into()),
            clear_history: false,
        }))
}

fn evidence() -> Script {
    scripted("evidence")
        .then(ScriptStep::OpenEvidence {
            group: "grid-capacity".into(),
            item: Some("solar-ppa".into()),
        })
        .expect(Expectation::PanelShows {
            kind: PanelKind::Evidence,
        })
        .expect(Expectation::EvidenceExpanded {
            group: "grid-capacity".into(),
            expanded: true,
        })
        .then(ScriptStep::ToggleEvidence {
            group: "grid-capacity".into(),
        })
        .expect(Expectation::EvidenceExpanded {
            group: "grid-capacity".into(),
            expanded: false,
        })
        .expect(Expectation::PanelHistoryLen { len: 0 })
        .then(ScriptStep::OpenEvidence {
            group: "grid-capacity".into(),
            item: None,
        })
        .expect(Expectation::EvidenceExpanded {
            group: "grid-capacity".into(),
            expanded: true,
        })
        .then(rejected(ScriptStep::OpenEvidence {
            group: "planning".into(),
            item: Some("missing".into()),
        }))
        .then(rejected(ScriptStep::ToggleEvidence {
            group: "tax".into(),
        }))
}

fn illegal_moves() -> Script {
    scripted("illegal-moves")
        .then(rejected(ScriptStep::Advance { to: Step::A1 }))
        .then(rejected(ScriptStep::RestorePrompt))
        .then(ScriptStep::Begin {
            journey: Journey::A,
        })
        .then(rejected(ScriptStep::Advance { to: Step::A3 }))
        .then(rejected(ScriptStep::Advance { to: Step::B4 }))
        .then(rejected(ScriptStep::ReviewCompany {
            id: "helix-bio".into(),
        }))
        .then(rejected(ScriptStep::Transition))
        .then(rejected(ScriptStep::ToggleLayer {
            layer: MapLayer::FutureZones,
        }))
        .then(rejected(ScriptStep::AskFollowUp {
            question: "How much is Plot 7?".into(),
        }))
        .then(ScriptStep::Advance { to: Step::A2 })
        .then(rejected(ScriptStep::Explore {
            id: "uranium".into(),
        }))
        .expect(step_is(Step::A2))
}

fn follow_up() -> Script {
    scripted("follow-up")
        .then(ScriptStep::Begin {
            journey: Journey::C,
        })
        .then(ScriptStep::Advance {
            to: Step::Complete,
        })
        .then(ScriptStep::AskFollowUp {
            question: "   ".into(),
        })
        .expect(Expectation::PromptTitle {
            title: "Thank you".into(),
        })
        .then(ScriptStep::AskFollowUp {
            question: "When could we start construction?".into(),
        })
        .expect(Expectation::PromptTitle {
            title: "Follow-up".into(),
        })
        .then(ScriptStep::ChatBack)
        .expect(Expectation::PromptTitle {
            title: "Thank you".into(),
        })
        .then(press(PromptCommand::Restart))
        .expect(Expectation::Step { step: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::apply;
    use pitch_journey::{BundledLoader, PitchEngine};

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, description) in list_scenarios() {
            let script = find_scenario(key).unwrap();
            assert_eq!(script.name, key);
            assert_eq!(script.description, description);
            assert!(!script.steps.is_empty());
        }
        assert!(find_scenario("missing").is_none());
    }

    #[test]
    fn built_in_scenarios_pass_against_bundled_content() {
        let engine = PitchEngine::new(BundledLoader);
        for (key, _) in list_scenarios() {
            let script = find_scenario(key).unwrap();
            let mut ctl = engine.create_headless().unwrap();
            for (index, step) in script.steps.iter().enumerate() {
                if let Err(err) = apply(&mut ctl, step) {
                    panic!(
                        "{} failed at step {} ({}): {err:#}",
                        script.name,
                        index + 1,
                        step.label()
                    );
                }
            }
        }
    }
}
