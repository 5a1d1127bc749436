use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;

use pitch_journey::{
    DashboardView, HeadlessController, Journey, JourneyError, JourneyEvent, MapLayer, PanelKind,
    PanelOptions, PanelTarget, PromptCommand, Step,
};

pub mod catalog;

/// A named, data-driven walk through the presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn then(mut self, step: ScriptStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn expect(self, check: Expectation) -> Self {
        self.then(ScriptStep::Expect { check })
    }

    /// Load a script from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// One viewer action or assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    Begin { journey: Journey },
    Advance { to: Step },
    Explore { id: String },
    ReviewCompany { id: String },
    /// Press a button on the visible prompt; fails if the prompt lacks it.
    Press { command: PromptCommand },
    Transition,
    Wait { ms: u64 },
    Restart,
    DismissPrompt,
    RestorePrompt,
    ChatBack,
    PanelBack,
    OpenPanel { target: PanelTarget },
    OpenDashboard {
        view: DashboardView,
        #[serde(default)]
        clear_history: bool,
    },
    OpenEvidence {
        group: String,
        #[serde(default)]
        item: Option<String>,
    },
    ToggleEvidence { group: String },
    ToggleLayer { layer: MapLayer },
    ScrollPanel { offset: u32 },
    ClosePanel,
    AskFollowUp { question: String },
    ClearEvents,
    Expect { check: Expectation },
    /// Run the inner step and require it to be rejected without side effects.
    ExpectRejected { attempt: Box<ScriptStep> },
}

impl ScriptStep {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Begin { journey } => format!("begin {journey:?}"),
            Self::Advance { to } => format!("advance to {to}"),
            Self::Explore { id } => format!("explore {id}"),
            Self::ReviewCompany { id } => format!("review {id}"),
            Self::Press { command } => format!("press {command:?}"),
            Self::Transition => "transition".to_string(),
            Self::Wait { ms } => format!("wait {ms} ms"),
            Self::Restart => "restart".to_string(),
            Self::DismissPrompt => "dismiss prompt".to_string(),
            Self::RestorePrompt => "restore prompt".to_string(),
            Self::ChatBack => "chat back".to_string(),
            Self::PanelBack => "panel back".to_string(),
            Self::OpenPanel { target } => format!("open panel {}", target.id()),
            Self::OpenDashboard { view, .. } => format!("open dashboard {view:?}"),
            Self::OpenEvidence { group, .. } => format!("open evidence {group}"),
            Self::ToggleEvidence { group } => format!("toggle evidence {group}"),
            Self::ToggleLayer { layer } => format!("toggle layer {layer:?}"),
            Self::ScrollPanel { offset } => format!("scroll panel to {offset}"),
            Self::ClosePanel => "close panel".to_string(),
            Self::AskFollowUp { question } => format!("ask '{question}'"),
            Self::ClearEvents => "clear events".to_string(),
            Self::Expect { check } => format!("expect {check:?}"),
            Self::ExpectRejected { attempt } => format!("expect rejection of {}", attempt.label()),
        }
    }
}

/// Observable state a script can assert on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Expectation {
    Step { step: Option<Step> },
    PromptTitle { title: String },
    PromptOffers { command: PromptCommand },
    PromptLacks { command: PromptCommand },
    ChatOpen { open: bool },
    PanelOpen { open: bool },
    PanelShows { kind: PanelKind },
    PanelScroll { offset: u32 },
    ChatHistoryLen { len: usize },
    PanelHistoryLen { len: usize },
    LayerVisible { layer: MapLayer, visible: bool },
    Legend { journey: Option<Journey> },
    Explored { id: String },
    EvidenceExpanded { group: String, expanded: bool },
    /// Events recorded since the last clear contain these, in this order.
    EventsInOrder { events: Vec<JourneyEvent> },
}

/// Perform one scripted step against a headless controller. Waits advance
/// the virtual clock.
///
/// # Errors
///
/// Returns an error when the controller rejects the action or an
/// expectation does not hold.
pub fn apply(ctl: &mut HeadlessController, step: &ScriptStep) -> Result<()> {
    match step {
        ScriptStep::Begin { journey } => ctl.begin(*journey),
        ScriptStep::Advance { to } => ctl.advance(*to)?,
        ScriptStep::Explore { id } => ctl.select_explore_item(id)?,
        ScriptStep::ReviewCompany { id } => ctl.select_company(id)?,
        ScriptStep::Press { command } => {
            let offered = ctl
                .chat()
                .current()
                .is_some_and(|prompt| prompt.offers(command));
            ensure!(offered, "prompt does not offer {command:?}");
            ctl.dispatch(command)?;
        }
        ScriptStep::Transition => {
            ctl.transition_to_next_journey()?;
        }
        ScriptStep::Wait { ms } => {
            ctl.advance_clock(*ms);
        }
        ScriptStep::Restart => ctl.restart(),
        ScriptStep::DismissPrompt => ctl.dismiss_prompt(),
        ScriptStep::RestorePrompt => {
            ctl.restore_last_prompt()?;
        }
        ScriptStep::ChatBack => ctl.chat_back()?,
        ScriptStep::PanelBack => ctl.panel_back()?,
        ScriptStep::OpenPanel { target } => ctl.open_panel(target)?,
        ScriptStep::OpenDashboard {
            view,
            clear_history,
        } => {
            let options = if *clear_history {
                PanelOptions::clearing()
            } else {
                PanelOptions::default()
            };
            ctl.open_dashboard(view, options)?;
        }
        ScriptStep::OpenEvidence { group, item } => ctl.open_evidence(group, item.as_deref())?,
        ScriptStep::ToggleEvidence { group } => {
            ctl.toggle_evidence_group(group)?;
        }
        ScriptStep::ToggleLayer { layer } => {
            ctl.toggle_layer(*layer)?;
        }
        ScriptStep::ScrollPanel { offset } => ctl.panel_mut().surface_mut().scroll_to(*offset),
        ScriptStep::ClosePanel => ctl.close_panel(),
        ScriptStep::AskFollowUp { question } => ctl.ask_follow_up(question)?,
        ScriptStep::ClearEvents => {
            ctl.take_events();
        }
        ScriptStep::Expect { check } => verify(ctl, check)?,
        ScriptStep::ExpectRejected { attempt } => expect_rejected(ctl, attempt)?,
    }
    Ok(())
}

fn expect_rejected(ctl: &mut HeadlessController, attempt: &ScriptStep) -> Result<()> {
    if matches!(attempt, ScriptStep::Wait { .. } | ScriptStep::ExpectRejected { .. }) {
        bail!("{} cannot be rejected", attempt.label());
    }
    let session = ctl.session().clone();
    let events = ctl.events().len();
    let Err(err) = apply(ctl, attempt) else {
        bail!("{} was accepted", attempt.label());
    };
    ensure!(
        err.downcast_ref::<JourneyError>().is_some(),
        "{} failed for an unexpected reason: {err:#}",
        attempt.label()
    );
    ensure!(ctl.session() == &session, "session changed after rejection");
    ensure!(ctl.events().len() == events, "events recorded after rejection");
    log::debug!("rejected as expected: {err}");
    Ok(())
}

fn verify(ctl: &HeadlessController, check: &Expectation) -> Result<()> {
    match check {
        Expectation::Step { step } => {
            let actual = ctl.session().step();
            ensure!(actual == *step, "expected step {step:?}, found {actual:?}");
        }
        Expectation::PromptTitle { title } => {
            let actual = ctl.chat().current().map(|prompt| prompt.title.as_str());
            ensure!(
                actual == Some(title.as_str()),
                "expected prompt '{title}', found {actual:?}"
            );
        }
        Expectation::PromptOffers { command } => ensure!(
            ctl.chat()
                .current()
                .is_some_and(|prompt| prompt.offers(command)),
            "prompt does not offer {command:?}"
        ),
        Expectation::PromptLacks { command } => ensure!(
            !ctl.chat()
                .current()
                .is_some_and(|prompt| prompt.offers(command)),
            "prompt unexpectedly offers {command:?}"
        ),
        Expectation::ChatOpen { open } => {
            ensure!(ctl.chat().is_open() == *open, "chat open should be {open}");
        }
        Expectation::PanelOpen { open } => {
            ensure!(ctl.panel().is_open() == *open, "panel open should be {open}");
        }
        Expectation::PanelShows { kind } => {
            let actual = ctl.panel().current().map(|panel| &panel.kind);
            ensure!(
                actual == Some(kind),
                "expected panel {kind:?}, found {actual:?}"
            );
        }
        Expectation::PanelScroll { offset } => {
            let actual = ctl.panel().surface().scroll;
            ensure!(actual == *offset, "expected scroll {offset}, found {actual}");
        }
        Expectation::ChatHistoryLen { len } => {
            let actual = ctl.chat().history().len();
            ensure!(actual == *len, "expected {len} chat entries, found {actual}");
        }
        Expectation::PanelHistoryLen { len } => {
            let actual = ctl.panel().history().len();
            ensure!(actual == *len, "expected {len} panel entries, found {actual}");
        }
        Expectation::LayerVisible { layer, visible } => ensure!(
            ctl.map().is_visible(*layer) == *visible,
            "layer {layer:?} visibility should be {visible}"
        ),
        Expectation::Legend { journey } => ensure!(
            ctl.map().legend == *journey,
            "expected legend {journey:?}, found {:?}",
            ctl.map().legend
        ),
        Expectation::Explored { id } => ensure!(
            ctl.session().explored_resources().contains(id),
            "resource {id} not explored"
        ),
        Expectation::EvidenceExpanded { group, expanded } => ensure!(
            ctl.evidence().is_expanded(group) == *expanded,
            "evidence group {group} expanded should be {expanded}"
        ),
        Expectation::EventsInOrder { events } => {
            let mut recorded = ctl.events().iter();
            for wanted in events {
                ensure!(
                    recorded.any(|event| event == wanted),
                    "missing or out-of-order event {wanted:?}"
                );
            }
        }
    }
    Ok(())
}
