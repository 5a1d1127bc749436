//! Journey domain primitives shared by the controller and the prompt table.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::content::PanelKind;
use crate::schedule::{ScheduledTask, SessionToken};
use crate::surfaces::MapLayer;

pub mod controller;
pub mod prompts;
pub use controller::JourneyController;
pub use prompts::{render_follow_up, render_prompt};

/// The three guided tours, presented in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Journey {
    /// Resource discovery.
    A,
    /// Infrastructure overview.
    B,
    /// Property investment.
    C,
}

impl Journey {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::A => "Resource discovery",
            Self::B => "Infrastructure overview",
            Self::C => "Property investment",
        }
    }

    #[must_use]
    pub const fn first_step(self) -> Step {
        match self {
            Self::A => Step::A1,
            Self::B => Step::B1,
            Self::C => Step::C1,
        }
    }

    /// Journey reached through the transition at the end of this one.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::A => Some(Self::B),
            Self::B => Some(Self::C),
            Self::C => None,
        }
    }

    /// Layer cleared while transitioning out of this journey.
    #[must_use]
    pub const fn outgoing_layer(self) -> Option<MapLayer> {
        match self {
            Self::A => Some(MapLayer::ResourceMarkers),
            Self::B => Some(MapLayer::InfrastructureRoads),
            Self::C => None,
        }
    }

    #[must_use]
    pub const fn has_layer_toggle(self) -> bool {
        !matches!(self, Self::A)
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.title())
    }
}

/// Named point within a journey. Step sets of different journeys are disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    A1,
    A2,
    A3,
    B1,
    B4,
    B6,
    B7,
    C1,
    Complete,
}

impl Step {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
            Self::B1 => "B1",
            Self::B4 => "B4",
            Self::B6 => "B6",
            Self::B7 => "B7",
            Self::C1 => "C1",
            Self::Complete => "complete",
        }
    }

    #[must_use]
    pub const fn journey(self) -> Journey {
        match self {
            Self::A1 | Self::A2 | Self::A3 => Journey::A,
            Self::B1 | Self::B4 | Self::B6 | Self::B7 => Journey::B,
            Self::C1 | Self::Complete => Journey::C,
        }
    }

    /// Successor within the same journey, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::A1 => Some(Self::A2),
            Self::A2 => Some(Self::A3),
            Self::B1 => Some(Self::B4),
            Self::B4 => Some(Self::B6),
            Self::B6 => Some(Self::B7),
            Self::C1 => Some(Self::Complete),
            Self::A3 | Self::B7 | Self::Complete => None,
        }
    }

    pub(crate) const fn advance_action(self) -> &'static str {
        match self {
            Self::A1 => "advance to A1",
            Self::A2 => "advance to A2",
            Self::A3 => "advance to A3",
            Self::B1 => "advance to B1",
            Self::B4 => "advance to B4",
            Self::B6 => "advance to B6",
            Self::B7 => "advance to B7",
            Self::C1 => "advance to C1",
            Self::Complete => "advance to complete",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the viewer is in the presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneySession {
    journey: Option<Journey>,
    step: Option<Step>,
    explored_resources: BTreeSet<String>,
    explored_companies: BTreeSet<String>,
    token: SessionToken,
    pending_transition: Option<Journey>,
}

impl JourneySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn journey(&self) -> Option<Journey> {
        self.journey
    }

    #[must_use]
    pub const fn step(&self) -> Option<Step> {
        self.step
    }

    #[must_use]
    pub const fn explored_resources(&self) -> &BTreeSet<String> {
        &self.explored_resources
    }

    #[must_use]
    pub const fn explored_companies(&self) -> &BTreeSet<String> {
        &self.explored_companies
    }

    /// Identity of the current session state; changes on every step change.
    #[must_use]
    pub const fn token(&self) -> SessionToken {
        self.token
    }

    /// Journey whose transition placeholder is currently playing.
    #[must_use]
    pub const fn pending_transition(&self) -> Option<Journey> {
        self.pending_transition
    }

    /// True once every required resource has been explored.
    #[must_use]
    pub fn explore_complete(&self, required: &[String]) -> bool {
        required
            .iter()
            .all(|id| self.explored_resources.contains(id))
    }

    pub(crate) fn start(&mut self, journey: Journey) {
        self.journey = Some(journey);
        self.explored_resources.clear();
        self.explored_companies.clear();
        self.pending_transition = None;
        self.enter(journey.first_step());
    }

    pub(crate) fn enter(&mut self, step: Step) {
        debug_assert_eq!(Some(step.journey()), self.journey);
        self.step = Some(step);
        self.token = self.token.next();
    }

    pub(crate) fn record_resource(&mut self, id: &str) -> bool {
        self.explored_resources.insert(id.to_string())
    }

    pub(crate) fn record_company(&mut self, id: &str) -> bool {
        self.explored_companies.insert(id.to_string())
    }

    pub(crate) const fn set_pending_transition(&mut self, next: Option<Journey>) {
        self.pending_transition = next;
    }

    /// Back to initial values; the token still moves on so older tasks go stale.
    pub(crate) fn reset(&mut self) {
        let token = self.token.next();
        *self = Self {
            token,
            ..Self::default()
        };
    }
}

/// Side effects performed by the controller, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "detail")]
pub enum JourneyEvent {
    JourneyBegan(Journey),
    StepEntered(Step),
    PromptShown(String),
    PromptArchived(Step),
    PromptHidden,
    PanelShown(PanelKind),
    PanelHidden,
    LayerShown(MapLayer),
    LayerHidden(MapLayer),
    ExploreRecorded(String),
    CompanyReviewed(String),
    TransitionStarted { from: Journey, to: Journey },
    TransitionFinished(Journey),
    TaskDiscarded(ScheduledTask),
    FollowUpAnswered(Option<String>),
    MapCleared,
    RestartRequested,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains_match_the_fixed_step_sets() {
        let chains = [
            (Journey::A, vec![Step::A1, Step::A2, Step::A3]),
            (Journey::B, vec![Step::B1, Step::B4, Step::B6, Step::B7]),
            (Journey::C, vec![Step::C1, Step::Complete]),
        ];
        for (journey, expected) in chains {
            let mut walked = vec![journey.first_step()];
            while let Some(step) = walked.last().and_then(|step| step.next()) {
                walked.push(step);
            }
            assert_eq!(walked, expected);
            assert!(walked.iter().all(|step| step.journey() == journey));
        }
        assert_eq!(Journey::A.next(), Some(Journey::B));
        assert_eq!(Journey::C.next(), None);
    }

    #[test]
    fn session_start_resets_exploration_and_bumps_token() {
        let mut session = JourneySession::new();
        assert_eq!(session.journey(), None);
        assert_eq!(session.step(), None);

        session.start(Journey::A);
        let first = session.token();
        assert_eq!(session.step(), Some(Step::A1));
        assert!(session.record_resource("water"));
        assert!(!session.record_resource("water"));
        assert_eq!(session.explored_resources().len(), 1);

        session.enter(Step::A2);
        assert_ne!(session.token(), first);

        session.start(Journey::B);
        assert!(session.explored_resources().is_empty());
        assert_eq!(session.step(), Some(Step::B1));
    }

    #[test]
    fn reset_returns_to_idle_with_a_fresh_token() {
        let mut session = JourneySession::new();
        session.start(Journey::C);
        session.set_pending_transition(Some(Journey::C));
        let before = session.token();
        session.reset();
        assert_eq!(session.journey(), None);
        assert_eq!(session.step(), None);
        assert_eq!(session.pending_transition(), None);
        assert_eq!(session.token(), before.next());
    }

    #[test]
    fn explore_completion_needs_every_required_item() {
        let required = vec!["water".to_string(), "power".to_string()];
        let mut session = JourneySession::new();
        session.start(Journey::A);
        assert!(!session.explore_complete(&required));
        session.record_resource("water");
        session.record_resource("fibre");
        assert!(!session.explore_complete(&required));
        session.record_resource("power");
        assert!(session.explore_complete(&required));
    }
}
