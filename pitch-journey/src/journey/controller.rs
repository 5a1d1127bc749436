use std::collections::BTreeSet;

use crate::config::JourneyConfig;
use crate::content::{
    PanelContent, PanelKind, PanelTarget, PromptCommand, PromptContent, render_panel,
};
use crate::dashboard::{DashboardView, render_dashboard};
use crate::dataset::{Dataset, EntityKind, GeoPoint};
use crate::error::{ConfigError, JourneyError};
use crate::evidence::{EvidenceDisclosure, render_evidence};
use crate::history::{ChatHistoryPolicy, PanelOptions};
use crate::host::{ChatHost, PanelHost};
use crate::journey::{Journey, JourneyEvent, JourneySession, Step, render_follow_up, render_prompt};
use crate::schedule::{ScheduledTask, Scheduler};
use crate::surfaces::{ChatSurface, MapLayer, MapSurface, PanelSurface};

/// Drives the viewer through the journeys and owns every piece of
/// presentation state: session, hosts, disclosure flags, active layers and
/// pending delays.
///
/// Operations whose preconditions fail log a warning, leave state untouched
/// and return the error for callers that want to observe it.
#[derive(Debug)]
pub struct JourneyController<M, C, P> {
    data: Dataset,
    config: JourneyConfig,
    session: JourneySession,
    map: M,
    chat: ChatHost<C>,
    panel: PanelHost<P>,
    evidence: EvidenceDisclosure,
    active_layers: BTreeSet<MapLayer>,
    layer_toggle_visible: bool,
    scheduler: Scheduler,
    events: Vec<JourneyEvent>,
}

impl<M, C, P> JourneyController<M, C, P>
where
    M: MapSurface,
    C: ChatSurface,
    P: PanelSurface,
{
    /// Create an idle controller.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is inconsistent or the configuration
    /// is invalid for it.
    pub fn new(
        data: Dataset,
        config: JourneyConfig,
        map: M,
        chat: C,
        panel: P,
    ) -> Result<Self, ConfigError> {
        data.validate()?;
        config.validate_against(&data)?;
        let capacity = config.history_capacity;
        Ok(Self {
            data,
            config,
            session: JourneySession::new(),
            map,
            chat: ChatHost::new(chat, capacity),
            panel: PanelHost::new(panel, capacity),
            evidence: EvidenceDisclosure::default(),
            active_layers: BTreeSet::new(),
            layer_toggle_visible: false,
            scheduler: Scheduler::default(),
            events: Vec::new(),
        })
    }

    /// Start a journey from its first step, replacing whatever was in progress.
    pub fn begin(&mut self, journey: Journey) {
        log::info!("beginning journey {journey}");
        self.session.start(journey);
        self.chat.clear_history();
        self.map.set_legend(Some(journey));
        self.layer_toggle_visible = journey.has_layer_toggle();
        self.map
            .set_layer_toggle_visible(self.layer_toggle_visible);
        self.events.push(JourneyEvent::JourneyBegan(journey));
        self.enter_step(journey.first_step(), ChatHistoryPolicy::Clear);
    }

    /// Follow one legal edge of the current journey's chain.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::InvalidTransition`] unless `to` directly follows
    /// the current step (and, for A3, every required resource is explored).
    pub fn advance(&mut self, to: Step) -> Result<(), JourneyError> {
        let from = self.session.step();
        let legal = self.session.pending_transition().is_none()
            && from.and_then(Step::next) == Some(to)
            && (to != Step::A3 || self.explore_complete());
        if !legal {
            return reject(JourneyError::invalid(to.advance_action(), from));
        }
        self.enter_step(to, ChatHistoryPolicy::Preserve);
        Ok(())
    }

    /// Record a resource as explored and focus it on the map.
    ///
    /// # Errors
    ///
    /// Fails outside A2/A3 or for an unknown resource.
    pub fn select_explore_item(&mut self, id: &str) -> Result<(), JourneyError> {
        let step = self.session.step();
        let Some(step @ (Step::A2 | Step::A3)) = step else {
            return reject(JourneyError::invalid("select explore item", step));
        };
        self.ensure_no_transition("select explore item")?;
        let location = self.data.resource(id).map_err(warn)?.location;
        let panel = render_panel(&PanelTarget::Resource(id.to_string()), &self.data)
            .map_err(warn)?;

        if self.session.record_resource(id) {
            log::debug!("explored resource {id}");
            self.events
                .push(JourneyEvent::ExploreRecorded(id.to_string()));
        }
        self.map.highlight(id);
        self.map.focus(location, self.config.detail_zoom);
        self.show_panel(panel, PanelOptions::default());
        self.refresh_prompt(step);
        Ok(())
    }

    /// Record a company as reviewed and open its panel.
    ///
    /// # Errors
    ///
    /// Fails before company markers are revealed or for an unknown company.
    pub fn select_company(&mut self, id: &str) -> Result<(), JourneyError> {
        let step = self.session.step();
        let Some(step @ (Step::B4 | Step::B6 | Step::B7)) = step else {
            return reject(JourneyError::invalid("select company", step));
        };
        self.ensure_no_transition("select company")?;
        let location = self.data.company(id).map_err(warn)?.location;
        let panel = render_panel(&PanelTarget::Company(id.to_string()), &self.data)
            .map_err(warn)?;

        if self.session.record_company(id) {
            self.events
                .push(JourneyEvent::CompanyReviewed(id.to_string()));
        }
        self.map.highlight(id);
        self.map.focus(location, self.config.detail_zoom);
        self.show_panel(panel, PanelOptions::default());
        self.refresh_prompt(step);
        Ok(())
    }

    /// Leave the current journey through its closing transition.
    ///
    /// Archives the prompt, hides prompt and panel, clears the journey's
    /// outgoing layer and starts the placeholder; the next journey begins
    /// once the placeholder has played.
    ///
    /// # Errors
    ///
    /// Fails unless the session sits on A3 or B7 with no transition playing.
    pub fn transition_to_next_journey(&mut self) -> Result<Journey, JourneyError> {
        let step = self.session.step();
        let Some(from_step @ (Step::A3 | Step::B7)) = step else {
            return reject(JourneyError::invalid("transition", step));
        };
        self.ensure_no_transition("transition")?;
        let from = from_step.journey();
        let Some(to) = from.next() else {
            return reject(JourneyError::invalid("transition", step));
        };

        if self.chat.archive_current() {
            self.events.push(JourneyEvent::PromptArchived(from_step));
        }
        self.hide_prompt();
        self.hide_panel();
        if let Some(layer) = from.outgoing_layer() {
            self.hide_layer(layer);
        }
        log::debug!("transition {from:?} -> {to:?}");
        self.map.play_transition(to);
        self.events
            .push(JourneyEvent::TransitionStarted { from, to });
        self.session.set_pending_transition(Some(to));
        self.scheduler.schedule(
            self.config.transition_ms,
            ScheduledTask::FinishTransition(to),
            self.session.token(),
        );
        Ok(to)
    }

    /// Re-render the prompt for the current step after the viewer reopens it.
    ///
    /// # Errors
    ///
    /// Fails when no journey is running or a transition is playing.
    pub fn restore_last_prompt(&mut self) -> Result<PromptContent, JourneyError> {
        let Some(step) = self.session.step() else {
            return reject(JourneyError::invalid("restore prompt", None));
        };
        self.ensure_no_transition("restore prompt")?;
        let content = self.prompt_for(step);
        self.show_prompt(content.clone(), ChatHistoryPolicy::Skip);
        Ok(content)
    }

    /// Prompt content the given step renders with the current explored sets.
    #[must_use]
    pub fn prompt_for(&self, step: Step) -> PromptContent {
        render_prompt(step, &self.session, &self.data, &self.config)
    }

    /// Clear everything and begin journey A again after the restart pause.
    pub fn restart(&mut self) {
        log::info!("restarting presentation");
        self.scheduler.cancel_all();
        self.map.clear_and_reset(&self.config.default_view);
        self.active_layers.clear();
        self.events.push(JourneyEvent::MapCleared);
        self.map.set_legend(None);
        self.layer_toggle_visible = false;
        self.map.set_layer_toggle_visible(false);
        self.chat.reset();
        self.events.push(JourneyEvent::PromptHidden);
        self.panel.reset();
        self.events.push(JourneyEvent::PanelHidden);
        self.evidence.collapse_all();
        self.session.reset();
        self.events.push(JourneyEvent::RestartRequested);
        self.scheduler.schedule(
            self.config.restart_pause_ms,
            ScheduledTask::FinishRestart,
            self.session.token(),
        );
    }

    /// Answer a free-form question once the tour is complete.
    ///
    /// # Errors
    ///
    /// Fails anywhere but the terminal step.
    pub fn ask_follow_up(&mut self, question: &str) -> Result<(), JourneyError> {
        let step = self.session.step();
        if step != Some(Step::Complete) {
            return reject(JourneyError::invalid("ask follow-up", step));
        }
        let question = question.trim();
        if question.is_empty() {
            log::debug!("ignoring empty follow-up question");
            return Ok(());
        }
        let topic = self.data.follow_up_for(question).map(|t| t.id.clone());
        self.show_prompt(
            render_follow_up(question, &self.data),
            ChatHistoryPolicy::Preserve,
        );
        self.events.push(JourneyEvent::FollowUpAnswered(topic));
        Ok(())
    }

    /// Run the operation behind a prompt button.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation.
    pub fn dispatch(&mut self, command: &PromptCommand) -> Result<(), JourneyError> {
        match command {
            PromptCommand::Explore(id) => self.select_explore_item(id),
            PromptCommand::ReviewCompany(id) => self.select_company(id),
            PromptCommand::Advance(step) => self.advance(*step),
            PromptCommand::Transition(journey) => {
                let step = self.session.step();
                if step.map(|s| s.journey().next()) != Some(Some(*journey)) {
                    return reject(JourneyError::invalid("transition", step));
                }
                self.transition_to_next_journey().map(|_| ())
            }
            PromptCommand::Restart => {
                self.restart();
                Ok(())
            }
        }
    }

    /// Viewer closed the chat prompt; the step is kept for restoration.
    pub fn dismiss_prompt(&mut self) {
        self.hide_prompt();
    }

    /// # Errors
    ///
    /// Returns [`JourneyError::EmptyHistory`] when there is no earlier prompt.
    pub fn chat_back(&mut self) -> Result<(), JourneyError> {
        self.chat.back().map_err(warn)?;
        if let Some(current) = self.chat.current() {
            self.events
                .push(JourneyEvent::PromptShown(current.title.clone()));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`JourneyError::EmptyHistory`] when there is no earlier panel.
    pub fn panel_back(&mut self) -> Result<(), JourneyError> {
        self.panel.back().map_err(warn)?;
        if let Some(current) = self.panel.current() {
            self.events
                .push(JourneyEvent::PanelShown(current.kind.clone()));
        }
        Ok(())
    }

    /// Open the detail panel for an entity and pan to it.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] for unknown targets.
    pub fn open_panel(&mut self, target: &PanelTarget) -> Result<(), JourneyError> {
        let anchor = self.anchor_for(target).map_err(warn)?;
        self.show_panel_for(target)?;
        if let Some(point) = anchor {
            self.map.focus(point, self.config.detail_zoom);
        }
        Ok(())
    }

    /// Show a dashboard view; breadcrumbs reuse this with the crumb's view.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] for entity views of unknown records.
    pub fn open_dashboard(
        &mut self,
        view: &DashboardView,
        options: PanelOptions,
    ) -> Result<(), JourneyError> {
        let content = render_dashboard(view, &self.data).map_err(warn)?;
        self.show_panel(content, options);
        Ok(())
    }

    /// Deep link into the evidence panel, forcing the group open.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] for an unknown group or item.
    pub fn open_evidence(&mut self, group: &str, item: Option<&str>) -> Result<(), JourneyError> {
        let evidence_group = self.data.evidence_group(group).map_err(warn)?;
        let location = match item {
            Some(item_id) => {
                let Some(found) = evidence_group.item(item_id) else {
                    return reject(JourneyError::unknown(
                        EntityKind::EvidenceItem,
                        format!("{group}/{item_id}"),
                    ));
                };
                found.location
            }
            None => None,
        };
        self.evidence.force_open(group);
        let content = render_evidence(&self.data, &self.evidence, item);
        self.show_panel(content, PanelOptions::default());
        if let Some(point) = location {
            self.map.focus(point, self.config.detail_zoom);
        }
        Ok(())
    }

    /// Expand or collapse an evidence group, re-rendering the evidence
    /// panel in place when it is on screen. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] for an unknown group.
    pub fn toggle_evidence_group(&mut self, group: &str) -> Result<bool, JourneyError> {
        self.data.evidence_group(group).map_err(warn)?;
        let expanded = self.evidence.toggle(group);
        let showing_evidence = self.panel.is_open()
            && self
                .panel
                .current()
                .is_some_and(|current| current.kind == PanelKind::Evidence);
        if showing_evidence {
            self.panel
                .replace(render_evidence(&self.data, &self.evidence, None));
        }
        Ok(expanded)
    }

    /// Flip a data layer from the layer toggle control. Returns visibility.
    ///
    /// # Errors
    ///
    /// Fails while the toggle control is hidden or a transition is playing.
    pub fn toggle_layer(&mut self, layer: MapLayer) -> Result<bool, JourneyError> {
        if !self.layer_toggle_visible {
            return reject(JourneyError::invalid(
                "toggle layer",
                self.session.step(),
            ));
        }
        self.ensure_no_transition("toggle layer")?;
        if self.active_layers.contains(&layer) {
            self.hide_layer(layer);
            Ok(false)
        } else {
            self.show_layer(layer);
            Ok(true)
        }
    }

    pub fn close_panel(&mut self) {
        self.hide_panel();
    }

    /// Move the virtual clock forward, firing due tasks in order. Tasks
    /// scheduled for an earlier session state are discarded. Returns how
    /// many tasks ran.
    pub fn advance_clock(&mut self, elapsed_ms: u64) -> usize {
        let until = self.scheduler.now_ms().saturating_add(elapsed_ms);
        let mut fired = 0;
        while let Some(due) = self.scheduler.pop_due(until) {
            if due.token != self.session.token() {
                log::debug!("discarding stale task {:?}", due.task);
                self.events.push(JourneyEvent::TaskDiscarded(due.task));
                continue;
            }
            fired += 1;
            self.run_task(due.task);
        }
        self.scheduler.settle(until);
        fired
    }

    /// Milliseconds until the next scheduled task.
    #[must_use]
    pub fn next_due_in(&self) -> Option<u64> {
        self.scheduler.next_due_in()
    }

    #[must_use]
    pub const fn session(&self) -> &JourneySession {
        &self.session
    }

    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.data
    }

    #[must_use]
    pub const fn config(&self) -> &JourneyConfig {
        &self.config
    }

    #[must_use]
    pub const fn map(&self) -> &M {
        &self.map
    }

    #[must_use]
    pub const fn chat(&self) -> &ChatHost<C> {
        &self.chat
    }

    #[must_use]
    pub const fn panel(&self) -> &PanelHost<P> {
        &self.panel
    }

    /// Mutable panel access for surface-driven state such as scrolling.
    pub const fn panel_mut(&mut self) -> &mut PanelHost<P> {
        &mut self.panel
    }

    #[must_use]
    pub const fn evidence(&self) -> &EvidenceDisclosure {
        &self.evidence
    }

    #[must_use]
    pub const fn active_layers(&self) -> &BTreeSet<MapLayer> {
        &self.active_layers
    }

    #[must_use]
    pub const fn layer_toggle_visible(&self) -> bool {
        self.layer_toggle_visible
    }

    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn events(&self) -> &[JourneyEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<JourneyEvent> {
        std::mem::take(&mut self.events)
    }

    fn explore_complete(&self) -> bool {
        self.session
            .explore_complete(&self.config.required_explore)
    }

    fn ensure_no_transition(&self, action: &'static str) -> Result<(), JourneyError> {
        if self.session.pending_transition().is_some() {
            return reject(JourneyError::invalid(action, self.session.step()));
        }
        Ok(())
    }

    fn enter_step(&mut self, step: Step, policy: ChatHistoryPolicy) {
        log::debug!("entering step {step}");
        if step != step.journey().first_step() {
            self.session.enter(step);
        }
        self.events.push(JourneyEvent::StepEntered(step));
        self.apply_step_effects(step);
        let prompt = self.prompt_for(step);
        self.show_prompt(prompt, policy);
    }

    fn apply_step_effects(&mut self, step: Step) {
        let view = self.config.default_view;
        match step {
            Step::A1 | Step::A3 => self.map.focus(view.center, view.zoom),
            Step::A2 => {
                self.show_layer(MapLayer::ResourceMarkers);
                self.show_layer(MapLayer::BoundaryCircle);
                self.map
                    .focus(self.data.site.center, self.config.explore_zoom);
            }
            Step::B1 => {
                self.show_layer(MapLayer::BoundaryCircle);
                self.map.focus(view.center, view.zoom);
                self.scheduler.schedule(
                    self.config.auto_advance_ms,
                    ScheduledTask::AutoAdvance(Step::B4),
                    self.session.token(),
                );
            }
            Step::B4 => self.show_layer(MapLayer::CompanyMarkers),
            Step::B6 => self.show_layer(MapLayer::InfrastructureRoads),
            Step::B7 => {
                self.show_layer(MapLayer::FutureZones);
                self.show_layer(MapLayer::ScienceParks);
            }
            Step::C1 => {
                self.show_layer(MapLayer::PropertyMarkers);
                self.map.focus(view.center, view.zoom);
            }
            Step::Complete => self.show_layer(MapLayer::RouteLines),
        }
    }

    fn run_task(&mut self, task: ScheduledTask) {
        match task {
            ScheduledTask::AutoAdvance(step) => {
                if self.advance(step).is_err() {
                    log::debug!("auto-advance to {step} no longer applies");
                }
            }
            ScheduledTask::FinishTransition(journey) => {
                self.map.finish_transition();
                self.events
                    .push(JourneyEvent::TransitionFinished(journey));
                self.begin(journey);
            }
            ScheduledTask::FinishRestart => self.begin(Journey::A),
        }
    }

    fn refresh_prompt(&mut self, step: Step) {
        let prompt = self.prompt_for(step);
        self.show_prompt(prompt, ChatHistoryPolicy::Skip);
    }

    fn show_prompt(&mut self, content: PromptContent, policy: ChatHistoryPolicy) {
        self.events
            .push(JourneyEvent::PromptShown(content.title.clone()));
        self.chat.show(content, policy);
    }

    fn hide_prompt(&mut self) {
        self.chat.hide();
        self.events.push(JourneyEvent::PromptHidden);
    }

    fn show_panel_for(&mut self, target: &PanelTarget) -> Result<(), JourneyError> {
        let content = render_panel(target, &self.data).map_err(warn)?;
        self.show_panel(content, PanelOptions::default());
        Ok(())
    }

    fn show_panel(&mut self, content: PanelContent, options: PanelOptions) {
        self.events
            .push(JourneyEvent::PanelShown(content.kind.clone()));
        self.panel.show(content, options);
    }

    fn hide_panel(&mut self) {
        self.panel.hide();
        self.events.push(JourneyEvent::PanelHidden);
    }

    fn show_layer(&mut self, layer: MapLayer) {
        if self.active_layers.insert(layer) {
            self.map.show_layer(layer);
            self.events.push(JourneyEvent::LayerShown(layer));
        }
    }

    fn hide_layer(&mut self, layer: MapLayer) {
        if self.active_layers.remove(&layer) {
            self.map.hide_layer(layer);
            self.events.push(JourneyEvent::LayerHidden(layer));
        }
    }

    fn anchor_for(&self, target: &PanelTarget) -> Result<Option<GeoPoint>, JourneyError> {
        let anchor = match target {
            PanelTarget::Resource(id) => Some(self.data.resource(id)?.location),
            PanelTarget::Company(id) => Some(self.data.company(id)?.location),
            PanelTarget::Property(id) => Some(self.data.property(id)?.location),
            PanelTarget::SciencePark(id) => Some(self.data.science_park(id)?.location),
            PanelTarget::FutureZone(id) => self.data.future_zone(id)?.outline.first().copied(),
            PanelTarget::Road(id) => {
                let path = &self.data.road(id)?.path;
                path.get(path.len() / 2).copied()
            }
        };
        Ok(anchor)
    }
}

fn warn(err: JourneyError) -> JourneyError {
    log::warn!("{err}");
    err
}

fn reject<T>(err: JourneyError) -> Result<T, JourneyError> {
    Err(warn(err))
}
