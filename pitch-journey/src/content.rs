//! Rendered content snapshots for the chat prompt and the side panel.
//!
//! Content values are immutable once built. Hosts hand clones to the
//! surfaces and to the history stacks, so nothing displayed can be mutated
//! behind a stack entry's back.

use serde::{Deserialize, Serialize};

use crate::dashboard::{Breadcrumbs, DashboardView};
use crate::dataset::{Dataset, Stat};
use crate::error::JourneyError;
use crate::journey::{Journey, Step};

/// What a prompt button does when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "command", content = "arg")]
pub enum PromptCommand {
    Explore(String),
    ReviewCompany(String),
    Advance(Step),
    Transition(Journey),
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptAction {
    pub label: String,
    pub command: PromptCommand,
}

/// Chat-style prompt shown in the floating chatbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptContent {
    pub title: String,
    pub body: Vec<String>,
    #[serde(default)]
    pub actions: Vec<PromptAction>,
    /// Free-form input is offered once the tour is complete.
    #[serde(default)]
    pub input_enabled: bool,
}

impl PromptContent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: Vec::new(),
            actions: Vec::new(),
            input_enabled: false,
        }
    }

    #[must_use]
    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.body.push(text.into());
        self
    }

    #[must_use]
    pub fn action(mut self, label: impl Into<String>, command: PromptCommand) -> Self {
        self.actions.push(PromptAction {
            label: label.into(),
            command,
        });
        self
    }

    #[must_use]
    pub const fn with_input(mut self) -> Self {
        self.input_enabled = true;
        self
    }

    #[must_use]
    pub fn offers(&self, command: &PromptCommand) -> bool {
        self.actions.iter().any(|action| &action.command == command)
    }
}

/// Identifies what the side panel is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum PanelKind {
    Resource(String),
    Company(String),
    Property(String),
    FutureZone(String),
    SciencePark(String),
    Road(String),
    Evidence,
    Dashboard(DashboardView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSection {
    pub heading: Option<String>,
    pub lines: Vec<String>,
}

impl PanelSection {
    pub fn titled(heading: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            heading: Some(heading.into()),
            lines,
        }
    }

    #[must_use]
    pub const fn plain(lines: Vec<String>) -> Self {
        Self {
            heading: None,
            lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelContent {
    pub kind: PanelKind,
    pub title: String,
    #[serde(default)]
    pub breadcrumbs: Breadcrumbs,
    pub sections: Vec<PanelSection>,
}

/// Entity a detail panel can be opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum PanelTarget {
    Resource(String),
    Company(String),
    Property(String),
    FutureZone(String),
    SciencePark(String),
    Road(String),
}

impl PanelTarget {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Resource(id)
            | Self::Company(id)
            | Self::Property(id)
            | Self::FutureZone(id)
            | Self::SciencePark(id)
            | Self::Road(id) => id,
        }
    }
}

/// Build the detail panel for an entity.
///
/// # Errors
///
/// Returns [`JourneyError::UnknownEntity`] when the target is not in the dataset.
pub fn render_panel(target: &PanelTarget, data: &Dataset) -> Result<PanelContent, JourneyError> {
    let content = match target {
        PanelTarget::Resource(id) => {
            let resource = data.resource(id)?;
            let mut sections = vec![
                PanelSection::plain(vec![resource.summary.clone()]),
                stats_section(&resource.stats),
            ];
            if let Some(group_id) = &resource.evidence_group {
                match data.evidence_group(group_id) {
                    Ok(group) => sections.push(PanelSection::titled(
                        "Evidence",
                        vec![format!("{} ({} documents)", group.title, group.items.len())],
                    )),
                    Err(err) => log::warn!("skipping evidence for {}: {err}", resource.id),
                }
            }
            detail(
                PanelKind::Resource(resource.id.clone()),
                &resource.name,
                sections,
            )
        }
        PanelTarget::Company(id) => {
            let company = data.company(id)?;
            detail(
                PanelKind::Company(company.id.clone()),
                &company.name,
                vec![
                    PanelSection::plain(vec![company.sector.clone(), company.summary.clone()]),
                    stats_section(&company.stats),
                ],
            )
        }
        PanelTarget::Property(id) => {
            let property = data.property(id)?;
            detail(
                PanelKind::Property(property.id.clone()),
                &property.name,
                vec![
                    PanelSection::plain(vec![
                        property.summary.clone(),
                        format!("Asking price: {}", property.asking_price),
                    ]),
                    stats_section(&property.stats),
                ],
            )
        }
        PanelTarget::FutureZone(id) => {
            let zone = data.future_zone(id)?;
            detail(
                PanelKind::FutureZone(zone.id.clone()),
                &zone.name,
                vec![
                    PanelSection::plain(vec![zone.summary.clone()]),
                    stats_section(&zone.stats),
                ],
            )
        }
        PanelTarget::SciencePark(id) => {
            let park = data.science_park(id)?;
            detail(
                PanelKind::SciencePark(park.id.clone()),
                &park.name,
                vec![
                    PanelSection::plain(vec![park.summary.clone()]),
                    stats_section(&park.stats),
                ],
            )
        }
        PanelTarget::Road(id) => {
            let road = data.road(id)?;
            detail(
                PanelKind::Road(road.id.clone()),
                &road.name,
                vec![
                    PanelSection::plain(vec![road.summary.clone()]),
                    stats_section(&road.stats),
                ],
            )
        }
    };
    Ok(content)
}

fn detail(kind: PanelKind, title: &str, sections: Vec<PanelSection>) -> PanelContent {
    PanelContent {
        kind,
        title: title.to_string(),
        breadcrumbs: Breadcrumbs::new(),
        sections,
    }
}

pub(crate) fn stats_section(stats: &[Stat]) -> PanelSection {
    PanelSection::titled("Key figures", stat_lines(stats))
}

pub(crate) fn stat_lines(stats: &[Stat]) -> Vec<String> {
    stats
        .iter()
        .map(|stat| format!("{}: {}", stat.label, stat.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::EntityKind;

    #[test]
    fn resource_panel_lists_figures_and_evidence() {
        let data = Dataset::bundled().unwrap();
        let panel = render_panel(&PanelTarget::Resource("water".into()), &data).unwrap();
        assert_eq!(panel.kind, PanelKind::Resource("water".into()));
        assert_eq!(panel.title, "Water");
        assert!(
            panel.sections[1]
                .lines
                .contains(&"Licensed abstraction: 38 Ml/day".to_string())
        );
        assert_eq!(panel.sections[2].heading.as_deref(), Some("Evidence"));
        assert!(panel.breadcrumbs.is_empty());
    }

    #[test]
    fn unknown_target_is_reported() {
        let data = Dataset::bundled().unwrap();
        let err = render_panel(&PanelTarget::Road("bypass".into()), &data).unwrap_err();
        assert_eq!(
            err,
            JourneyError::unknown(EntityKind::InfrastructureRoad, "bypass")
        );
    }

    #[test]
    fn dangling_evidence_group_skips_only_the_evidence_section() {
        let mut data = Dataset::bundled().unwrap();
        data.resources[0].evidence_group = Some("missing".into());
        let id = data.resources[0].id.clone();
        let panel = render_panel(&PanelTarget::Resource(id.clone()), &data).unwrap();
        assert_eq!(panel.kind, PanelKind::Resource(id));
        assert_eq!(panel.sections.len(), 2);
        assert!(
            panel
                .sections
                .iter()
                .all(|section| section.heading.as_deref() != Some("Evidence"))
        );
    }

    #[test]
    fn prompt_builder_tracks_offered_commands() {
        let prompt = PromptContent::new("Hello")
            .line("first")
            .action("Go", PromptCommand::Advance(Step::A2));
        assert!(prompt.offers(&PromptCommand::Advance(Step::A2)));
        assert!(!prompt.offers(&PromptCommand::Restart));
        assert!(!prompt.input_enabled);
        assert!(prompt.with_input().input_enabled);
    }
}
