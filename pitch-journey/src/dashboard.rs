//! Portfolio dashboard with breadcrumb navigation.
//!
//! Every dashboard view is shown through the panel host, so the panel's
//! back control returns to whatever was on screen before a crumb was used.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::content::{PanelContent, PanelKind, PanelSection, PanelTarget, render_panel};
use crate::dataset::Dataset;
use crate::error::JourneyError;

/// Trail is at most overview, category, entity.
pub type Breadcrumbs = SmallVec<[Crumb; 3]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    pub label: String,
    pub view: DashboardView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardCategory {
    Resources,
    Companies,
    Properties,
    Infrastructure,
}

impl DashboardCategory {
    pub const ALL: [Self; 4] = [
        Self::Resources,
        Self::Companies,
        Self::Properties,
        Self::Infrastructure,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resources => "Resources",
            Self::Companies => "Companies",
            Self::Properties => "Properties",
            Self::Infrastructure => "Infrastructure",
        }
    }

    fn entries(self, data: &Dataset) -> Vec<(String, String)> {
        match self {
            Self::Resources => data
                .resources
                .iter()
                .map(|r| (r.id.clone(), r.name.clone()))
                .collect(),
            Self::Companies => data
                .companies
                .iter()
                .map(|c| (c.id.clone(), c.name.clone()))
                .collect(),
            Self::Properties => data
                .properties
                .iter()
                .map(|p| (p.id.clone(), p.name.clone()))
                .collect(),
            Self::Infrastructure => data
                .roads
                .iter()
                .map(|r| (r.id.clone(), r.name.clone()))
                .collect(),
        }
    }

    fn target(self, id: &str) -> PanelTarget {
        let id = id.to_string();
        match self {
            Self::Resources => PanelTarget::Resource(id),
            Self::Companies => PanelTarget::Company(id),
            Self::Properties => PanelTarget::Property(id),
            Self::Infrastructure => PanelTarget::Road(id),
        }
    }
}

/// Level of the dashboard hierarchy currently displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "level", content = "at")]
pub enum DashboardView {
    Overview,
    Category(DashboardCategory),
    Entity(DashboardCategory, String),
}

impl DashboardView {
    /// Crumbs leading to this view, root first.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] when an entity view names a
    /// record that does not exist.
    pub fn breadcrumbs(&self, data: &Dataset) -> Result<Breadcrumbs, JourneyError> {
        let mut crumbs = Breadcrumbs::new();
        crumbs.push(Crumb {
            label: String::from("Overview"),
            view: Self::Overview,
        });
        match self {
            Self::Overview => {}
            Self::Category(category) => crumbs.push(category_crumb(*category)),
            Self::Entity(category, id) => {
                crumbs.push(category_crumb(*category));
                let panel = render_panel(&category.target(id), data)?;
                crumbs.push(Crumb {
                    label: panel.title,
                    view: self.clone(),
                });
            }
        }
        Ok(crumbs)
    }
}

fn category_crumb(category: DashboardCategory) -> Crumb {
    Crumb {
        label: category.label().to_string(),
        view: DashboardView::Category(category),
    }
}

/// Build the panel content for a dashboard view.
///
/// # Errors
///
/// Returns [`JourneyError::UnknownEntity`] for entity views naming unknown records.
pub fn render_dashboard(view: &DashboardView, data: &Dataset) -> Result<PanelContent, JourneyError> {
    let breadcrumbs = view.breadcrumbs(data)?;
    let kind = PanelKind::Dashboard(view.clone());
    let content = match view {
        DashboardView::Overview => PanelContent {
            kind,
            title: format!("{} portfolio", data.site.name),
            breadcrumbs,
            sections: vec![
                PanelSection::plain(vec![data.site.tagline.clone()]),
                PanelSection::titled(
                    "At a glance",
                    DashboardCategory::ALL
                        .iter()
                        .map(|category| {
                            format!("{}: {}", category.label(), category.entries(data).len())
                        })
                        .collect(),
                ),
            ],
        },
        DashboardView::Category(category) => PanelContent {
            kind,
            title: category.label().to_string(),
            breadcrumbs,
            sections: vec![PanelSection::plain(
                category
                    .entries(data)
                    .into_iter()
                    .map(|(_, name)| name)
                    .collect(),
            )],
        },
        DashboardView::Entity(category, id) => {
            let detail = render_panel(&category.target(id), data)?;
            PanelContent {
                kind,
                title: detail.title,
                breadcrumbs,
                sections: detail.sections,
            }
        }
    };
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breadcrumbs_grow_with_depth() {
        let data = Dataset::bundled().unwrap();
        let overview = DashboardView::Overview.breadcrumbs(&data).unwrap();
        assert_eq!(overview.len(), 1);

        let entity = DashboardView::Entity(DashboardCategory::Properties, "plot-7".into());
        let crumbs = entity.breadcrumbs(&data).unwrap();
        let labels: Vec<_> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Overview", "Properties", "Plot 7 - North Plateau"]);
        assert_eq!(
            crumbs[1].view,
            DashboardView::Category(DashboardCategory::Properties)
        );
        assert!(!crumbs.spilled());
    }

    #[test]
    fn overview_counts_each_category() {
        let data = Dataset::bundled().unwrap();
        let panel = render_dashboard(&DashboardView::Overview, &data).unwrap();
        let glance = &panel.sections[1].lines;
        assert!(glance.contains(&format!("Companies: {}", data.companies.len())));
        assert!(glance.contains(&format!("Infrastructure: {}", data.roads.len())));
    }

    #[test]
    fn entity_view_reuses_detail_sections() {
        let data = Dataset::bundled().unwrap();
        let view = DashboardView::Entity(DashboardCategory::Companies, "helix-bio".into());
        let panel = render_dashboard(&view, &data).unwrap();
        let detail = render_panel(&PanelTarget::Company("helix-bio".into()), &data).unwrap();
        assert_eq!(panel.sections, detail.sections);
        assert_eq!(panel.kind, PanelKind::Dashboard(view));
    }

    #[test]
    fn unknown_entity_view_fails() {
        let data = Dataset::bundled().unwrap();
        let view = DashboardView::Entity(DashboardCategory::Companies, "ghost".into());
        assert!(render_dashboard(&view, &data).is_err());
    }
}
