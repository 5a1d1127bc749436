//! Evidence disclosure groups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::content::{PanelContent, PanelKind, PanelSection};
use crate::dashboard::Breadcrumbs;
use crate::dataset::Dataset;

/// Expanded/collapsed flag per evidence group. Groups never touched are collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceDisclosure {
    expanded: BTreeMap<String, bool>,
}

impl EvidenceDisclosure {
    #[must_use]
    pub fn is_expanded(&self, group: &str) -> bool {
        self.expanded.get(group).copied().unwrap_or(false)
    }

    /// Flip a group and return its new state.
    pub fn toggle(&mut self, group: &str) -> bool {
        let flag = self.expanded.entry(group.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Deep links always leave the target group open.
    pub fn force_open(&mut self, group: &str) {
        self.expanded.insert(group.to_string(), true);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}

/// Evidence panel listing every group in dataset order; items are listed
/// only for expanded groups, with the focused item marked.
#[must_use]
pub fn render_evidence(
    data: &Dataset,
    disclosure: &EvidenceDisclosure,
    focus_item: Option<&str>,
) -> PanelContent {
    let sections = data
        .evidence
        .iter()
        .map(|group| {
            let expanded = disclosure.is_expanded(&group.id);
            let marker = if expanded { "[-]" } else { "[+]" };
            let lines = if expanded {
                group
                    .items
                    .iter()
                    .map(|item| {
                        let pointer = if focus_item == Some(item.id.as_str()) {
                            "> "
                        } else {
                            ""
                        };
                        format!("{pointer}{}: {}", item.title, item.detail)
                    })
                    .collect()
            } else {
                Vec::new()
            };
            PanelSection::titled(format!("{marker} {}", group.title), lines)
        })
        .collect();
    PanelContent {
        kind: PanelKind::Evidence,
        title: String::from("Evidence"),
        breadcrumbs: Breadcrumbs::new(),
        sections,
    }
}
