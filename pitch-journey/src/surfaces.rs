//! Collaborator seams the controller drives.
//!
//! Platform layers implement these against their map widget and DOM; the
//! crate ships in-memory recorders in [`crate::headless`].

use serde::{Deserialize, Serialize};

use crate::content::{PanelContent, PromptContent};
use crate::dataset::GeoPoint;
use crate::journey::Journey;

/// Named feature layers on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapLayer {
    ResourceMarkers,
    BoundaryCircle,
    CompanyMarkers,
    PropertyMarkers,
    RouteLines,
    FutureZones,
    ScienceParks,
    InfrastructureRoads,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
}

pub trait MapSurface {
    fn show_layer(&mut self, layer: MapLayer);

    fn hide_layer(&mut self, layer: MapLayer);

    /// Pan and zoom to a coordinate.
    fn focus(&mut self, target: GeoPoint, zoom: u8);

    /// Emphasise a single marker by its entity id.
    fn highlight(&mut self, marker_id: &str);

    /// Show the legend for a journey, or hide it with `None`.
    fn set_legend(&mut self, journey: Option<Journey>);

    fn set_layer_toggle_visible(&mut self, visible: bool);

    /// Start the full-screen placeholder played between journeys.
    fn play_transition(&mut self, next: Journey);

    fn finish_transition(&mut self);

    /// Remove every feature and return to the given view.
    fn clear_and_reset(&mut self, view: &MapView);
}

/// Floating chat-style prompt.
pub trait ChatSurface {
    fn render(&mut self, content: &PromptContent);

    fn hide(&mut self);

    fn is_open(&self) -> bool;

    fn set_back_enabled(&mut self, enabled: bool);
}

/// Side panel with a scrollable body.
pub trait PanelSurface {
    fn render(&mut self, content: &PanelContent, scroll_offset: u32);

    fn hide(&mut self);

    fn is_open(&self) -> bool;

    /// Current scroll position of the panel body.
    fn scroll_offset(&self) -> u32;

    fn set_back_enabled(&mut self, enabled: bool);
}
