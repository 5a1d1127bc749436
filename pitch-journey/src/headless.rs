//! In-memory surfaces that record what the controller asked for.

use std::collections::BTreeSet;

use crate::config::JourneyConfig;
use crate::content::{PanelContent, PromptContent};
use crate::dataset::{Dataset, GeoPoint};
use crate::error::ConfigError;
use crate::journey::{Journey, JourneyController};
use crate::surfaces::{ChatSurface, MapLayer, MapSurface, MapView, PanelSurface};

pub type HeadlessController = JourneyController<HeadlessMap, HeadlessChat, HeadlessPanel>;

/// Build a controller wired to fresh headless surfaces.
///
/// # Errors
///
/// Returns an error if the configuration does not validate against the data.
pub fn headless_controller(
    data: Dataset,
    config: JourneyConfig,
) -> Result<HeadlessController, ConfigError> {
    JourneyController::new(
        data,
        config,
        HeadlessMap::default(),
        HeadlessChat::default(),
        HeadlessPanel::default(),
    )
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessMap {
    pub visible: BTreeSet<MapLayer>,
    pub focus: Option<(GeoPoint, u8)>,
    pub highlighted: Vec<String>,
    pub legend: Option<Journey>,
    pub layer_toggle_visible: bool,
    pub transition: Option<Journey>,
    pub view: Option<MapView>,
    pub resets: usize,
}

impl HeadlessMap {
    #[must_use]
    pub fn is_visible(&self, layer: MapLayer) -> bool {
        self.visible.contains(&layer)
    }
}

impl MapSurface for HeadlessMap {
    fn show_layer(&mut self, layer: MapLayer) {
        self.visible.insert(layer);
    }

    fn hide_layer(&mut self, layer: MapLayer) {
        self.visible.remove(&layer);
    }

    fn focus(&mut self, target: GeoPoint, zoom: u8) {
        self.focus = Some((target, zoom));
    }

    fn highlight(&mut self, marker_id: &str) {
        self.highlighted.push(marker_id.to_string());
    }

    fn set_legend(&mut self, journey: Option<Journey>) {
        self.legend = journey;
    }

    fn set_layer_toggle_visible(&mut self, visible: bool) {
        self.layer_toggle_visible = visible;
    }

    fn play_transition(&mut self, next: Journey) {
        self.transition = Some(next);
    }

    fn finish_transition(&mut self) {
        self.transition = None;
    }

    fn clear_and_reset(&mut self, view: &MapView) {
        self.visible.clear();
        self.highlighted.clear();
        self.focus = None;
        self.transition = None;
        self.view = Some(*view);
        self.resets += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessChat {
    pub shown: Option<PromptContent>,
    pub open: bool,
    pub back_enabled: bool,
    pub renders: usize,
}

impl ChatSurface for HeadlessChat {
    fn render(&mut self, content: &PromptContent) {
        self.shown = Some(content.clone());
        self.open = true;
        self.renders += 1;
    }

    fn hide(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_back_enabled(&mut self, enabled: bool) {
        self.back_enabled = enabled;
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessPanel {
    pub shown: Option<PanelContent>,
    pub open: bool,
    pub scroll: u32,
    pub back_enabled: bool,
}

impl HeadlessPanel {
    /// Simulate the reader scrolling the panel body.
    pub const fn scroll_to(&mut self, offset: u32) {
        self.scroll = offset;
    }
}

impl PanelSurface for HeadlessPanel {
    fn render(&mut self, content: &PanelContent, scroll_offset: u32) {
        self.shown = Some(content.clone());
        self.scroll = scroll_offset;
        self.open = true;
    }

    fn hide(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn scroll_offset(&self) -> u32 {
        self.scroll
    }

    fn set_back_enabled(&mut self, enabled: bool) {
        self.back_enabled = enabled;
    }
}
