//! Pitch Journey Engine
//!
//! Platform-agnostic core of the guided investment pitch map: the journey
//! state machine, prompt and panel content, the chat and panel navigation
//! histories, and the scripted delays between steps. Map widgets, chat
//! prompts and side panels are reached only through the traits in
//! [`surfaces`], so the whole presentation runs headless in tests.

pub mod config;
pub mod content;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod evidence;
pub mod headless;
pub mod history;
pub mod host;
pub mod journey;
#[cfg(feature = "async")]
pub mod pacing;
pub mod schedule;
pub mod surfaces;

// Re-export commonly used types
pub use config::JourneyConfig;
pub use content::{
    PanelContent, PanelKind, PanelSection, PanelTarget, PromptAction, PromptCommand,
    PromptContent, render_panel,
};
pub use dashboard::{Breadcrumbs, Crumb, DashboardCategory, DashboardView, render_dashboard};
pub use dataset::{Dataset, EntityKind, GeoPoint};
pub use error::{ConfigError, DatasetError, JourneyError, LoadError};
pub use evidence::{EvidenceDisclosure, render_evidence};
pub use headless::{
    HeadlessChat, HeadlessController, HeadlessMap, HeadlessPanel, headless_controller,
};
pub use history::{
    ChatHistory, ChatHistoryPolicy, HistoryKind, HistoryStack, PanelHistory, PanelOptions,
    PanelSnapshot,
};
pub use host::{ChatHost, PanelHost};
pub use journey::{
    Journey, JourneyController, JourneyEvent, JourneySession, Step, render_follow_up,
    render_prompt,
};
pub use schedule::{ScheduledTask, Scheduler, SessionToken};
pub use surfaces::{ChatSurface, MapLayer, MapSurface, MapView, PanelSurface};

/// Source of the pitch content and journey configuration.
///
/// Each platform supplies its own loader.
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the pitch content from the platform's source.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be loaded.
    fn load_dataset(&self) -> Result<Dataset, Self::Error>;

    /// Load journey configuration overrides. Defaults apply when none are supplied.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self) -> Result<JourneyConfig, Self::Error> {
        Ok(JourneyConfig::default())
    }
}

/// Loader serving the dataset compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLoader;

impl DataLoader for BundledLoader {
    type Error = LoadError;

    fn load_dataset(&self) -> Result<Dataset, Self::Error> {
        let data = Dataset::bundled()?;
        data.validate()?;
        Ok(data)
    }
}

/// Engine that builds presentation controllers from a loader.
pub struct PitchEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> PitchEngine<L>
where
    L: DataLoader,
{
    /// Create an engine around the given loader.
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    /// Build a controller wired to the given surfaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the data or configuration cannot be loaded, or
    /// the configuration does not fit the data.
    pub fn create_controller<M, C, P>(
        &self,
        map: M,
        chat: C,
        panel: P,
    ) -> anyhow::Result<JourneyController<M, C, P>>
    where
        M: MapSurface,
        C: ChatSurface,
        P: PanelSurface,
    {
        let data = self.data_loader.load_dataset()?;
        let config = self.data_loader.load_config()?;
        Ok(JourneyController::new(data, config, map, chat, panel)?)
    }

    /// Build a controller backed by in-memory surfaces.
    ///
    /// # Errors
    ///
    /// See [`PitchEngine::create_controller`].
    pub fn create_headless(&self) -> anyhow::Result<HeadlessController> {
        self.create_controller(
            HeadlessMap::default(),
            HeadlessChat::default(),
            HeadlessPanel::default(),
        )
    }
}
