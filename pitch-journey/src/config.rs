use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::dataset::{Dataset, GeoPoint};
use crate::error::ConfigError;
use crate::surfaces::MapView;

/// Longest scripted pause accepted for any delayed transition.
pub const MAX_DELAY_MS: u64 = 60_000;
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 20;

/// Pacing and presentation knobs for the journeys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyConfig {
    /// Pause before B1 reveals company markers and moves on to B4.
    #[serde(default = "JourneyConfig::default_auto_advance_ms")]
    pub auto_advance_ms: u64,
    /// Duration of the placeholder played between journeys.
    #[serde(default = "JourneyConfig::default_transition_ms")]
    pub transition_ms: u64,
    #[serde(default = "JourneyConfig::default_restart_pause_ms")]
    pub restart_pause_ms: u64,
    #[serde(default = "JourneyConfig::default_view")]
    pub default_view: MapView,
    #[serde(default = "JourneyConfig::default_explore_zoom")]
    pub explore_zoom: u8,
    #[serde(default = "JourneyConfig::default_detail_zoom")]
    pub detail_zoom: u8,
    /// Resources that must all be explored before A3 is offered.
    #[serde(default = "JourneyConfig::default_required_explore")]
    pub required_explore: Vec<String>,
    #[serde(default = "JourneyConfig::default_history_capacity")]
    pub history_capacity: usize,
}

impl JourneyConfig {
    const fn default_auto_advance_ms() -> u64 {
        2_000
    }

    const fn default_transition_ms() -> u64 {
        1_500
    }

    const fn default_restart_pause_ms() -> u64 {
        600
    }

    const fn default_view() -> MapView {
        MapView {
            center: GeoPoint::new(52.2053, 0.1218),
            zoom: 11,
        }
    }

    const fn default_explore_zoom() -> u8 {
        13
    }

    const fn default_detail_zoom() -> u8 {
        15
    }

    fn default_required_explore() -> Vec<String> {
        vec![String::from("water"), String::from("power")]
    }

    const fn default_history_capacity() -> usize {
        32
    }

    /// Load configuration overrides from JSON; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check internal invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("auto_advance_ms", self.auto_advance_ms),
            ("transition_ms", self.transition_ms),
            ("restart_pause_ms", self.restart_pause_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(ConfigError::DelayTooLong {
                    field,
                    max: MAX_DELAY_MS,
                    value,
                });
            }
        }
        for (field, value) in [
            ("default_view.zoom", self.default_view.zoom),
            ("explore_zoom", self.explore_zoom),
            ("detail_zoom", self.detail_zoom),
        ] {
            if !(MIN_ZOOM..=MAX_ZOOM).contains(&value) {
                return Err(ConfigError::ZoomOutOfRange {
                    field,
                    min: MIN_ZOOM,
                    max: MAX_ZOOM,
                    value,
                });
            }
        }
        if self.required_explore.is_empty() {
            return Err(ConfigError::NoExploreItems);
        }
        let mut seen = HashSet::new();
        for id in &self.required_explore {
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::DuplicateExploreItem { id: id.clone() });
            }
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        Ok(())
    }

    /// Validate, then check every required explore item exists as a resource.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate_against(&self, data: &Dataset) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(missing) = self
            .required_explore
            .iter()
            .find(|id| data.resource(id).is_err())
        {
            return Err(ConfigError::UnknownExploreItem {
                id: missing.clone(),
            });
        }
        Ok(())
    }
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            auto_advance_ms: Self::default_auto_advance_ms(),
            transition_ms: Self::default_transition_ms(),
            restart_pause_ms: Self::default_restart_pause_ms(),
            default_view: Self::default_view(),
            explore_zoom: Self::default_explore_zoom(),
            detail_zoom: Self::default_detail_zoom(),
            required_explore: Self::default_required_explore(),
            history_capacity: Self::default_history_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_against_bundled_data() {
        let data = Dataset::bundled().unwrap();
        let cfg = JourneyConfig::default();
        cfg.validate_against(&data).unwrap();
        assert_eq!(cfg.auto_advance_ms, 2_000);
        assert_eq!(cfg.required_explore, vec!["water", "power"]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = JourneyConfig::from_json(r#"{ "transition_ms": 250 }"#).unwrap();
        assert_eq!(cfg.transition_ms, 250);
        assert_eq!(cfg.auto_advance_ms, 2_000);
        assert_eq!(cfg.history_capacity, 32);
    }

    #[test]
    fn validation_flags_each_violation() {
        let cfg = JourneyConfig {
            restart_pause_ms: MAX_DELAY_MS + 1,
            ..JourneyConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DelayTooLong {
                field: "restart_pause_ms",
                ..
            })
        ));

        let cfg = JourneyConfig {
            detail_zoom: 0,
            ..JourneyConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZoomOutOfRange {
                field: "detail_zoom",
                ..
            })
        ));

        let cfg = JourneyConfig {
            required_explore: vec!["water".into(), "water".into()],
            ..JourneyConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::DuplicateExploreItem { id: "water".into() })
        );

        let cfg = JourneyConfig {
            required_explore: Vec::new(),
            ..JourneyConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoExploreItems));

        let cfg = JourneyConfig {
            history_capacity: 0,
            ..JourneyConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroHistoryCapacity));
    }

    #[test]
    fn unknown_explore_item_is_rejected_against_data() {
        let data = Dataset::bundled().unwrap();
        let cfg = JourneyConfig {
            required_explore: vec!["water".into(), "lithium".into()],
            ..JourneyConfig::default()
        };
        assert_eq!(
            cfg.validate_against(&data),
            Err(ConfigError::UnknownExploreItem {
                id: "lithium".into()
            })
        );
    }
}
