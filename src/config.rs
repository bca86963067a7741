use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::record::Metric;
use crate::error::Result;
use crate::render::shape::Easing;
use crate::state::selection::DateRange;

/// Tunables for the dashboard. Every field has a default, so a config file
/// only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub ring_transition_ms: u64,
    pub line_transition_ms: u64,
    pub brush_transition_ms: u64,
    pub easing: Easing,
    /// Gap between ring sectors, radians.
    pub pad_angle: f64,
    /// Opacity of sectors whose entity is not in the active set.
    pub inactive_opacity: f32,
    /// Multiplicative padding of the time-series value axis.
    pub y_padding: f64,
    /// Metrics shown by the two ring panels, left to right.
    pub ring_metrics: [Metric; 2],
    /// Range the timeline spans and the brush resets to. Defaults to the
    /// dataset's extent.
    pub default_range: Option<DateRange>,
    pub initial_metric: Metric,
    /// Entities active at start-up. Defaults to all.
    pub initial_entities: Option<Vec<String>>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ring_transition_ms: 750,
            line_transition_ms: 1000,
            brush_transition_ms: 250,
            easing: Easing::default(),
            pad_angle: 0.06,
            inactive_opacity: 0.3,
            y_padding: 1.005,
            ring_metrics: [Metric::Volume, Metric::MarketCap],
            default_range: None,
            initial_metric: Metric::Value,
            initial_entities: None,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        tracing::info!("Config loaded from {:?}", path);
        Ok(config)
    }

    pub fn ring_duration(&self) -> Duration {
        Duration::from_millis(self.ring_transition_ms)
    }

    pub fn line_duration(&self) -> Duration {
        Duration::from_millis(self.line_transition_ms)
    }

    pub fn brush_duration(&self) -> Duration {
        Duration::from_millis(self.brush_transition_ms)
    }
}
