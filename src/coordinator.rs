//! Owns the selection and drives every panel from it.
//!
//! Interactions arrive as [`DashboardEvent`]s through [`DashboardCoordinator::dispatch`],
//! strictly in order. An accepted event replaces the selection, re-derives the
//! filtered view and pushes it to the panels in a fixed order: time series,
//! both rings, timeline. A rejected event changes nothing.

use std::collections::BTreeSet;

use crate::config::DashboardConfig;
use crate::data::record::{Dataset, Metric};
use crate::error::{DashboardError, Result};
use crate::events::{BrushPhase, DashboardEvent, FocusEvent};
use crate::panels::ring::RingPanel;
use crate::panels::time_series::TimeSeriesPanel;
use crate::panels::timeline::TimelinePanel;
use crate::panels::PanelController;
use crate::render::surface::RetainedScene;
use crate::state::filtered_view::FilteredView;
use crate::state::selection::{DateRange, SelectionState};
use crate::state::theme::EntityPalette;

/// One render surface per panel, in push order.
#[derive(Debug, Clone, Default)]
pub struct PanelSurfaces {
    pub time_series: RetainedScene,
    pub rings: [RetainedScene; 2],
    pub timeline: RetainedScene,
}

pub struct DashboardCoordinator {
    dataset: Dataset,
    default_range: DateRange,
    selection: SelectionState,
    view: FilteredView,
    focus: Option<FocusEvent>,
    time_series: TimeSeriesPanel,
    rings: [RingPanel; 2],
    timeline: TimelinePanel,
    updates_pushed: u64,
}

impl DashboardCoordinator {
    /// Builds the initial selection from `config` and renders the first frame's
    /// targets at `now`.
    pub fn new(dataset: Dataset, config: &DashboardConfig, now: f64) -> Result<Self> {
        if dataset.is_empty() {
            return Err(DashboardError::EmptyDataset);
        }
        let default_range = match config.default_range {
            Some(range) => range,
            None => dataset.extent().ok_or(DashboardError::EmptyDataset)?,
        };
        let entities: BTreeSet<String> = match &config.initial_entities {
            Some(list) => list.iter().cloned().collect(),
            None => dataset.entity_ids().map(str::to_string).collect(),
        };
        let selection = SelectionState::new(&dataset, default_range, entities, config.initial_metric)?;

        let palette = EntityPalette::new(dataset.entity_ids());
        let view = FilteredView::derive(&dataset, &selection, default_range);
        let mut coordinator = Self {
            time_series: TimeSeriesPanel::new(config, palette.clone()),
            rings: config
                .ring_metrics
                .map(|metric| RingPanel::new(metric, config, palette.clone())),
            timeline: TimelinePanel::new(config),
            dataset,
            default_range,
            selection,
            view,
            focus: None,
            updates_pushed: 0,
        };
        coordinator.push(now);
        Ok(coordinator)
    }

    /// Apply one interaction.
    ///
    /// Returns `Ok(true)` when the selection changed and the panels were
    /// updated, `Ok(false)` when there was nothing to do, and `Err` when the
    /// interaction was rejected; the selection is untouched in that case.
    pub fn dispatch(&mut self, event: DashboardEvent, now: f64) -> Result<bool> {
        let next = match event {
            DashboardEvent::Focus(focus) => {
                self.focus = Some(focus);
                return Ok(false);
            }
            DashboardEvent::FocusCleared => {
                self.focus = None;
                return Ok(false);
            }
            DashboardEvent::EntitySelected(entity) => {
                self.selection.with_entities(&self.dataset, [entity].into())?
            }
            DashboardEvent::EntityToggled(entity) => self.selection.with_toggled(&self.dataset, &entity)?,
            DashboardEvent::EntitiesChanged(entities) => {
                self.selection.with_entities(&self.dataset, entities)?
            }
            DashboardEvent::RangeChanged { range, phase } => {
                if phase == BrushPhase::Released {
                    tracing::debug!("Range released at {:?}", range);
                }
                self.selection.with_range(range)
            }
            DashboardEvent::RangeReset => self.selection.with_range(self.default_range),
            DashboardEvent::MetricChanged(metric) => self.selection.with_metric(metric),
        };

        if next == self.selection {
            return Ok(false);
        }
        self.selection = next;
        self.push(now);
        Ok(true)
    }

    /// Like [`dispatch`](Self::dispatch) but logs and swallows rejections.
    pub fn dispatch_or_warn(&mut self, event: DashboardEvent, now: f64) -> bool {
        match self.dispatch(event, now) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!("Ignoring interaction: {e}");
                false
            }
        }
    }

    /// Widget input: a metric picked by name.
    pub fn select_metric_by_name(&mut self, name: &str, now: f64) -> Result<bool> {
        let metric = Metric::from_name(name)?;
        self.dispatch(DashboardEvent::MetricChanged(metric), now)
    }

    /// Advance every panel's transitions. Returns whether any panel is still
    /// animating.
    pub fn sample(&mut self, now: f64, surfaces: &mut PanelSurfaces) -> bool {
        let mut animating = self.time_series.sample(now, &mut surfaces.time_series);
        for (ring, surface) in self.rings.iter_mut().zip(surfaces.rings.iter_mut()) {
            animating |= ring.sample(now, surface);
        }
        animating |= self.timeline.sample(now, &mut surfaces.timeline);
        animating
    }

    fn push(&mut self, now: f64) {
        self.view = FilteredView::derive(&self.dataset, &self.selection, self.default_range);
        self.focus = None;
        let mut panels: Vec<&mut dyn PanelController> = Vec::with_capacity(4);
        panels.push(&mut self.time_series);
        for ring in &mut self.rings {
            panels.push(ring);
        }
        panels.push(&mut self.timeline);
        for panel in panels {
            let join = panel.update(&self.view, now);
            tracing::trace!(
                panel = ?panel.kind(),
                entering = join.entering.len(),
                exiting = join.exiting.len(),
                "Panel updated"
            );
        }
        self.updates_pushed += 1;
        tracing::debug!(version = self.selection.version, "Pushed filtered view to panels");
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn default_range(&self) -> DateRange {
        self.default_range
    }

    pub fn focus(&self) -> Option<&FocusEvent> {
        self.focus.as_ref()
    }

    pub fn updates_pushed(&self) -> u64 {
        self.updates_pushed
    }

    pub fn time_series(&self) -> &TimeSeriesPanel {
        &self.time_series
    }

    pub fn rings(&self) -> &[RingPanel; 2] {
        &self.rings
    }

    pub fn timeline(&self) -> &TimelinePanel {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut TimelinePanel {
        &mut self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Record;
    use crate::error::SelectionError;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 4, d).unwrap()
    }

    fn coordinator() -> DashboardCoordinator {
        let records = ["alpha", "beta", "gamma"].into_iter().flat_map(|e| {
            (1..=5).map(move |d| {
                Record::new(e, day(d))
                    .with_metric(Metric::Value, d as f64)
                    .with_metric(Metric::Volume, 2.0 * d as f64)
                    .with_metric(Metric::MarketCap, 3.0 * d as f64)
            })
        });
        DashboardCoordinator::new(Dataset::from_records(records), &DashboardConfig::default(), 0.0).unwrap()
    }

    #[test]
    fn starts_with_everything_selected() {
        let c = coordinator();
        assert_eq!(c.selection().active_entities.len(), 3);
        assert_eq!(c.selection().date_range, DateRange::new(day(1), day(5)).unwrap());
        assert_eq!(c.updates_pushed(), 1);
    }

    #[test]
    fn rejected_toggle_keeps_state_and_skips_update() {
        let mut c = coordinator();
        c.dispatch(DashboardEvent::EntitySelected("alpha".into()), 1.0).unwrap();
        let before = c.selection().clone();
        let pushes = c.updates_pushed();

        let err = c.dispatch(DashboardEvent::EntityToggled("alpha".into()), 2.0).unwrap_err();
        assert!(err.is_invalid_selection());
        assert_eq!(c.selection(), &before);
        assert_eq!(c.selection().version, before.version);
        assert_eq!(c.updates_pushed(), pushes);
        assert!(!c.dispatch_or_warn(DashboardEvent::EntityToggled("alpha".into()), 2.0));
    }

    #[test]
    fn ring_click_narrows_to_entity() {
        let mut c = coordinator();
        assert!(c.dispatch(DashboardEvent::EntitySelected("beta".into()), 1.0).unwrap());
        assert_eq!(c.selection().active_entities, ["beta".to_string()].into());
        // Rings still show every entity; only the time series narrows.
        assert_eq!(c.rings()[0].elements().elements().len(), 3);
        assert_eq!(c.view().series.len(), 1);
    }

    #[test]
    fn identical_event_is_noop() {
        let mut c = coordinator();
        assert!(!c.dispatch(DashboardEvent::RangeReset, 1.0).unwrap());
        assert!(!c.dispatch(DashboardEvent::MetricChanged(Metric::Value), 1.0).unwrap());
        assert_eq!(c.updates_pushed(), 1);
    }

    #[test]
    fn range_events_and_reset() {
        let mut c = coordinator();
        let range = DateRange::new(day(2), day(3)).unwrap();
        assert!(c
            .dispatch(DashboardEvent::RangeChanged { range, phase: BrushPhase::Dragging }, 1.0)
            .unwrap());
        assert_eq!(c.selection().date_range, range);
        assert!(c.timeline().brush().is_some());

        assert!(c.dispatch(DashboardEvent::RangeReset, 2.0).unwrap());
        assert_eq!(c.selection().date_range, c.default_range());
        assert!(c.timeline().brush().is_none());
    }

    #[test]
    fn metric_by_name() {
        let mut c = coordinator();
        assert!(c.select_metric_by_name("market_cap", 1.0).unwrap());
        assert_eq!(c.selection().active_metric, Metric::MarketCap);
        assert!(matches!(
            c.select_metric_by_name("altitude", 1.0),
            Err(DashboardError::InvalidSelection(SelectionError::UnknownMetric(_)))
        ));
    }

    #[test]
    fn focus_is_dropped_on_update() {
        let mut c = coordinator();
        let focus = c.time_series().hover(0.5).unwrap();
        assert!(!c.dispatch(focus, 0.5).unwrap());
        assert!(c.focus().is_some());
        c.dispatch(DashboardEvent::EntityToggled("gamma".into()), 1.0).unwrap();
        assert!(c.focus().is_none());
    }

    #[test]
    fn sample_drives_every_surface() {
        let mut c = coordinator();
        let mut surfaces = PanelSurfaces::default();
        c.sample(10.0, &mut surfaces);
        assert_eq!(surfaces.time_series.len(), 3);
        assert_eq!(surfaces.rings[0].len(), 3);
        assert_eq!(surfaces.rings[1].len(), 3);
        assert_eq!(surfaces.timeline.len(), 1);
    }
}
