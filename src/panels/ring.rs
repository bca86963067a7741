use std::time::Duration;

use crate::config::DashboardConfig;
use crate::data::record::Metric;
use crate::events::DashboardEvent;
use crate::panels::element_set::{ElementSet, LayoutItem};
use crate::panels::{PanelController, PanelKind};
use crate::processing::join::{Join, RingJoin};
use crate::processing::layout::ring_layout;
use crate::render::element::ElementStyle;
use crate::state::filtered_view::FilteredView;
use crate::state::theme::EntityPalette;

/// Proportional ring of the latest in-range value of one metric, one sector
/// per entity. Entities outside the active set stay visible but dimmed.
#[derive(Debug, Clone)]
pub struct RingPanel {
    metric: Metric,
    elements: ElementSet,
    palette: EntityPalette,
    duration: Duration,
    pad_angle: f64,
    inactive_opacity: f32,
}

impl RingPanel {
    pub fn new(metric: Metric, config: &DashboardConfig, palette: EntityPalette) -> Self {
        Self {
            metric,
            elements: ElementSet::new(config.easing),
            palette,
            duration: config.ring_duration(),
            pad_angle: config.pad_angle,
            inactive_opacity: config.inactive_opacity,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn title(&self) -> &'static str {
        self.metric.ring_title()
    }

    pub fn pad_angle(&self) -> f64 {
        self.pad_angle
    }

    /// Click at `angle` (radians clockwise from twelve o'clock). Returns a
    /// selection event for the sector under it, ignoring collapsing sectors.
    pub fn click(&self, angle: f64) -> Option<DashboardEvent> {
        self.elements
            .elements()
            .iter()
            .filter(|e| !e.is_exiting())
            .find(|e| e.current.arc_contains(angle))
            .map(|e| DashboardEvent::EntitySelected(e.key.clone()))
    }
}

impl PanelController for RingPanel {
    fn kind(&self) -> PanelKind {
        PanelKind::Ring
    }

    fn update(&mut self, view: &FilteredView, now: f64) -> Join {
        let values = view.ring_values(self.metric);
        let layout = ring_layout(&values, self.pad_angle)
            .into_iter()
            .map(|(key, shape)| {
                let opacity = if view.selection.is_active(&key) { 1.0 } else { self.inactive_opacity };
                LayoutItem {
                    style: ElementStyle { color: self.palette.color(&key), opacity },
                    key,
                    shape,
                }
            })
            .collect();
        let duration = self.duration;
        self.elements.apply(layout, &RingJoin, &|_| duration, now)
    }

    fn elements(&self) -> &ElementSet {
        &self.elements
    }

    fn elements_mut(&mut self) -> &mut ElementSet {
        &mut self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{Dataset, Record};
    use crate::render::shape::{Easing, ShapeDescriptor};
    use crate::render::surface::RetainedScene;
    use crate::state::selection::{DateRange, SelectionState};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 8, d).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            Record::new("a", day(1)).with_metric(Metric::Volume, 1.0),
            Record::new("b", day(1)).with_metric(Metric::Volume, 1.0),
            Record::new("b", day(3)).with_metric(Metric::Volume, 3.0),
        ])
    }

    fn view(ds: &Dataset, end: u32, active: &[&str]) -> FilteredView {
        let sel = SelectionState::new(
            ds,
            DateRange::new(day(1), day(end)).unwrap(),
            active.iter().map(|s| s.to_string()).collect(),
            Metric::Value,
        )
        .unwrap();
        FilteredView::derive(ds, &sel, ds.extent().unwrap())
    }

    fn panel(ds: &Dataset) -> RingPanel {
        let config = DashboardConfig { easing: Easing::Linear, ..Default::default() };
        RingPanel::new(Metric::Volume, &config, EntityPalette::new(ds.entity_ids()))
    }

    #[test]
    fn inactive_entities_are_dimmed_not_removed() {
        let ds = dataset();
        let mut ring = panel(&ds);
        let join = ring.update(&view(&ds, 3, &["a"]), 0.0);
        assert_eq!(join.entering.len(), 2);
        assert_eq!(ring.elements().get("a").unwrap().style.opacity, 1.0);
        assert_eq!(ring.elements().get("b").unwrap().style.opacity, 0.3);
    }

    #[test]
    fn uses_latest_value_in_range() {
        let ds = dataset();
        let mut ring = panel(&ds);
        ring.update(&view(&ds, 3, &["a", "b"]), 0.0);
        let width = |r: &RingPanel, k: &str| match r.elements().get(k).unwrap().target {
            ShapeDescriptor::Arc { start, end } => end - start - r.pad_angle(),
            _ => f64::NAN,
        };
        assert!((width(&ring, "b") / width(&ring, "a") - 3.0).abs() < 1e-9);

        ring.update(&view(&ds, 2, &["a", "b"]), 1.0);
        assert!((width(&ring, "b") / width(&ring, "a") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn click_selects_sector_under_pointer() {
        let ds = dataset();
        let mut ring = panel(&ds);
        ring.update(&view(&ds, 3, &["a", "b"]), 0.0);
        ring.sample(0.0, &mut RetainedScene::new());
        assert_eq!(ring.click(0.1), Some(DashboardEvent::EntitySelected("a".into())));
        assert_eq!(ring.click(4.0), Some(DashboardEvent::EntitySelected("b".into())));
    }
}
