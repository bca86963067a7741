use std::time::Duration;

use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::data::datetime::day_number;
use crate::data::record::Metric;
use crate::events::{DashboardEvent, FocusEvent, FocusValue};
use crate::panels::element_set::{ElementSet, LayoutItem};
use crate::panels::{PanelController, PanelKind};
use crate::processing::join::{BaselineJoin, Join};
use crate::processing::layout::{line_path, LinearScale};
use crate::processing::nearest::nearest_index;
use crate::render::element::ElementStyle;
use crate::state::filtered_view::FilteredView;
use crate::state::theme::EntityPalette;

/// Samples of one entity kept for hover lookups.
#[derive(Debug, Clone, PartialEq)]
struct HoverSeries {
    entity: String,
    xs: Vec<f64>,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// One line per active entity over the selected range.
#[derive(Debug, Clone)]
pub struct TimeSeriesPanel {
    elements: ElementSet,
    palette: EntityPalette,
    duration: Duration,
    y_padding: f64,
    metric: Metric,
    x_scale: Option<LinearScale>,
    y_scale: Option<LinearScale>,
    hover: Vec<HoverSeries>,
}

impl TimeSeriesPanel {
    pub fn new(config: &DashboardConfig, palette: EntityPalette) -> Self {
        Self {
            elements: ElementSet::new(config.easing),
            palette,
            duration: config.line_duration(),
            y_padding: config.y_padding,
            metric: config.initial_metric,
            x_scale: None,
            y_scale: None,
            hover: Vec::new(),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Day-number domain of the x axis.
    pub fn x_scale(&self) -> Option<LinearScale> {
        self.x_scale
    }

    pub fn y_scale(&self) -> Option<LinearScale> {
        self.y_scale
    }

    /// Hover at `x_unit` across the panel. Finds, for every line, the sample
    /// nearest in time.
    pub fn hover(&self, x_unit: f64) -> Option<DashboardEvent> {
        let x = self.x_scale?.from_unit(x_unit.clamp(0.0, 1.0));
        let values: Vec<FocusValue> = self
            .hover
            .iter()
            .filter_map(|s| {
                let i = nearest_index(&s.xs, x)?;
                Some(FocusValue {
                    entity: s.entity.clone(),
                    date: s.dates[i],
                    value: s.values[i],
                })
            })
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(DashboardEvent::Focus(FocusEvent { position: x, values }))
    }

    pub fn leave(&self) -> DashboardEvent {
        DashboardEvent::FocusCleared
    }
}

impl PanelController for TimeSeriesPanel {
    fn kind(&self) -> PanelKind {
        PanelKind::TimeSeries
    }

    fn update(&mut self, view: &FilteredView, now: f64) -> Join {
        let metric = view.metric();
        self.metric = metric;
        self.hover = view
            .series
            .iter()
            .filter(|s| !s.records.is_empty())
            .map(|s| {
                let samples: Vec<(NaiveDate, f64)> = s
                    .records
                    .iter()
                    .filter_map(|r| Some((r.timestamp, r.value(metric)?)))
                    .collect();
                HoverSeries {
                    entity: s.entity.clone(),
                    xs: samples.iter().map(|(d, _)| day_number(*d)).collect(),
                    dates: samples.iter().map(|(d, _)| *d).collect(),
                    values: samples.iter().map(|(_, v)| *v).collect(),
                }
            })
            .collect();

        self.x_scale = LinearScale::fit(self.hover.iter().flat_map(|s| s.xs.iter().copied()));
        self.y_scale = LinearScale::fit(self.hover.iter().flat_map(|s| s.values.iter().copied()))
            .map(|s| s.padded(self.y_padding));

        let layout = match (self.x_scale, self.y_scale) {
            (Some(x), Some(y)) => self
                .hover
                .iter()
                .map(|s| {
                    let points: Vec<(f64, f64)> =
                        s.xs.iter().copied().zip(s.values.iter().copied()).collect();
                    LayoutItem {
                        key: s.entity.clone(),
                        shape: line_path(&points, &x, &y),
                        style: ElementStyle {
                            color: self.palette.color(&s.entity),
                            opacity: 1.0,
                        },
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        let duration = self.duration;
        self.elements.apply(layout, &BaselineJoin, &|_| duration, now)
    }

    fn elements(&self) -> &ElementSet {
        &self.elements
    }

    fn elements_mut(&mut self) -> &mut ElementSet {
        &mut self.elements
    }
}
