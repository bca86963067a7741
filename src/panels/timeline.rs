use std::time::Duration;

use crate::config::DashboardConfig;
use crate::data::datetime::{day_number, from_day_number};
use crate::events::{BrushPhase, DashboardEvent};
use crate::panels::element_set::{ElementSet, LayoutItem};
use crate::panels::{PanelController, PanelKind};
use crate::processing::join::{BaselineJoin, Join};
use crate::processing::layout::{line_path, LinearScale};
use crate::render::element::ElementStyle;
use crate::render::shape::ShapeDescriptor;
use crate::state::filtered_view::FilteredView;
use crate::state::selection::DateRange;

pub const AREA_KEY: &str = "area";
pub const BRUSH_START_KEY: &str = "brush-start";
pub const BRUSH_END_KEY: &str = "brush-end";

/// Brush narrower than this (unit space) counts as a click, i.e. a clear.
const MIN_BRUSH_WIDTH: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    /// Drawing a fresh brush from `anchor`.
    New { anchor: f64 },
    /// Sliding the existing brush, grabbed `offset` from its left edge.
    Move { offset: f64, width: f64 },
}

/// Overview of the whole default range with a horizontal brush over it.
#[derive(Debug, Clone)]
pub struct TimelinePanel {
    elements: ElementSet,
    area_duration: Duration,
    brush_duration: Duration,
    extent: Option<DateRange>,
    x_scale: Option<LinearScale>,
    /// Brushed range in unit space, absent while the full range is selected.
    brush: Option<(f64, f64)>,
    drag: Option<Drag>,
}

impl TimelinePanel {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            elements: ElementSet::new(config.easing),
            area_duration: config.line_duration(),
            brush_duration: config.brush_duration(),
            extent: None,
            x_scale: None,
            brush: None,
            drag: None,
        }
    }

    pub fn extent(&self) -> Option<DateRange> {
        self.extent
    }

    pub fn brush(&self) -> Option<(f64, f64)> {
        self.brush
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer pressed at `x_unit`. Inside the brush it grabs it, elsewhere it
    /// starts a new one.
    pub fn brush_start(&mut self, x_unit: f64) {
        let x = x_unit.clamp(0.0, 1.0);
        self.drag = Some(match self.brush {
            Some((lo, hi)) if lo <= x && x <= hi => Drag::Move { offset: x - lo, width: hi - lo },
            _ => Drag::New { anchor: x },
        });
    }

    /// Pointer dragged to `x_unit`. Emits a continuous range change.
    pub fn brush_move(&mut self, x_unit: f64) -> Option<DashboardEvent> {
        let (lo, hi) = self.brushed_span(x_unit)?;
        if hi - lo < MIN_BRUSH_WIDTH {
            return None;
        }
        let range = self.unit_range(lo, hi)?;
        Some(DashboardEvent::RangeChanged { range, phase: BrushPhase::Dragging })
    }

    /// Pointer released at `x_unit`. A zero-width brush clears the selection
    /// back to the default range.
    pub fn brush_end(&mut self, x_unit: f64) -> Option<DashboardEvent> {
        let span = self.brushed_span(x_unit);
        self.drag = None;
        let (lo, hi) = span?;
        if hi - lo < MIN_BRUSH_WIDTH {
            return Some(DashboardEvent::RangeReset);
        }
        let range = self.unit_range(lo, hi)?;
        Some(DashboardEvent::RangeChanged { range, phase: BrushPhase::Released })
    }

    fn brushed_span(&self, x_unit: f64) -> Option<(f64, f64)> {
        let x = x_unit.clamp(0.0, 1.0);
        match self.drag? {
            Drag::New { anchor } => Some((anchor.min(x), anchor.max(x))),
            Drag::Move { offset, width } => {
                let lo = (x - offset).clamp(0.0, (1.0 - width).max(0.0));
                Some((lo, lo + width))
            }
        }
    }

    fn unit_range(&self, lo: f64, hi: f64) -> Option<DateRange> {
        let scale = self.x_scale?;
        let extent = self.extent?;
        let clamp = |d: chrono::NaiveDate| d.clamp(extent.start(), extent.end());
        let start = clamp(from_day_number(scale.from_unit(lo))?);
        let end = clamp(from_day_number(scale.from_unit(hi))?);
        DateRange::new(start, end).ok()
    }
}

impl PanelController for TimelinePanel {
    fn kind(&self) -> PanelKind {
        PanelKind::Timeline
    }

    fn update(&mut self, view: &FilteredView, now: f64) -> Join {
        let extent = view.extent;
        let x = LinearScale::fit([day_number(extent.start()), day_number(extent.end())]);
        self.extent = Some(extent);
        self.x_scale = x;

        let mut layout = Vec::new();
        if let Some(x) = x {
            let max = view.overview.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
            let y = LinearScale { min: 0.0, max: if max > 0.0 { max } else { 1.0 } };
            let points: Vec<(f64, f64)> =
                view.overview.iter().map(|(d, v)| (day_number(*d), v.max(0.0))).collect();
            layout.push(LayoutItem {
                key: AREA_KEY.to_string(),
                shape: line_path(&points, &x, &y),
                style: ElementStyle::default(),
            });

            let range = view.selection.date_range;
            self.brush = (range != extent).then(|| {
                (
                    x.to_unit(day_number(range.start())).clamp(0.0, 1.0),
                    x.to_unit(day_number(range.end())).clamp(0.0, 1.0),
                )
            });
            if let Some((lo, hi)) = self.brush {
                for (key, pos) in [(BRUSH_START_KEY, lo), (BRUSH_END_KEY, hi)] {
                    layout.push(LayoutItem {
                        key: key.to_string(),
                        shape: ShapeDescriptor::Position(pos),
                        style: ElementStyle::default(),
                    });
                }
            }
        }

        // Handles follow the pointer while it drags them.
        let brush_duration = if self.drag.is_some() { Duration::ZERO } else { self.brush_duration };
        let area_duration = self.area_duration;
        self.elements.apply(
            layout,
            &BaselineJoin,
            &|key| if key == AREA_KEY { area_duration } else { brush_duration },
            now,
        )
    }

    fn elements(&self) -> &ElementSet {
        &self.elements
    }

    fn elements_mut(&mut self) -> &mut ElementSet {
        &mut self.elements
    }
}
