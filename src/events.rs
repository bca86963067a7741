use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::data::record::Metric;
use crate::state::selection::DateRange;

/// Whether a range change is still being dragged or has been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushPhase {
    Dragging,
    Released,
}

/// Value under the hover cursor for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusValue {
    pub entity: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Raised by the time-series panel while the pointer hovers it.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusEvent {
    /// Hovered position as a day number.
    pub position: f64,
    pub values: Vec<FocusValue>,
}

/// Every interaction a panel or widget can deliver to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// A ring sector was clicked: narrow the active set to this entity.
    EntitySelected(String),
    /// Add or remove one entity from the active set.
    EntityToggled(String),
    /// The multi-select widget replaced the active set.
    EntitiesChanged(BTreeSet<String>),
    RangeChanged { range: DateRange, phase: BrushPhase },
    /// The brush was cleared; go back to the default range.
    RangeReset,
    MetricChanged(Metric),
    Focus(FocusEvent),
    FocusCleared,
}
