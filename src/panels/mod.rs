pub mod element_set;
pub mod ring;
pub mod time_series;
pub mod timeline;

use crate::processing::join::Join;
use crate::render::surface::RenderSurface;
use crate::state::filtered_view::FilteredView;

use self::element_set::ElementSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    TimeSeries,
    Ring,
    Timeline,
}

/// A panel that owns its render elements and reconciles them against each
/// new filtered view. Interaction callbacks are panel-specific methods that
/// return events for the coordinator.
pub trait PanelController {
    fn kind(&self) -> PanelKind;

    /// Reconcile against `view` and start the resulting transitions.
    fn update(&mut self, view: &FilteredView, now: f64) -> Join;

    /// Advance transitions and push shapes to `surface`. Returns whether the
    /// panel is still animating.
    fn sample(&mut self, now: f64, surface: &mut dyn RenderSurface) -> bool {
        self.elements_mut().sample(now, surface)
    }

    fn elements(&self) -> &ElementSet;

    fn elements_mut(&mut self) -> &mut ElementSet;
}
