use eframe::egui;

use crate::coordinator::DashboardCoordinator;
use crate::data::record::Metric;
use crate::events::{BrushPhase, DashboardEvent};
use crate::state::selection::DateRange;
use crate::state::theme::{color32, EntityPalette};

/// What the side panel asked the application to do beyond dispatching events.
#[derive(Debug, Default)]
pub struct ControlsOutcome {
    pub open_dataset: bool,
    /// A rejected interaction, shown in the footer.
    pub error: Option<String>,
}

impl ControlsOutcome {
    fn record(&mut self, result: crate::error::Result<bool>) {
        if let Err(e) = result {
            tracing::warn!("Rejected interaction: {e}");
            self.error = Some(e.to_string());
        }
    }
}

/// Date pickers, entity checkboxes and the metric picker.
pub fn show_controls(
    ui: &mut egui::Ui,
    coordinator: Option<&mut DashboardCoordinator>,
    palette: &EntityPalette,
    now: f64,
) -> ControlsOutcome {
    let mut outcome = ControlsOutcome::default();

    let open_btn = egui::Button::new(egui::RichText::new("Open Dataset...").strong())
        .min_size(egui::vec2(160.0, 28.0));
    if ui.add(open_btn).clicked() {
        outcome.open_dataset = true;
    }

    let Some(coordinator) = coordinator else {
        ui.add_space(8.0);
        ui.label(egui::RichText::new("No dataset loaded").weak());
        return outcome;
    };

    ui.add_space(8.0);
    ui.separator();
    ui.label(egui::RichText::new("Date range").strong());

    let range = coordinator.selection().date_range;
    let (mut start, mut end) = (range.start(), range.end());
    egui::Grid::new("date_range_grid").num_columns(2).show(ui, |ui| {
        ui.label("From");
        ui.add(egui_extras::DatePickerButton::new(&mut start).id_salt("range_start"));
        ui.end_row();
        ui.label("To");
        ui.add(egui_extras::DatePickerButton::new(&mut end).id_salt("range_end"));
        ui.end_row();
    });
    if (start, end) != (range.start(), range.end()) {
        match DateRange::new(start, end) {
            Ok(range) => {
                let event = DashboardEvent::RangeChanged { range, phase: BrushPhase::Released };
                outcome.record(coordinator.dispatch(event, now));
            }
            Err(e) => {
                tracing::warn!("Rejected date range: {e}");
                outcome.error = Some(e.to_string());
            }
        }
    }
    if ui.button("Reset range").clicked() {
        outcome.record(coordinator.dispatch(DashboardEvent::RangeReset, now));
    }

    ui.add_space(8.0);
    ui.separator();
    ui.label(egui::RichText::new("Entities").strong());

    let entities: Vec<String> = coordinator.dataset().entity_ids().map(str::to_string).collect();
    for entity in entities {
        let mut active = coordinator.selection().is_active(&entity);
        let text = egui::RichText::new(&entity).color(color32(palette.color(&entity), 1.0));
        if ui.checkbox(&mut active, text).changed() {
            outcome.record(coordinator.dispatch(DashboardEvent::EntityToggled(entity), now));
        }
    }
    ui.horizontal(|ui| {
        if ui.small_button("All").clicked() {
            let all = coordinator.dataset().entity_ids().map(str::to_string).collect();
            outcome.record(coordinator.dispatch(DashboardEvent::EntitiesChanged(all), now));
        }
    });

    ui.add_space(8.0);
    ui.separator();
    ui.label(egui::RichText::new("Metric").strong());

    let current = coordinator.selection().active_metric;
    let mut picked: Option<Metric> = None;
    egui::ComboBox::from_id_salt("metric_combo")
        .selected_text(current.axis_label())
        .show_ui(ui, |ui| {
            for metric in Metric::ALL {
                if ui.selectable_label(metric == current, metric.axis_label()).clicked() {
                    picked = Some(metric);
                }
            }
        });
    if let Some(metric) = picked {
        outcome.record(coordinator.select_metric_by_name(metric.name(), now));
    }

    outcome
}
