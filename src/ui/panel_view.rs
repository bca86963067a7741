use std::f64::consts::TAU;

use eframe::egui;

use crate::coordinator::{DashboardCoordinator, PanelSurfaces};
use crate::data::datetime::{day_number, format_date, from_day_number};
use crate::panels::timeline::{AREA_KEY, BRUSH_END_KEY, BRUSH_START_KEY};
use crate::render::shape::{ShapeDescriptor, UnitPoint};
use crate::render::surface::RetainedScene;
use crate::state::theme::{color32, Theme};

/// Angular step used to tessellate ring sectors.
const ARC_STEP: f64 = 0.04;
const RING_INNER: f32 = 0.55;
const MARGIN: f32 = 8.0;

fn unit_to_screen(rect: egui::Rect, p: UnitPoint) -> egui::Pos2 {
    egui::pos2(
        rect.left() + p[0] as f32 * rect.width(),
        rect.bottom() - p[1] as f32 * rect.height(),
    )
}

fn screen_to_unit_x(rect: egui::Rect, pos: egui::Pos2) -> f64 {
    if rect.width() <= 0.0 {
        return 0.0;
    }
    (((pos.x - rect.left()) / rect.width()) as f64).clamp(0.0, 1.0)
}

/// Point on a ring at `angle` radians clockwise from twelve o'clock.
fn polar(center: egui::Pos2, radius: f32, angle: f64) -> egui::Pos2 {
    center + egui::vec2(angle.sin() as f32, -(angle.cos() as f32)) * radius
}

fn frame_rect(ui: &mut egui::Ui, height: f32, sense: egui::Sense) -> (egui::Rect, egui::Response) {
    let width = ui.available_width();
    ui.allocate_exact_size(egui::vec2(width, height), sense)
}

/// Line chart of the active entities with a hover cursor.
pub fn show_time_series(
    ui: &mut egui::Ui,
    coordinator: &mut DashboardCoordinator,
    surfaces: &PanelSurfaces,
    theme: Theme,
    height: f32,
    now: f64,
) {
    let (total_rect, response) = frame_rect(ui, height, egui::Sense::hover());
    let painter = ui.painter_at(total_rect);
    painter.rect_filled(total_rect, 4.0, theme.panel_bg());
    let plot_rect = total_rect.shrink2(egui::vec2(MARGIN * 2.0, MARGIN * 3.0));
    let text_color = ui.visuals().text_color();
    let dim_color = text_color.gamma_multiply(0.6);

    painter.rect_stroke(plot_rect, 0.0, egui::Stroke::new(1.0, theme.axis_color()), egui::StrokeKind::Outside);

    for primitive in surfaces.time_series.primitives() {
        if let Some(ShapeDescriptor::Path(points)) = &primitive.shape {
            let line: Vec<egui::Pos2> = points.iter().map(|p| unit_to_screen(plot_rect, *p)).collect();
            painter.add(egui::Shape::line(
                line,
                egui::Stroke::new(2.0, color32(primitive.style.color, primitive.style.opacity)),
            ));
        }
    }

    let panel = coordinator.time_series();
    painter.text(
        egui::pos2(plot_rect.left(), total_rect.top() + 4.0),
        egui::Align2::LEFT_TOP,
        panel.metric().axis_label(),
        egui::FontId::proportional(12.0),
        text_color,
    );
    if let Some(x) = panel.x_scale() {
        for (u, align) in [(0.0, egui::Align2::LEFT_TOP), (1.0, egui::Align2::RIGHT_TOP)] {
            if let Some(date) = from_day_number(x.from_unit(u)) {
                painter.text(
                    unit_to_screen(plot_rect, [u, 0.0]) + egui::vec2(0.0, 4.0),
                    align,
                    format_date(date),
                    egui::FontId::proportional(10.0),
                    dim_color,
                );
            }
        }
    }

    // Focus cursor and the values under it.
    if let (Some(focus), Some(x), Some(y)) = (coordinator.focus(), panel.x_scale(), panel.y_scale()) {
        let u = x.to_unit(focus.position);
        let top = unit_to_screen(plot_rect, [u, 1.0]);
        let bottom = unit_to_screen(plot_rect, [u, 0.0]);
        painter.line_segment([top, bottom], egui::Stroke::new(1.0, dim_color));

        let mut legend_y = plot_rect.top() + 4.0;
        for value in &focus.values {
            let color = surfaces
                .time_series
                .get(&value.entity)
                .map(|p| color32(p.style.color, 1.0))
                .unwrap_or(text_color);
            let at = unit_to_screen(plot_rect, [x.to_unit(day_number(value.date)), y.to_unit(value.value)]);
            painter.circle_filled(at, 3.5, color);
            painter.text(
                egui::pos2(plot_rect.right() - 6.0, legend_y),
                egui::Align2::RIGHT_TOP,
                format!("{}  {}  {:.2}", value.entity, format_date(value.date), value.value),
                egui::FontId::monospace(11.0),
                color,
            );
            legend_y += 14.0;
        }
    }

    match response.hover_pos() {
        Some(pos) if plot_rect.contains(pos) => {
            if let Some(event) = coordinator.time_series().hover(screen_to_unit_x(plot_rect, pos)) {
                coordinator.dispatch_or_warn(event, now);
            }
        }
        _ => {
            if coordinator.focus().is_some() {
                let event = coordinator.time_series().leave();
                coordinator.dispatch_or_warn(event, now);
            }
        }
    }
}

/// One proportional ring. A click on a sector narrows the selection to it.
pub fn show_ring(
    ui: &mut egui::Ui,
    coordinator: &mut DashboardCoordinator,
    index: usize,
    scene: &RetainedScene,
    theme: Theme,
    height: f32,
    now: f64,
) {
    let (rect, response) = frame_rect(ui, height, egui::Sense::click());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, theme.panel_bg());
    let Some(ring) = coordinator.rings().get(index) else {
        return;
    };
    let text_color = ui.visuals().text_color();
    painter.text(
        rect.center_top() + egui::vec2(0.0, 4.0),
        egui::Align2::CENTER_TOP,
        ring.title(),
        egui::FontId::proportional(12.0),
        text_color,
    );

    let center = rect.center() + egui::vec2(0.0, 8.0);
    let outer = (rect.width().min(rect.height()) / 2.0 - MARGIN * 3.0).max(1.0);
    let inner = outer * RING_INNER;
    let half_pad = ring.pad_angle() / 2.0;

    for primitive in scene.primitives() {
        let Some(ShapeDescriptor::Arc { start, end }) = primitive.shape else {
            continue;
        };
        let (a0, a1) = (start + half_pad, end - half_pad);
        if a1 <= a0 {
            continue;
        }
        let fill = color32(primitive.style.color, primitive.style.opacity);
        let steps = ((a1 - a0) / ARC_STEP).ceil().max(1.0) as usize;
        for i in 0..steps {
            let s = a0 + (a1 - a0) * i as f64 / steps as f64;
            let e = a0 + (a1 - a0) * (i + 1) as f64 / steps as f64;
            painter.add(egui::Shape::convex_polygon(
                vec![polar(center, inner, s), polar(center, outer, s), polar(center, outer, e), polar(center, inner, e)],
                fill,
                egui::Stroke::NONE,
            ));
        }
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let d = pos - center;
            let r = d.length();
            if (inner..=outer).contains(&r) {
                let angle = (d.x as f64).atan2(-(d.y as f64)).rem_euclid(TAU);
                if let Some(event) = ring.click(angle) {
                    coordinator.dispatch_or_warn(event, now);
                }
            }
        }
    }
}

/// Overview of the whole range with a draggable brush.
pub fn show_timeline(
    ui: &mut egui::Ui,
    coordinator: &mut DashboardCoordinator,
    scene: &RetainedScene,
    theme: Theme,
    height: f32,
    now: f64,
) {
    let (total_rect, response) = frame_rect(ui, height, egui::Sense::click_and_drag());
    let painter = ui.painter_at(total_rect);
    painter.rect_filled(total_rect, 4.0, theme.panel_bg());
    let plot_rect = total_rect.shrink2(egui::vec2(MARGIN * 2.0, MARGIN));
    let fill = theme.overview_fill();

    if let Some(ShapeDescriptor::Path(points)) = scene.get(AREA_KEY).and_then(|p| p.shape.as_ref()) {
        for pair in points.windows(2) {
            let (p, q) = (pair[0], pair[1]);
            painter.add(egui::Shape::convex_polygon(
                vec![
                    unit_to_screen(plot_rect, [p[0], 0.0]),
                    unit_to_screen(plot_rect, p),
                    unit_to_screen(plot_rect, q),
                    unit_to_screen(plot_rect, [q[0], 0.0]),
                ],
                fill,
                egui::Stroke::NONE,
            ));
        }
    }

    let position = |key: &str| match scene.get(key).and_then(|p| p.shape.as_ref()) {
        Some(ShapeDescriptor::Position(x)) => Some(*x),
        _ => None,
    };
    if let (Some(lo), Some(hi)) = (position(BRUSH_START_KEY), position(BRUSH_END_KEY)) {
        let brush = egui::Rect::from_min_max(
            unit_to_screen(plot_rect, [lo, 1.0]),
            unit_to_screen(plot_rect, [hi, 0.0]),
        );
        painter.rect_filled(brush, 0.0, theme.brush_fill());
        painter.rect_stroke(brush, 0.0, egui::Stroke::new(1.0, theme.axis_color()), egui::StrokeKind::Inside);
    }
    painter.hline(plot_rect.x_range(), plot_rect.bottom(), egui::Stroke::new(1.0, theme.axis_color()));

    let pointer = response
        .interact_pointer_pos()
        .or_else(|| ui.ctx().pointer_latest_pos())
        .map(|pos| screen_to_unit_x(plot_rect, pos));
    let timeline = coordinator.timeline_mut();
    let event = match pointer {
        Some(x) if response.drag_started() => {
            timeline.brush_start(x);
            None
        }
        Some(x) if response.drag_stopped() => timeline.brush_end(x),
        Some(x) if response.dragged() => timeline.brush_move(x),
        Some(x) if response.clicked() => {
            timeline.brush_start(x);
            timeline.brush_end(x)
        }
        _ => None,
    };
    if let Some(event) = event {
        coordinator.dispatch_or_warn(event, now);
    }
}
