use std::f64::consts::TAU;

use crate::processing::join::Keyed;
use crate::render::shape::{ShapeDescriptor, UnitPoint};

/// Partition the full circle proportionally to `values`, in input order.
///
/// Every sector's interval includes one `pad_angle` (clamped so the pads fit
/// the circle). Non-positive values get no share of the circle beyond their
/// pad. When no value is positive every sector is empty at angle zero.
pub fn ring_layout(values: &[(String, f64)], pad_angle: f64) -> Vec<Keyed> {
    let n = values.len();
    let sum: f64 = values.iter().map(|(_, v)| v.max(0.0)).sum();
    if n == 0 || sum <= 0.0 || !sum.is_finite() {
        return values
            .iter()
            .map(|(k, _)| (k.clone(), ShapeDescriptor::collapsed_arc(0.0)))
            .collect();
    }

    let pad = pad_angle.max(0.0).min(TAU / n as f64);
    let k = (TAU - n as f64 * pad) / sum;
    let mut a0 = 0.0;
    values
        .iter()
        .map(|(key, v)| {
            let a1 = a0 + v.max(0.0) * k + pad;
            let arc = ShapeDescriptor::Arc { start: a0, end: a1 };
            a0 = a1;
            (key.clone(), arc)
        })
        .collect()
}

/// Linear map from a data interval onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub min: f64,
    pub max: f64,
}

impl LinearScale {
    /// Scale spanning `values`; a single distinct value is widened by half a unit.
    pub fn fit(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        if (max - min).abs() < 1e-12 {
            return Some(Self { min: min - 0.5, max: max + 0.5 });
        }
        Some(Self { min, max })
    }

    /// Widen the domain multiplicatively, as value axes do. Each bound moves
    /// away from the other whatever its sign.
    pub fn padded(self, factor: f64) -> Self {
        if !factor.is_finite() || factor <= 1.0 {
            return self;
        }
        let away = |v: f64, up: bool| if (v >= 0.0) == up { v * factor } else { v / factor };
        Self {
            min: away(self.min, false),
            max: away(self.max, true),
        }
    }

    pub fn to_unit(&self, v: f64) -> f64 {
        (v - self.min) / (self.max - self.min)
    }

    pub fn from_unit(&self, u: f64) -> f64 {
        self.min + u * (self.max - self.min)
    }
}

/// Project `(x, y)` samples into unit space.
pub fn line_path(points: &[(f64, f64)], x: &LinearScale, y: &LinearScale) -> ShapeDescriptor {
    ShapeDescriptor::Path(
        points
            .iter()
            .map(|&(px, py)| -> UnitPoint { [x.to_unit(px), y.to_unit(py)] })
            .collect(),
    )
}
