use serde::{Deserialize, Serialize};

/// A point in unit panel space: x and y in `[0, 1]`, y pointing up.
pub type UnitPoint = [f64; 2];

/// Geometry of one visual primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeDescriptor {
    /// Ring sector, angles in radians clockwise from twelve o'clock.
    Arc { start: f64, end: f64 },
    /// Polyline in unit panel space.
    Path(Vec<UnitPoint>),
    /// Horizontal position in unit panel space.
    Position(f64),
}

impl ShapeDescriptor {
    /// A zero-width sector sitting at `angle`.
    pub fn collapsed_arc(angle: f64) -> Self {
        ShapeDescriptor::Arc { start: angle, end: angle }
    }

    /// Linear interpolation towards `to` at parameter `t`.
    ///
    /// Mismatched variants snap to `to`. Paths of different lengths are
    /// resampled to the target's point count before interpolating.
    pub fn lerp(&self, to: &ShapeDescriptor, t: f64) -> ShapeDescriptor {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return to.clone();
        }
        match (self, to) {
            (
                ShapeDescriptor::Arc { start: s0, end: e0 },
                ShapeDescriptor::Arc { start: s1, end: e1 },
            ) => ShapeDescriptor::Arc {
                start: lerp(*s0, *s1, t),
                end: lerp(*e0, *e1, t),
            },
            (ShapeDescriptor::Path(a), ShapeDescriptor::Path(b)) => {
                let a = resample(a, b.len());
                ShapeDescriptor::Path(
                    a.iter()
                        .zip(b)
                        .map(|(p, q)| [lerp(p[0], q[0], t), lerp(p[1], q[1], t)])
                        .collect(),
                )
            }
            (ShapeDescriptor::Position(a), ShapeDescriptor::Position(b)) => {
                ShapeDescriptor::Position(lerp(*a, *b, t))
            }
            _ => to.clone(),
        }
    }

    /// Whether a sector covers `angle` (radians, any winding).
    pub fn arc_contains(&self, angle: f64) -> bool {
        match self {
            ShapeDescriptor::Arc { start, end } if end > start => {
                let a = angle.rem_euclid(std::f64::consts::TAU);
                *start <= a && a < *end
            }
            _ => false,
        }
    }

    /// The same path flattened onto the baseline.
    pub fn flattened(&self) -> ShapeDescriptor {
        match self {
            ShapeDescriptor::Path(points) => {
                ShapeDescriptor::Path(points.iter().map(|p| [p[0], 0.0]).collect())
            }
            other => other.clone(),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Resample a polyline to `n` points spread evenly over its index range.
fn resample(points: &[UnitPoint], n: usize) -> Vec<UnitPoint> {
    if points.len() == n || points.is_empty() {
        return if points.is_empty() { vec![[0.0, 0.0]; n] } else { points.to_vec() };
    }
    if n == 1 || points.len() == 1 {
        return vec![points[0]; n];
    }
    let last = (points.len() - 1) as f64;
    (0..n)
        .map(|i| {
            let pos = i as f64 * last / (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(points.len() - 1);
            let f = pos - lo as f64;
            [
                lerp(points[lo][0], points[hi][0], f),
                lerp(points[lo][1], points[hi][1], f),
            ]
        })
        .collect()
}

/// Maps elapsed-time fraction to the interpolation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    CubicInOut,
}

impl Default for Easing {
    fn default() -> Self {
        Easing::CubicInOut
    }
}

impl Easing {
    pub fn apply(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Easing::Linear => x,
            Easing::CubicInOut => {
                if x < 0.5 {
                    4.0 * x * x * x
                } else {
                    let y = 2.0 * x - 2.0;
                    0.5 * y * y * y + 1.0
                }
            }
        }
    }
}
