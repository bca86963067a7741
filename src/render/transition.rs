use std::collections::HashMap;
use std::time::Duration;

use crate::render::shape::{Easing, ShapeDescriptor};

/// One in-flight interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: ShapeDescriptor,
    pub to: ShapeDescriptor,
    /// Clock time (seconds) the transition started.
    pub started: f64,
    pub duration: f64,
}

impl Transition {
    /// Elapsed fraction at `now`, in `[0, 1]`.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started) / self.duration).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now: f64, easing: Easing) -> ShapeDescriptor {
        self.from.lerp(&self.to, easing.apply(self.progress(now)))
    }
}

/// A sampled descriptor for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub key: String,
    pub shape: ShapeDescriptor,
    pub finished: bool,
}

/// Owns the interpolation state of every animating element of one panel.
///
/// Starting a transition for a key that is already animating replaces it,
/// and the replacement starts from wherever the old one had got to.
#[derive(Debug, Clone, Default)]
pub struct TransitionScheduler {
    active: HashMap<String, Transition>,
    easing: Easing,
}

impl TransitionScheduler {
    pub fn new(easing: Easing) -> Self {
        Self {
            active: HashMap::new(),
            easing,
        }
    }

    /// Start animating `key` from `from` to `to`.
    ///
    /// If `key` is mid-transition, `from` is ignored and the new transition
    /// starts at the superseded one's current interpolated shape.
    pub fn animate(
        &mut self,
        key: &str,
        from: ShapeDescriptor,
        to: ShapeDescriptor,
        duration: Duration,
        now: f64,
    ) -> &Transition {
        let from = match self.active.get(key) {
            Some(running) => running.sample(now, self.easing),
            None => from,
        };
        let transition = Transition {
            from,
            to,
            started: now,
            duration: duration.as_secs_f64(),
        };
        self.active.insert(key.to_string(), transition);
        &self.active[key]
    }

    /// Interpolated shape of `key` at `now`, if it is animating.
    pub fn current(&self, key: &str, now: f64) -> Option<ShapeDescriptor> {
        self.active.get(key).map(|t| t.sample(now, self.easing))
    }

    pub fn get(&self, key: &str) -> Option<&Transition> {
        self.active.get(key)
    }

    pub fn is_animating(&self, key: &str) -> bool {
        self.active.contains_key(key)
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Advance every transition to `now`. Finished transitions are dropped
    /// after reporting their final frame.
    pub fn sample(&mut self, now: f64) -> Vec<Frame> {
        let easing = self.easing;
        let mut frames: Vec<Frame> = self
            .active
            .iter()
            .map(|(key, t)| Frame {
                key: key.clone(),
                shape: t.sample(now, easing),
                finished: t.progress(now) >= 1.0,
            })
            .collect();
        self.active.retain(|_, t| t.progress(now) < 1.0);
        frames.sort_by(|a, b| a.key.cmp(&b.key));
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(start: f64, end: f64) -> ShapeDescriptor {
        ShapeDescriptor::Arc { start, end }
    }

    #[test]
    fn interruption_starts_from_interpolated_shape() {
        let mut s = TransitionScheduler::new(Easing::Linear);
        s.animate("e", arc(0.0, 1.0), arc(1.0, 2.0), Duration::from_secs(1), 0.0);
        let at_04 = s.current("e", 0.4).unwrap();
        match at_04 {
            ShapeDescriptor::Arc { start, end } => {
                assert!((start - 0.4).abs() < 1e-12);
                assert!((end - 1.4).abs() < 1e-12);
            }
            ref other => panic!("unexpected {other:?}"),
        }

        let t = s.animate("e", arc(9.0, 9.0), arc(3.0, 3.0), Duration::from_secs(1), 0.4);
        assert_eq!(t.from, at_04);
        assert_eq!(t.started, 0.4);
    }

    #[test]
    fn idle_key_uses_given_start() {
        let mut s = TransitionScheduler::new(Easing::Linear);
        let t = s.animate("e", arc(0.0, 0.0), arc(1.0, 1.0), Duration::from_millis(500), 2.0);
        assert_eq!(t.from, arc(0.0, 0.0));
    }

    #[test]
    fn sample_reports_and_drops_finished() {
        let mut s = TransitionScheduler::new(Easing::Linear);
        s.animate("a", arc(0.0, 0.0), arc(0.0, 2.0), Duration::from_secs(1), 0.0);
        s.animate("b", arc(0.0, 0.0), arc(0.0, 2.0), Duration::from_secs(2), 0.0);

        let frames = s.sample(1.0);
        assert_eq!(frames.len(), 2);
        assert!(frames[0].finished);
        assert_eq!(frames[0].shape, arc(0.0, 2.0));
        assert!(!frames[1].finished);
        assert_eq!(frames[1].shape, arc(0.0, 1.0));
        assert!(!s.is_animating("a"));
        assert!(s.is_animating("b"));
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let mut s = TransitionScheduler::new(Easing::CubicInOut);
        s.animate("a", arc(0.0, 0.0), arc(1.0, 1.0), Duration::ZERO, 5.0);
        let frames = s.sample(5.0);
        assert!(frames[0].finished);
        assert!(!s.has_active());
    }

    #[test]
    fn stalled_clock_freezes_shape() {
        let mut s = TransitionScheduler::new(Easing::Linear);
        s.animate("a", arc(0.0, 0.0), arc(0.0, 1.0), Duration::from_secs(1), 0.0);
        assert_eq!(s.sample(0.25), s.sample(0.25));
        assert!(s.is_animating("a"));
    }
}
