use std::collections::HashMap;
use std::time::Duration;

use crate::processing::join::{reconcile, Join, JoinPolicy, Keyed};
use crate::render::element::{ElementStyle, Phase, RenderElement};
use crate::render::shape::{Easing, ShapeDescriptor};
use crate::render::surface::RenderSurface;
use crate::render::transition::TransitionScheduler;

/// One element a panel wants on screen after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutItem {
    pub key: String,
    pub shape: ShapeDescriptor,
    pub style: ElementStyle,
}

/// The keyed render elements of one panel plus their transitions.
///
/// Elements are kept in layout order; exiting elements stay next to the
/// neighbour that preceded them until their collapse finishes.
#[derive(Debug, Clone, Default)]
pub struct ElementSet {
    elements: Vec<RenderElement>,
    scheduler: TransitionScheduler,
}

impl ElementSet {
    pub fn new(easing: Easing) -> Self {
        Self {
            elements: Vec::new(),
            scheduler: TransitionScheduler::new(easing),
        }
    }

    /// Reconcile the owned elements against `layout` and start a transition for
    /// every entering, updating and exiting element. `timing` gives the
    /// duration per key; unanchored enters and exits are instant.
    pub fn apply(
        &mut self,
        layout: Vec<LayoutItem>,
        policy: &dyn JoinPolicy,
        timing: &dyn Fn(&str) -> Duration,
        now: f64,
    ) -> Join {
        let old: Vec<Keyed> = self
            .elements
            .iter()
            .map(|e| (e.key.clone(), e.target.clone()))
            .collect();
        let new: Vec<Keyed> = layout.iter().map(|i| (i.key.clone(), i.shape.clone())).collect();
        let join = reconcile(&old, &new, policy);
        let styles: HashMap<&str, ElementStyle> =
            layout.iter().map(|i| (i.key.as_str(), i.style)).collect();

        for entry in &join.updating {
            let Some(el) = self.elements.iter_mut().find(|e| e.key == entry.key) else {
                continue;
            };
            el.target = entry.to.clone();
            if let Some(&style) = styles.get(entry.key.as_str()) {
                if style != el.style {
                    el.style = style;
                    el.dirty = true;
                }
            }
            // Already resting on its target: nothing to animate.
            if !self.scheduler.is_animating(&entry.key) && el.current == entry.to {
                el.phase = Phase::Idle;
                continue;
            }
            // An exiting element whose key came back is simply updated.
            el.phase = Phase::Updating;
            self.scheduler
                .animate(&entry.key, el.current.clone(), entry.to.clone(), timing(&entry.key), now);
        }

        for entry in &join.exiting {
            let Some(el) = self.elements.iter_mut().find(|e| e.key == entry.key) else {
                continue;
            };
            el.phase = Phase::Exiting;
            el.target = entry.to.clone();
            let duration = if entry.anchored { timing(&entry.key) } else { Duration::ZERO };
            self.scheduler
                .animate(&entry.key, el.current.clone(), entry.to.clone(), duration, now);
        }

        let mut by_key: HashMap<String, RenderElement> =
            self.elements.drain(..).map(|e| (e.key.clone(), e)).collect();
        for entry in &join.entering {
            let style = styles.get(entry.key.as_str()).copied().unwrap_or_default();
            let duration = if entry.anchored { timing(&entry.key) } else { Duration::ZERO };
            self.scheduler
                .animate(&entry.key, entry.from.clone(), entry.to.clone(), duration, now);
            by_key.insert(
                entry.key.clone(),
                RenderElement::entering(entry.key.clone(), entry.from.clone(), entry.to.clone(), style),
            );
        }

        let mut ordered: Vec<RenderElement> = Vec::with_capacity(by_key.len());
        for item in &layout {
            if let Some(el) = by_key.remove(&item.key) {
                ordered.push(el);
            }
        }
        for (i, (key, _)) in old.iter().enumerate() {
            let Some(el) = by_key.remove(key) else { continue };
            let pos = old[..i]
                .iter()
                .rev()
                .find_map(|(k, _)| ordered.iter().position(|e| &e.key == k))
                .map_or(0, |p| p + 1);
            ordered.insert(pos, el);
        }
        self.elements = ordered;
        join
    }

    /// Advance transitions to `now`, push changed shapes to `surface`, and drop
    /// exiting elements whose collapse has finished. Returns whether anything
    /// is still animating.
    pub fn sample(&mut self, now: f64, surface: &mut dyn RenderSurface) -> bool {
        for frame in self.scheduler.sample(now) {
            let Some(el) = self.elements.iter_mut().find(|e| e.key == frame.key) else {
                continue;
            };
            el.current = frame.shape;
            el.dirty = true;
            if frame.finished && !el.is_exiting() {
                el.phase = Phase::Idle;
            }
        }

        let scheduler = &self.scheduler;
        self.elements.retain(|el| {
            let done = el.is_exiting() && !scheduler.is_animating(&el.key);
            if done && el.mounted {
                surface.remove(&el.key);
            }
            !done
        });

        for el in &mut self.elements {
            if !el.mounted {
                surface.create(&el.key, el.style);
                el.mounted = true;
                el.dirty = true;
            }
            if el.dirty {
                surface.set_shape(&el.key, &el.current);
                surface.set_style(&el.key, el.style);
                el.dirty = false;
            }
        }

        self.scheduler.has_active()
    }

    pub fn elements(&self) -> &[RenderElement] {
        &self.elements
    }

    pub fn get(&self, key: &str) -> Option<&RenderElement> {
        self.elements.iter().find(|e| e.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.key.as_str()).collect()
    }

    /// Shape of `key` at `now`, including any in-flight interpolation.
    pub fn current(&self, key: &str, now: f64) -> Option<ShapeDescriptor> {
        self.scheduler
            .current(key, now)
            .or_else(|| self.get(key).map(|e| e.current.clone()))
    }

    pub fn scheduler(&self) -> &TransitionScheduler {
        &self.scheduler
    }

    pub fn is_animating(&self) -> bool {
        self.scheduler.has_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::join::RingJoin;
    use crate::processing::layout::ring_layout;
    use crate::render::surface::RetainedScene;

    const SECOND: Duration = Duration::from_secs(1);

    fn items(values: &[(&str, f64)]) -> Vec<LayoutItem> {
        let values: Vec<(String, f64)> = values.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        ring_layout(&values, 0.0)
            .into_iter()
            .map(|(key, shape)| LayoutItem { key, shape, style: ElementStyle::default() })
            .collect()
    }

    fn set() -> ElementSet {
        ElementSet::new(Easing::Linear)
    }

    #[test]
    fn first_update_enters_everything() {
        let mut s = set();
        let join = s.apply(items(&[("a", 1.0), ("b", 1.0)]), &RingJoin, &|_| SECOND, 0.0);
        assert_eq!(join.entering.len(), 2);
        assert!(s.elements().iter().all(|e| e.phase == Phase::Entering));

        let mut scene = RetainedScene::new();
        assert!(!s.sample(0.0, &mut scene));
        assert_eq!(scene.len(), 2);
        assert!(s.elements().iter().all(|e| e.phase == Phase::Idle));
    }

    #[test]
    fn repeated_layout_is_noop() {
        let mut s = set();
        let mut scene = RetainedScene::new();
        s.apply(items(&[("a", 1.0), ("b", 2.0)]), &RingJoin, &|_| SECOND, 0.0);
        s.sample(5.0, &mut scene);
        let join = s.apply(items(&[("a", 1.0), ("b", 2.0)]), &RingJoin, &|_| SECOND, 5.0);
        assert!(join.is_noop());
        assert!(!s.is_animating());
        assert!(s.elements().iter().all(|e| e.phase == Phase::Idle));
        assert!(!s.sample(5.1, &mut scene));
    }

    #[test]
    fn only_changed_elements_animate() {
        let mut s = set();
        let mut scene = RetainedScene::new();
        s.apply(items(&[("a", 1.0), ("b", 1.0)]), &RingJoin, &|_| SECOND, 0.0);
        s.sample(0.0, &mut scene);

        // Both sectors move when the values change.
        s.apply(items(&[("a", 1.0), ("b", 3.0)]), &RingJoin, &|_| SECOND, 1.0);
        assert!(s.scheduler().is_animating("a"));
        assert!(s.scheduler().is_animating("b"));
        s.sample(2.0, &mut scene);

        let mut dimmed = items(&[("a", 1.0), ("b", 3.0)]);
        dimmed[1].style.opacity = 0.3;
        s.apply(dimmed, &RingJoin, &|_| SECOND, 3.0);
        assert!(!s.is_animating());
        assert!(!s.sample(3.0, &mut scene));
        assert_eq!(scene.get("b").unwrap().style.opacity, 0.3);
    }

    #[test]
    fn exiting_element_is_removed_after_collapse() {
        let mut s = set();
        let mut scene = RetainedScene::new();
        s.apply(items(&[("a", 1.0), ("b", 1.0), ("c", 1.0)]), &RingJoin, &|_| SECOND, 0.0);
        s.sample(0.0, &mut scene);

        s.apply(items(&[("a", 1.0), ("c", 1.0)]), &RingJoin, &|_| SECOND, 1.0);
        assert_eq!(s.keys(), vec!["a", "b", "c"]);
        assert!(s.get("b").unwrap().is_exiting());

        assert!(s.sample(1.5, &mut scene));
        assert!(scene.get("b").is_some());
        s.sample(2.0, &mut scene);
        assert!(s.get("b").is_none());
        assert!(scene.get("b").is_none());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn reentry_before_collapse_becomes_update() {
        let mut s = set();
        let mut scene = RetainedScene::new();
        s.apply(items(&[("a", 1.0), ("b", 1.0)]), &RingJoin, &|_| SECOND, 0.0);
        s.sample(0.0, &mut scene);
        s.apply(items(&[("a", 1.0)]), &RingJoin, &|_| SECOND, 1.0);
        s.sample(1.5, &mut scene);

        let join = s.apply(items(&[("a", 1.0), ("b", 1.0)]), &RingJoin, &|_| SECOND, 1.5);
        assert!(join.entering.is_empty());
        assert_eq!(join.updating.len(), 2);
        assert_eq!(s.get("b").unwrap().phase, Phase::Updating);

        s.sample(3.0, &mut scene);
        assert!(scene.get("b").is_some());
        assert_eq!(s.get("b").unwrap().phase, Phase::Idle);
    }

    #[test]
    fn interrupted_update_continues_from_current_shape() {
        let mut s = set();
        let mut scene = RetainedScene::new();
        s.apply(items(&[("a", 1.0), ("b", 1.0)]), &RingJoin, &|_| SECOND, 0.0);
        s.sample(0.0, &mut scene);

        s.apply(items(&[("a", 3.0), ("b", 1.0)]), &RingJoin, &|_| SECOND, 1.0);
        let midway = s.current("a", 1.4).unwrap();
        s.apply(items(&[("a", 1.0), ("b", 3.0)]), &RingJoin, &|_| SECOND, 1.4);
        assert_eq!(s.scheduler().get("a").unwrap().from, midway);
    }

    #[test]
    fn style_change_is_pushed_to_surface() {
        let mut s = set();
        let mut scene = RetainedScene::new();
        s.apply(items(&[("a", 1.0)]), &RingJoin, &|_| SECOND, 0.0);
        s.sample(0.0, &mut scene);

        let mut dimmed = items(&[("a", 1.0)]);
        dimmed[0].style.opacity = 0.3;
        s.apply(dimmed, &RingJoin, &|_| SECOND, 1.0);
        s.sample(1.0, &mut scene);
        assert_eq!(scene.get("a").unwrap().style.opacity, 0.3);
    }
}
