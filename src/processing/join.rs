//! Keyed join of a previous render set against new data.
//!
//! Every key ends up in exactly one of `entering`, `updating` or `exiting`,
//! each paired with the descriptors its transition runs between. Where an
//! entering or exiting element starts or ends is decided by a [`JoinPolicy`];
//! ring sectors use [`RingJoin`], which anchors them on their neighbours so
//! nothing sweeps in from angle zero.

use std::collections::{HashMap, HashSet};

use crate::error::DashboardError;
use crate::render::shape::ShapeDescriptor;

/// A key with the descriptor bound to it.
pub type Keyed = (String, ShapeDescriptor);

#[derive(Debug, Clone, PartialEq)]
pub struct JoinEntry {
    pub key: String,
    pub from: ShapeDescriptor,
    pub to: ShapeDescriptor,
    /// False when no neighbour could anchor the transition; the element then
    /// appears or disappears in place.
    pub anchored: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Join {
    pub entering: Vec<JoinEntry>,
    pub updating: Vec<JoinEntry>,
    pub exiting: Vec<JoinEntry>,
}

impl Join {
    pub fn is_noop(&self) -> bool {
        self.entering.is_empty()
            && self.exiting.is_empty()
            && self.updating.iter().all(|e| e.from == e.to)
    }

    /// Moves any key found in both `entering` and `exiting` into `updating`,
    /// running from the exiting entry's start to the entering entry's target.
    /// Returns the offending keys.
    pub fn repair_overlap(&mut self) -> Vec<String> {
        let exiting: HashSet<&str> = self.exiting.iter().map(|e| e.key.as_str()).collect();
        let overlap: Vec<String> = self
            .entering
            .iter()
            .filter(|e| exiting.contains(e.key.as_str()))
            .map(|e| e.key.clone())
            .collect();
        if overlap.is_empty() {
            return overlap;
        }

        for key in &overlap {
            let Some(enter_pos) = self.entering.iter().position(|e| &e.key == key) else {
                continue;
            };
            let Some(exit_pos) = self.exiting.iter().position(|e| &e.key == key) else {
                continue;
            };
            let enter = self.entering.remove(enter_pos);
            let exit = self.exiting.remove(exit_pos);
            self.updating.push(JoinEntry {
                key: enter.key,
                from: exit.from,
                to: enter.to,
                anchored: true,
            });
        }
        overlap
    }
}

/// Decides the endpoints of elements that have no counterpart on one side.
pub trait JoinPolicy {
    /// Starting shape for `new[index]`, which has no old element.
    fn enter_from(&self, index: usize, new: &[Keyed], old: &[Keyed]) -> Option<ShapeDescriptor>;

    /// Final shape for `old[index]`, which has no new datum.
    fn exit_to(&self, index: usize, old: &[Keyed], new: &[Keyed]) -> Option<ShapeDescriptor>;
}

/// Object constancy for ring sectors.
///
/// An entering sector grows out of the edge of its nearest old neighbour
/// (the end of the closest preceding one, else the start of the closest
/// following one). An exiting sector collapses onto its nearest neighbour
/// in the new layout by the same rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct RingJoin;

impl JoinPolicy for RingJoin {
    fn enter_from(&self, index: usize, new: &[Keyed], old: &[Keyed]) -> Option<ShapeDescriptor> {
        neighbor_arc(index, new, old)
    }

    fn exit_to(&self, index: usize, old: &[Keyed], new: &[Keyed]) -> Option<ShapeDescriptor> {
        neighbor_arc(index, old, new)
    }
}

/// Paths rise from and sink to the baseline; other shapes appear in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineJoin;

impl JoinPolicy for BaselineJoin {
    fn enter_from(&self, index: usize, new: &[Keyed], _old: &[Keyed]) -> Option<ShapeDescriptor> {
        baseline_of(&new[index].1)
    }

    fn exit_to(&self, index: usize, old: &[Keyed], _new: &[Keyed]) -> Option<ShapeDescriptor> {
        baseline_of(&old[index].1)
    }
}

fn baseline_of(shape: &ShapeDescriptor) -> Option<ShapeDescriptor> {
    match shape {
        ShapeDescriptor::Path(_) => Some(shape.flattened()),
        _ => None,
    }
}

/// Walks `walk` outward from `index` and returns a collapsed arc at the edge of
/// the first key that also appears in `lookup`: the end angle of a preceding
/// match, else the start angle of a following one.
pub fn neighbor_arc(index: usize, walk: &[Keyed], lookup: &[Keyed]) -> Option<ShapeDescriptor> {
    let positions: HashMap<&str, usize> = lookup
        .iter()
        .enumerate()
        .map(|(i, (k, _))| (k.as_str(), i))
        .collect();
    let edge = |j: usize, take_end: bool| -> Option<ShapeDescriptor> {
        let p = *positions.get(walk[j].0.as_str())?;
        match lookup[p].1 {
            ShapeDescriptor::Arc { start, end } => {
                Some(ShapeDescriptor::collapsed_arc(if take_end { end } else { start }))
            }
            _ => None,
        }
    };

    (0..index.min(walk.len()))
        .rev()
        .find_map(|j| edge(j, true))
        .or_else(|| (index + 1..walk.len()).find_map(|j| edge(j, false)))
}

/// Classify `new` against `old` by key.
///
/// `old` holds each element's bound (target) descriptor in render order;
/// `new` holds the freshly laid out descriptors. Duplicate keys in `new` keep
/// their first occurrence.
pub fn reconcile(old: &[Keyed], new: &[Keyed], policy: &dyn JoinPolicy) -> Join {
    let mut seen = HashSet::new();
    let mut deduped: Vec<Keyed> = Vec::with_capacity(new.len());
    for (key, shape) in new {
        if seen.insert(key.as_str()) {
            deduped.push((key.clone(), shape.clone()));
        } else {
            tracing::warn!("Duplicate key `{key}` in new data ignored");
        }
    }
    let new = deduped;

    let old_index: HashMap<&str, usize> = old.iter().enumerate().map(|(i, (k, _))| (k.as_str(), i)).collect();
    let new_keys: HashSet<&str> = new.iter().map(|(k, _)| k.as_str()).collect();

    let mut join = Join::default();
    for (i, (key, to)) in new.iter().enumerate() {
        match old_index.get(key.as_str()) {
            Some(&j) => join.updating.push(JoinEntry {
                key: key.clone(),
                from: old[j].1.clone(),
                to: to.clone(),
                anchored: true,
            }),
            None => {
                let from = policy.enter_from(i, &new, old);
                join.entering.push(JoinEntry {
                    key: key.clone(),
                    anchored: from.is_some(),
                    from: from.unwrap_or_else(|| to.clone()),
                    to: to.clone(),
                });
            }
        }
    }
    for (i, (key, from)) in old.iter().enumerate() {
        if new_keys.contains(key.as_str()) {
            continue;
        }
        let to = policy.exit_to(i, old, &new);
        join.exiting.push(JoinEntry {
            key: key.clone(),
            anchored: to.is_some(),
            from: from.clone(),
            to: to.unwrap_or_else(|| from.clone()),
        });
    }

    let overlap = join.repair_overlap();
    if !overlap.is_empty() {
        let err = DashboardError::ReconciliationInvariant { keys: overlap };
        debug_assert!(false, "{err}");
        tracing::error!("{err}; treating as updating");
    }

    tracing::debug!(
        entering = join.entering.len(),
        updating = join.updating.len(),
        exiting = join.exiting.len(),
        "reconciled"
    );
    join
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::layout::ring_layout;

    fn arc(start: f64, end: f64) -> ShapeDescriptor {
        ShapeDescriptor::Arc { start, end }
    }

    fn keyed(items: &[(&str, f64, f64)]) -> Vec<Keyed> {
        items.iter().map(|(k, s, e)| (k.to_string(), arc(*s, *e))).collect()
    }

    #[test]
    fn exiting_sector_collapses_onto_preceding_neighbor() {
        let old = keyed(&[("A", 0.0, 10.0), ("B", 10.0, 25.0), ("C", 25.0, 40.0)]);
        let new = keyed(&[("A", 0.0, 16.0), ("C", 16.0, 40.0)]);
        let join = reconcile(&old, &new, &RingJoin);

        assert!(join.entering.is_empty());
        assert_eq!(join.exiting.len(), 1);
        let b = &join.exiting[0];
        assert_eq!(b.key, "B");
        assert_eq!(b.from, arc(10.0, 25.0));
        assert_eq!(b.to, ShapeDescriptor::collapsed_arc(16.0));
        assert!(b.anchored);
    }

    #[test]
    fn exiting_first_sector_uses_following_neighbor_start() {
        let old = keyed(&[("A", 0.0, 10.0), ("B", 10.0, 25.0)]);
        let new = keyed(&[("B", 0.0, 40.0)]);
        let join = reconcile(&old, &new, &RingJoin);
        assert_eq!(join.exiting[0].to, ShapeDescriptor::collapsed_arc(0.0));
    }

    #[test]
    fn entering_sector_grows_from_old_neighbor() {
        let old = keyed(&[("A", 0.0, 20.0), ("C", 20.0, 40.0)]);
        let new = keyed(&[("A", 0.0, 10.0), ("B", 10.0, 25.0), ("C", 25.0, 40.0)]);
        let join = reconcile(&old, &new, &RingJoin);
        assert_eq!(join.entering.len(), 1);
        assert_eq!(join.entering[0].from, ShapeDescriptor::collapsed_arc(20.0));
        assert_eq!(join.entering[0].to, arc(10.0, 25.0));

        let head = keyed(&[("Z", 0.0, 5.0), ("A", 5.0, 20.0), ("C", 20.0, 40.0)]);
        let join = reconcile(&old, &head, &RingJoin);
        assert_eq!(join.entering[0].from, ShapeDescriptor::collapsed_arc(0.0));
    }

    #[test]
    fn skips_neighbors_missing_from_other_layout() {
        // B and C both enter; C's preceding neighbour B is new, so the walk
        // continues to A.
        let old = keyed(&[("A", 0.0, 30.0), ("D", 30.0, 40.0)]);
        let new = keyed(&[("A", 0.0, 10.0), ("B", 10.0, 20.0), ("C", 20.0, 30.0), ("D", 30.0, 40.0)]);
        let join = reconcile(&old, &new, &RingJoin);
        let c = join.entering.iter().find(|e| e.key == "C").unwrap();
        assert_eq!(c.from, ShapeDescriptor::collapsed_arc(30.0));
    }

    #[test]
    fn lone_elements_stay_in_place() {
        let join = reconcile(&[], &keyed(&[("A", 0.0, 6.0)]), &RingJoin);
        assert_eq!(join.entering[0].from, arc(0.0, 6.0));
        assert!(!join.entering[0].anchored);

        let join = reconcile(&keyed(&[("A", 0.0, 6.0)]), &[], &RingJoin);
        assert_eq!(join.exiting[0].to, arc(0.0, 6.0));
        assert!(!join.exiting[0].anchored);
    }

    #[test]
    fn identical_data_is_a_noop() {
        let layout = ring_layout(&[("a".into(), 3.0), ("b".into(), 5.0)], 0.06);
        let join = reconcile(&layout, &layout, &RingJoin);
        assert!(join.entering.is_empty());
        assert!(join.exiting.is_empty());
        assert_eq!(join.updating.len(), 2);
        assert!(join.is_noop());
    }

    #[test]
    fn duplicate_new_keys_keep_first() {
        let new = keyed(&[("A", 0.0, 1.0), ("A", 1.0, 2.0)]);
        let join = reconcile(&[], &new, &BaselineJoin);
        assert_eq!(join.entering.len(), 1);
        assert_eq!(join.entering[0].to, arc(0.0, 1.0));
    }

    #[test]
    fn repair_overlap_reclassifies_as_updating() {
        let mut join = Join {
            entering: vec![JoinEntry { key: "A".into(), from: arc(0.0, 0.0), to: arc(0.0, 2.0), anchored: true }],
            updating: vec![],
            exiting: vec![JoinEntry { key: "A".into(), from: arc(0.0, 1.0), to: arc(1.0, 1.0), anchored: true }],
        };
        assert_eq!(join.repair_overlap(), vec!["A".to_string()]);
        assert!(join.entering.is_empty() && join.exiting.is_empty());
        assert_eq!(join.updating[0].from, arc(0.0, 1.0));
        assert_eq!(join.updating[0].to, arc(0.0, 2.0));
    }

    #[test]
    fn baseline_join_flattens_paths() {
        let path = ShapeDescriptor::Path(vec![[0.0, 0.5], [1.0, 0.8]]);
        let join = reconcile(&[], &[("a".into(), path)], &BaselineJoin);
        assert_eq!(join.entering[0].from, ShapeDescriptor::Path(vec![[0.0, 0.0], [1.0, 0.0]]));
    }
}
