use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::record::{Dataset, Metric, Record};
use crate::state::selection::{DateRange, SelectionState};

/// In-range records of one active entity, restricted to records that carry
/// the active metric.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySeries {
    pub entity: String,
    pub records: Vec<Record>,
}

/// Latest in-range value of one metric for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotValue {
    pub entity: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Everything the panels render for one selection.
///
/// Always rebuilt from scratch by [`FilteredView::derive`]; never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub selection: SelectionState,
    /// One series per active entity, in the selection's entity order.
    pub series: Vec<EntitySeries>,
    /// Per metric, the latest in-range value of every dataset entity that
    /// carries one, in dataset order. Ring panels read from this.
    pub snapshot: BTreeMap<Metric, Vec<SnapshotValue>>,
    /// Per-day total of the active metric across active entities over `extent`.
    pub overview: Vec<(NaiveDate, f64)>,
    /// The full range the timeline spans, independent of the selection.
    pub extent: DateRange,
}

impl FilteredView {
    pub fn derive(dataset: &Dataset, selection: &SelectionState, extent: DateRange) -> Self {
        let metric = selection.active_metric;
        let range = selection.date_range;

        let series = selection
            .active_entities
            .iter()
            .filter(|entity| dataset.contains(entity))
            .map(|entity| EntitySeries {
                entity: entity.clone(),
                records: dataset
                    .records(entity)
                    .iter()
                    .filter(|r| range.contains(r.timestamp) && usable(r, metric))
                    .cloned()
                    .collect(),
            })
            .collect();

        let snapshot = Metric::ALL
            .into_iter()
            .map(|m| {
                let latest = dataset
                    .iter()
                    .filter_map(|(entity, records)| {
                        let record = records
                            .iter()
                            .rev()
                            .find(|r| range.contains(r.timestamp) && usable(r, m))?;
                        Some(SnapshotValue {
                            entity: entity.to_string(),
                            date: record.timestamp,
                            value: record.value(m)?,
                        })
                    })
                    .collect();
                (m, latest)
            })
            .collect();

        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for entity in &selection.active_entities {
            for record in dataset.records(entity) {
                if !extent.contains(record.timestamp) || !usable(record, metric) {
                    continue;
                }
                if let Some(v) = record.value(metric) {
                    *totals.entry(record.timestamp).or_default() += v;
                }
            }
        }

        Self {
            selection: selection.clone(),
            series,
            snapshot,
            overview: totals.into_iter().collect(),
            extent,
        }
    }

    /// Sector values for a ring: the latest non-negative value of `metric`
    /// per entity. A negative latest value drops the entity.
    pub fn ring_values(&self, metric: Metric) -> Vec<(String, f64)> {
        self.snapshot
            .get(&metric)
            .into_iter()
            .flatten()
            .filter_map(|s| {
                if s.value < 0.0 {
                    tracing::trace!("Rejecting negative {metric} {} for `{}`", s.value, s.entity);
                    return None;
                }
                Some((s.entity.clone(), s.value))
            })
            .collect()
    }

    pub fn metric(&self) -> Metric {
        self.selection.active_metric
    }
}

/// A record takes part in a view of `metric` when it carries a finite value
/// for it; other metrics of the record do not matter.
fn usable(record: &Record, metric: Metric) -> bool {
    match record.metrics.get(&metric) {
        Some(v) if v.is_finite() => true,
        Some(v) => {
            tracing::trace!("Dropping `{}` on {}: {metric} is {v}", record.entity, record.timestamp);
            false
        }
        None => false,
    }
}
