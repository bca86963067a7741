use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::record::{Dataset, Metric};
use crate::error::SelectionError;

/// Inclusive calendar range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = SelectionError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SelectionError> {
        if start > end {
            return Err(SelectionError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of whole days between the bounds.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Current filters shared by every panel.
///
/// `version` counts applied transitions; it is bookkeeping only and takes no
/// part in equality, so two selections that filter identically compare equal.
#[derive(Debug, Clone)]
pub struct SelectionState {
    pub version: u64,
    pub date_range: DateRange,
    pub active_entities: BTreeSet<String>,
    pub active_metric: Metric,
}

impl PartialEq for SelectionState {
    fn eq(&self, other: &Self) -> bool {
        self.date_range == other.date_range
            && self.active_entities == other.active_entities
            && self.active_metric == other.active_metric
    }
}

impl SelectionState {
    pub fn new(
        dataset: &Dataset,
        date_range: DateRange,
        active_entities: BTreeSet<String>,
        active_metric: Metric,
    ) -> Result<Self, SelectionError> {
        let state = Self {
            version: 0,
            date_range,
            active_entities: BTreeSet::new(),
            active_metric,
        };
        let mut state = state.with_entities(dataset, active_entities)?;
        state.version = 0;
        Ok(state)
    }

    pub fn is_active(&self, entity: &str) -> bool {
        self.active_entities.contains(entity)
    }

    pub fn with_range(&self, date_range: DateRange) -> Self {
        self.next(|s| s.date_range = date_range)
    }

    pub fn with_metric(&self, active_metric: Metric) -> Self {
        self.next(|s| s.active_metric = active_metric)
    }

    /// Adds the entity if inactive, removes it if active.
    pub fn with_toggled(&self, dataset: &Dataset, entity: &str) -> Result<Self, SelectionError> {
        if !dataset.contains(entity) {
            return Err(SelectionError::UnknownEntity(entity.to_string()));
        }
        if self.is_active(entity) {
            if self.active_entities.len() == 1 {
                return Err(SelectionError::EmptyEntitySet);
            }
            Ok(self.next(|s| {
                s.active_entities.remove(entity);
            }))
        } else {
            Ok(self.next(|s| {
                s.active_entities.insert(entity.to_string());
            }))
        }
    }

    /// Replaces the active set wholesale.
    pub fn with_entities(
        &self,
        dataset: &Dataset,
        entities: BTreeSet<String>,
    ) -> Result<Self, SelectionError> {
        if entities.is_empty() {
            return Err(SelectionError::EmptyEntitySet);
        }
        if let Some(unknown) = entities.iter().find(|e| !dataset.contains(e)) {
            return Err(SelectionError::UnknownEntity(unknown.clone()));
        }
        Ok(self.next(|s| s.active_entities = entities))
    }

    fn next(&self, change: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        change(&mut next);
        next.version = self.version + 1;
        next
    }
}
