use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, SelectionError};
use crate::state::selection::DateRange;

/// The numeric attributes every record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "price_usd", alias = "value")]
    Value,
    #[serde(rename = "24h_vol", alias = "volume")]
    Volume,
    #[serde(rename = "market_cap", alias = "size")]
    MarketCap,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Value
    }
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Value, Metric::Volume, Metric::MarketCap];

    /// Field name used by the source files.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Value => "price_usd",
            Metric::Volume => "24h_vol",
            Metric::MarketCap => "market_cap",
        }
    }

    /// Accepts both the source field names and the short aliases.
    pub fn from_name(name: &str) -> Result<Self, SelectionError> {
        match name.trim() {
            "price_usd" | "value" => Ok(Metric::Value),
            "24h_vol" | "volume" => Ok(Metric::Volume),
            "market_cap" | "size" => Ok(Metric::MarketCap),
            other => Err(SelectionError::UnknownMetric(other.to_string())),
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            Metric::Value => "Price (USD)",
            Metric::Volume => "24 Hour Trading Volume (USD)",
            Metric::MarketCap => "Market Capitalization (USD)",
        }
    }

    pub fn ring_title(&self) -> &'static str {
        match self {
            Metric::Value => "Price",
            Metric::Volume => "24 Hour Trading Volume",
            Metric::MarketCap => "Market Capitalization",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One observation of one entity on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub entity: String,
    pub timestamp: NaiveDate,
    /// Metrics missing from the map are absent, never zero.
    pub metrics: BTreeMap<Metric, f64>,
}

impl Record {
    pub fn new(entity: impl Into<String>, timestamp: NaiveDate) -> Self {
        Self {
            entity: entity.into(),
            timestamp,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        self.metrics.insert(metric, value);
        self
    }

    /// The value for `metric` if it is present and finite.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied().filter(|v| v.is_finite())
    }

    /// Checks that every present metric is finite.
    pub fn check_integrity(&self) -> Result<(), DashboardError> {
        match self.metrics.iter().find(|(_, v)| !v.is_finite()) {
            Some((metric, _)) => Err(DashboardError::DataIntegrity {
                entity: self.entity.clone(),
                date: self.timestamp,
                metric: *metric,
            }),
            None => Ok(()),
        }
    }
}

/// Entity id to its records, sorted by timestamp. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    entities: BTreeMap<String, Vec<Record>>,
}

impl Dataset {
    /// Groups records by entity and sorts each sequence by timestamp.
    /// The sort is stable so same-day records keep their input order.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut entities: BTreeMap<String, Vec<Record>> = BTreeMap::new();
        for record in records {
            entities.entry(record.entity.clone()).or_default().push(record);
        }
        for seq in entities.values_mut() {
            seq.sort_by_key(|r| r.timestamp);
        }
        Self { entities }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(|k| k.as_str())
    }

    pub fn records(&self, entity: &str) -> &[Record] {
        self.entities.get(entity).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Earliest and latest timestamp across all entities.
    pub fn extent(&self) -> Option<DateRange> {
        let start = self.entities.values().filter_map(|v| v.first()).map(|r| r.timestamp).min()?;
        let end = self.entities.values().filter_map(|v| v.last()).map(|r| r.timestamp).max()?;
        DateRange::new(start, end).ok()
    }

    /// Every record that carries a non-finite metric value.
    pub fn audit(&self) -> Vec<DashboardError> {
        self.entities
            .values()
            .flatten()
            .filter_map(|r| r.check_integrity().err())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, d).unwrap()
    }

    #[test]
    fn from_records_sorts_each_entity() {
        let ds = Dataset::from_records(vec![
            Record::new("beta", day(3)).with_metric(Metric::Value, 3.0),
            Record::new("alpha", day(2)).with_metric(Metric::Value, 2.0),
            Record::new("beta", day(1)).with_metric(Metric::Value, 1.0),
        ]);
        assert_eq!(ds.entity_ids().collect::<Vec<_>>(), vec!["alpha", "beta"]);
        let beta: Vec<_> = ds.records("beta").iter().map(|r| r.timestamp).collect();
        assert_eq!(beta, vec![day(1), day(3)]);
        assert_eq!(ds.extent().unwrap(), DateRange::new(day(1), day(3)).unwrap());
    }

    #[test]
    fn absent_and_non_finite_values_are_not_values() {
        let r = Record::new("alpha", day(1))
            .with_metric(Metric::Value, f64::NAN)
            .with_metric(Metric::Volume, 4.0);
        assert_eq!(r.value(Metric::Value), None);
        assert_eq!(r.value(Metric::MarketCap), None);
        assert_eq!(r.value(Metric::Volume), Some(4.0));
        assert!(r.check_integrity().is_err());
    }

    #[test]
    fn audit_reports_integrity_errors() {
        let ds = Dataset::from_records(vec![
            Record::new("alpha", day(1)).with_metric(Metric::Value, f64::INFINITY),
            Record::new("alpha", day(2)).with_metric(Metric::Value, 1.0),
        ]);
        let errors = ds.audit();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            DashboardError::DataIntegrity { metric: Metric::Value, .. }
        ));
    }

    #[test]
    fn metric_names_and_aliases() {
        assert_eq!(Metric::from_name("24h_vol").unwrap(), Metric::Volume);
        assert_eq!(Metric::from_name("value").unwrap(), Metric::Value);
        assert_eq!(Metric::from_name("size").unwrap(), Metric::MarketCap);
        assert_eq!(
            Metric::from_name("height"),
            Err(SelectionError::UnknownMetric("height".into()))
        );
    }
}
