use std::path::Path;

use serde_json::Value;

use crate::data::datetime::{detect_date_format, parse_date};
use crate::data::record::{Dataset, Metric, Record};
use crate::error::{DashboardError, Result};

/// Load a dataset from a JSON or CSV file, picked by extension.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let dataset = match ext.as_str() {
        "json" => parse_json(&std::fs::read_to_string(path)?)?,
        "csv" => parse_csv(std::fs::read(path)?.as_slice())?,
        _ => return Err(DashboardError::Parse(format!("Unsupported file format: .{ext}"))),
    };

    if dataset.is_empty() {
        return Err(DashboardError::EmptyDataset);
    }
    for issue in dataset.audit() {
        tracing::warn!("{issue}");
    }
    tracing::info!("Loaded {} entities from {:?}", dataset.len(), path);
    Ok(dataset)
}

/// Parse `{ "<entity>": [ { "date": ..., "price_usd": ..., ... } ] }`.
pub fn parse_json(text: &str) -> Result<Dataset> {
    let root: Value = serde_json::from_str(text)?;
    let object = root
        .as_object()
        .ok_or_else(|| DashboardError::Parse("expected an object keyed by entity".into()))?;

    let mut records = Vec::new();
    for (entity, rows) in object {
        let rows = rows
            .as_array()
            .ok_or_else(|| DashboardError::Parse(format!("`{entity}` is not an array of records")))?;

        let dates: Vec<&str> = rows.iter().filter_map(|row| row.get("date")?.as_str()).collect();
        let format = detect_date_format(dates.iter().copied())
            .ok_or_else(|| DashboardError::Parse(format!("`{entity}` has no parseable dates")))?;

        for row in rows {
            let Some(date) = row.get("date").and_then(Value::as_str).and_then(|s| parse_date(s, format))
            else {
                tracing::trace!("Skipping `{entity}` row without a usable date");
                continue;
            };
            let mut record = Record::new(entity.as_str(), date);
            for metric in Metric::ALL {
                if let Some(v) = row.get(metric.name()).and_then(coerce_number) {
                    record = record.with_metric(metric, v);
                }
            }
            records.push(record);
        }
    }

    Ok(Dataset::from_records(records))
}

/// Parse long-format CSV: `entity,date,<metric columns...>`.
pub fn parse_csv(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let entity_col = column("entity")
        .ok_or_else(|| DashboardError::Parse("missing `entity` column".into()))?;
    let date_col = column("date").ok_or_else(|| DashboardError::Parse("missing `date` column".into()))?;
    let metric_cols: Vec<(Metric, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| Metric::from_name(h).ok().map(|m| (m, i)))
        .collect();

    let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    let format = detect_date_format(rows.iter().filter_map(|r| r.get(date_col)))
        .ok_or_else(|| DashboardError::Parse("no parseable dates".into()))?;

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let (Some(entity), Some(date)) = (
            row.get(entity_col).filter(|e| !e.is_empty()),
            row.get(date_col).and_then(|d| parse_date(d, format)),
        ) else {
            continue;
        };
        let mut record = Record::new(entity, date);
        for &(metric, col) in &metric_cols {
            if let Some(v) = row.get(col).and_then(|s| s.parse::<f64>().ok()) {
                record = record.with_metric(metric, v);
            }
        }
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

/// Numbers and numeric strings become values; null, empty and garbage become absent.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    const COINS: &str = r#"{
        "bitcoin": [
            {"date": "13/5/2013", "price_usd": "117.2", "24h_vol": null, "market_cap": "1300000000"},
            {"date": "12/5/2013", "price_usd": 115.0, "24h_vol": "0", "market_cap": "1290000000"}
        ],
        "ripple": [
            {"date": "12/5/2013", "price_usd": null, "24h_vol": "", "market_cap": "n/a"}
        ]
    }"#;

    #[test]
    fn json_coerces_and_sorts() {
        let ds = parse_json(COINS).unwrap();
        let btc = ds.records("bitcoin");
        assert_eq!(btc[0].timestamp, NaiveDate::from_ymd_opt(2013, 5, 12).unwrap());
        assert_eq!(btc[0].value(Metric::Value), Some(115.0));
        assert_eq!(btc[0].value(Metric::Volume), Some(0.0));
        assert_eq!(btc[1].value(Metric::Volume), None);
        assert_eq!(btc[1].value(Metric::MarketCap), Some(1.3e9));

        let xrp = &ds.records("ripple")[0];
        assert!(xrp.metrics.is_empty());
    }

    #[test]
    fn json_rejects_wrong_shape() {
        assert!(matches!(parse_json("[1, 2]"), Err(DashboardError::Parse(_))));
        assert!(matches!(parse_json("{"), Err(DashboardError::Json(_))));
    }

    #[test]
    fn csv_long_format() {
        let text = "entity,date,price_usd,24h_vol\n\
                    alpha,2017-01-02,2.5,10\n\
                    alpha,2017-01-01,1.5,\n\
                    beta,2017-01-01,oops,3\n";
        let ds = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records("alpha")[0].value(Metric::Value), Some(1.5));
        assert_eq!(ds.records("alpha")[0].value(Metric::Volume), None);
        assert_eq!(ds.records("beta")[0].value(Metric::Value), None);
        assert_eq!(ds.records("beta")[0].value(Metric::Volume), Some(3.0));
    }

    #[test]
    fn load_dataset_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(COINS.as_bytes()).unwrap();
        let ds = load_dataset(file.path()).unwrap();
        assert!(ds.contains("bitcoin"));

        let empty = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::fs::write(empty.path(), "{}").unwrap();
        assert!(matches!(load_dataset(empty.path()), Err(DashboardError::EmptyDataset)));

        let other = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(matches!(load_dataset(other.path()), Err(DashboardError::Parse(_))));
    }
}
