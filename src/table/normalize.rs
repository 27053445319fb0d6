// Typed conversion of well-known result fields

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::info;

use super::{Cell, ResultsTable};
use crate::types::{ExecutionError, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `[{"@ref": r, "@href": h}, ...]` into `{r: h, ...}`
    LinkMap,
    Integer,
    Date,
}

/// Fields that receive a typed conversion. Everything else passes through.
pub const FIELD_CONVERSIONS: &[(&str, Conversion)] = &[
    ("link", Conversion::LinkMap),
    ("document-count", Conversion::Integer),
    ("citedby-count", Conversion::Integer),
    ("prism:coverDate", Conversion::Date),
];

pub fn conversion_for(field: &str) -> Option<Conversion> {
    FIELD_CONVERSIONS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, conversion)| *conversion)
}

impl Conversion {
    pub fn apply(self, field: &str, value: &Value) -> Result<Cell, ExecutionError> {
        // null is kept as-is rather than treated as a conversion failure
        if value.is_null() {
            return Ok(Cell::Value(Value::Null));
        }

        match self {
            Conversion::LinkMap => to_link_map(field, value).map(Cell::Links),
            Conversion::Integer => to_integer(value)
                .map(Cell::Integer)
                .map_err(|reason| conversion_error(field, value, reason)),
            Conversion::Date => to_date(value).map_err(|reason| conversion_error(field, value, reason)),
        }
    }
}

/// Build the typed table for `records`. `source_uri` only feeds diagnostics.
pub fn normalize(records: &[Record], source_uri: &str) -> Result<ResultsTable, ExecutionError> {
    let mut table = ResultsTable::default();

    for record in records {
        let mut fields = Vec::with_capacity(record.len());
        for (name, value) in record {
            let cell = match conversion_for(name) {
                Some(conversion) => conversion.apply(name, value)?,
                None => Cell::Value(value.clone()),
            };
            fields.push((name.clone(), cell));
        }
        table.push_row(fields);
    }

    for (field, count) in date_conversion_counts(records) {
        info!(field = %field, uri = %source_uri, count, "Converted date field");
    }

    Ok(table)
}

/// Date fields that held at least one non-null value, with how many.
fn date_conversion_counts(records: &[Record]) -> Vec<(&'static str, usize)> {
    FIELD_CONVERSIONS
        .iter()
        .filter(|(_, conversion)| *conversion == Conversion::Date)
        .map(|(field, _)| {
            let count = records
                .iter()
                .filter(|r| r.get(*field).is_some_and(|v| !v.is_null()))
                .count();
            (*field, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

fn to_link_map(field: &str, value: &Value) -> Result<BTreeMap<String, String>, ExecutionError> {
    let malformed = || ExecutionError::MalformedField {
        field: field.to_string(),
        value: value.to_string(),
    };

    value
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|link| {
            let rel = link.get("@ref").and_then(Value::as_str);
            let href = link.get("@href").and_then(Value::as_str);
            match (rel, href) {
                (Some(rel), Some(href)) => Ok((rel.to_string(), href.to_string())),
                _ => Err(malformed()),
            }
        })
        .collect()
}

fn to_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| "number out of range".to_string()),
        Value::String(s) => s.trim().parse::<i64>().map_err(|e| e.to_string()),
        Value::Bool(b) => Ok(i64::from(*b)),
        _ => Err("expected a number or numeric string".to_string()),
    }
}

fn to_date(value: &Value) -> Result<Cell, String> {
    let text = value
        .as_str()
        .ok_or_else(|| "expected a date string".to_string())?
        .trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(Cell::Date(date));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(Cell::Timestamp(ts.naive_utc()));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .map(Cell::Timestamp)
        .map_err(|e| e.to_string())
}

fn conversion_error(field: &str, value: &Value, reason: String) -> ExecutionError {
    ExecutionError::Conversion {
        field: field.to_string(),
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("record must be an object"),
        }
    }

    #[test]
    fn test_link_map() {
        let records = vec![record(json!({
            "link": [
                {"@ref": "next", "@href": "X"},
                {"@ref": "self", "@href": "Y"}
            ]
        }))];
        let table = normalize(&records, "uri").unwrap();

        let links = table.get(0, "link").and_then(Cell::as_links).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links["next"], "X");
        assert_eq!(links["self"], "Y");
    }

    #[test]
    fn test_integer_fields() {
        let records = vec![
            record(json!({"citedby-count": "3", "document-count": 12})),
            record(json!({"citedby-count": " 41 "})),
        ];
        let table = normalize(&records, "uri").unwrap();

        assert_eq!(table.get(0, "citedby-count"), Some(&Cell::Integer(3)));
        assert_eq!(table.get(0, "document-count"), Some(&Cell::Integer(12)));
        assert_eq!(table.get(1, "citedby-count").and_then(Cell::as_integer), Some(41));
        assert!(table.get(1, "document-count").is_none());
    }

    #[test]
    fn test_cover_date() {
        let records = vec![
            record(json!({"prism:coverDate": "2020-01-15"})),
            record(json!({"prism:coverDate": "2021-06-01T10:30:00Z"})),
        ];
        let table = normalize(&records, "uri").unwrap();

        assert_eq!(
            table.get(0, "prism:coverDate"),
            Some(&Cell::Date(NaiveDate::from_ymd_opt(2020, 1, 15).unwrap()))
        );
        let second = table.get(1, "prism:coverDate").unwrap();
        assert!(matches!(second, Cell::Timestamp(_)));
        assert_eq!(second.as_date(), NaiveDate::from_ymd_opt(2021, 6, 1));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let records = vec![record(json!({
            "dc:title": "A title",
            "prism:volume": "12",
            "affiliation": [{"affilname": "Somewhere"}]
        }))];
        let table = normalize(&records, "uri").unwrap();

        assert_eq!(table.get(0, "dc:title"), Some(&Cell::Value(json!("A title"))));
        assert_eq!(table.get(0, "prism:volume"), Some(&Cell::Value(json!("12"))));
        assert_eq!(
            table.get(0, "affiliation").and_then(Cell::as_value),
            Some(&json!([{"affilname": "Somewhere"}]))
        );
    }

    #[test]
    fn test_bad_integer_is_an_error() {
        let records = vec![record(json!({"citedby-count": "many"}))];
        let err = normalize(&records, "uri").unwrap_err();
        assert!(matches!(err, ExecutionError::Conversion { ref field, .. } if field == "citedby-count"));
    }

    #[test]
    fn test_malformed_link_is_an_error() {
        let records = vec![record(json!({"link": [{"@ref": "self"}]}))];
        let err = normalize(&records, "uri").unwrap_err();
        assert!(matches!(err, ExecutionError::MalformedField { .. }));
    }

    #[test]
    fn test_null_is_kept() {
        let records = vec![record(json!({"citedby-count": null}))];
        let table = normalize(&records, "uri").unwrap();
        assert_eq!(table.get(0, "citedby-count"), Some(&Cell::Value(Value::Null)));
    }

    #[test]
    fn test_date_conversions_counted() {
        let records = vec![
            record(json!({"prism:coverDate": "2020-01-15"})),
            record(json!({"prism:coverDate": null})),
            record(json!({"prism:coverDate": "2021-03-02"})),
            record(json!({"dc:title": "undated"})),
        ];
        assert_eq!(date_conversion_counts(&records), vec![("prism:coverDate", 2)]);
    }

    #[test]
    fn test_null_dates_are_not_reported() {
        let records = vec![record(json!({"prism:coverDate": null}))];
        assert!(date_conversion_counts(&records).is_empty());

        // the column still exists, holding the null
        let table = normalize(&records, "uri").unwrap();
        assert!(table.has_column("prism:coverDate"));
    }

    #[test]
    fn test_conversion_lookup() {
        assert_eq!(conversion_for("citedby-count"), Some(Conversion::Integer));
        assert_eq!(conversion_for("prism:coverDate"), Some(Conversion::Date));
        assert_eq!(conversion_for("dc:title"), None);
    }
}
