// adri-core/src/domain/dataset.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use crate::domain::error::DomainError;

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

/// Runtime kind of a value, used for type homogeneity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Text,
    Temporal,
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

impl Value {
    /// Parses a raw text cell (CSV, metadata) into the narrowest matching value.
    pub fn infer(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>()
            && f.is_finite()
        {
            return Value::Float(f);
        }
        if let Some(ts) = parse_timestamp(trimmed) {
            return Value::Timestamp(ts);
        }
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Value::Date(d);
        }
        Value::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, or (optionally) a blank string.
    pub fn is_missing(&self, empty_strings_are_missing: bool) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => empty_strings_are_missing && s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Integer(_) | Value::Float(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Date(_) | Value::Timestamp(_) => ValueKind::Temporal,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            Value::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            Value::Text(s) => {
                let s = s.trim();
                parse_timestamp(s).or_else(|| {
                    NaiveDate::parse_from_str(s, DATE_FORMAT)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|dt| dt.and_utc())
                })
            }
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        self.as_datetime().map(|dt| dt.date_naive())
    }

    /// Textual rendering used by string-oriented checks (enums, patterns, lengths).
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Declared or expected type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "str", alias = "text")]
    String,
    #[serde(alias = "int")]
    Integer,
    #[serde(alias = "number", alias = "decimal")]
    Float,
    #[serde(alias = "bool")]
    Boolean,
    Date,
    #[serde(alias = "timestamp")]
    Datetime,
}

impl FieldType {
    /// Lenient conformance: parseable text is accepted for numeric and temporal types.
    pub fn conforms(&self, value: &Value) -> bool {
        match self {
            FieldType::String => !value.is_null(),
            FieldType::Integer => match value {
                Value::Integer(_) => true,
                Value::Float(f) => f.is_finite() && f.fract() == 0.0,
                Value::Text(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            FieldType::Float => value.as_f64().is_some(),
            FieldType::Boolean => match value {
                Value::Bool(_) => true,
                Value::Integer(i) => *i == 0 || *i == 1,
                Value::Text(s) => matches!(
                    s.trim().to_ascii_lowercase().as_str(),
                    "true" | "false" | "yes" | "no" | "y" | "n"
                ),
                _ => false,
            },
            FieldType::Date | FieldType::Datetime => value.as_datetime().is_some(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::Datetime)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
    pub declared_type: Option<FieldType>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
            declared_type: None,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.declared_type = Some(field_type);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self, empty_strings_are_missing: bool) -> usize {
        self.values
            .iter()
            .filter(|v| v.is_missing(empty_strings_are_missing))
            .count()
    }

    pub fn non_null(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_null())
    }

    /// Most frequent non-null kind; ties resolve to the lowest kind in declaration order.
    pub fn dominant_kind(&self) -> Option<ValueKind> {
        let mut counts: std::collections::BTreeMap<ValueKind, usize> = Default::default();
        for v in self.non_null() {
            *counts.entry(v.kind()).or_insert(0) += 1;
        }
        let max = counts.values().copied().max()?;
        counts
            .into_iter()
            .find(|(_, count)| *count == max)
            .map(|(kind, _)| kind)
    }
}

/// In-memory tabular data: ordered, equally sized, uniquely named columns.
/// Owned by the connector; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(DomainError::MalformedDataset(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(DomainError::MalformedDataset(format!(
                    "column '{}' has {} values, expected {}",
                    bad.name,
                    bad.len(),
                    expected
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Builds a dataset from a header and row-major records.
    pub fn from_rows<S: Into<String>>(
        headers: Vec<S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, DomainError> {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|h| Column::new(h.clone(), Vec::with_capacity(rows.len())))
            .collect();

        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != headers.len() {
                return Err(DomainError::MalformedDataset(format!(
                    "row {} has {} cells, expected {}",
                    idx,
                    row.len(),
                    headers.len()
                )));
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.values.push(value);
            }
        }
        Self::new(columns)
    }

    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }
}

#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<Column>,
}

impl DatasetBuilder {
    pub fn column<V: Into<Value>>(mut self, name: &str, values: Vec<V>) -> Self {
        self.columns.push(Column::new(
            name,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn typed_column<V: Into<Value>>(
        mut self,
        name: &str,
        field_type: FieldType,
        values: Vec<V>,
    ) -> Self {
        self.columns.push(
            Column::new(name, values.into_iter().map(Into::into).collect())
                .with_type(field_type),
        );
        self
    }

    pub fn build(self) -> Result<Dataset, DomainError> {
        Dataset::new(self.columns)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_infer_values() {
        assert_eq!(Value::infer(""), Value::Null);
        assert_eq!(Value::infer("  "), Value::Null);
        assert_eq!(Value::infer("TRUE"), Value::Bool(true));
        assert_eq!(Value::infer("42"), Value::Integer(42));
        assert_eq!(Value::infer("4.5"), Value::Float(4.5));
        assert!(matches!(Value::infer("2024-03-01"), Value::Date(_)));
        assert!(matches!(
            Value::infer("2024-03-01T10:00:00Z"),
            Value::Timestamp(_)
        ));
        assert_eq!(Value::infer("hello"), Value::Text("hello".into()));
    }

    #[test]
    fn test_field_type_conformance_is_lenient() {
        assert!(FieldType::Integer.conforms(&Value::Text("12".into())));
        assert!(!FieldType::Integer.conforms(&Value::Float(1.5)));
        assert!(FieldType::Float.conforms(&Value::Integer(3)));
        assert!(FieldType::Date.conforms(&Value::Text("2024-01-31".into())));
        assert!(!FieldType::Date.conforms(&Value::Text("31/01/2024".into())));
        assert!(FieldType::Boolean.conforms(&Value::Text("yes".into())));
        assert!(FieldType::String.conforms(&Value::Integer(7)));
        assert!(!FieldType::String.conforms(&Value::Null));
    }

    #[test]
    fn test_dataset_rejects_ragged_columns() {
        let result = Dataset::builder()
            .column("a", vec![1, 2, 3])
            .column("b", vec![1, 2])
            .build();
        assert!(matches!(result, Err(DomainError::MalformedDataset(_))));
    }

    #[test]
    fn test_dataset_rejects_duplicate_names() {
        let result = Dataset::builder()
            .column("a", vec![1])
            .column("a", vec![2])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_rows_transposes() -> Result<()> {
        let ds = Dataset::from_rows(
            vec!["id", "name"],
            vec![
                vec![Value::Integer(1), Value::from("a")],
                vec![Value::Integer(2), Value::Null],
            ],
        )?;
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column_names(), vec!["id", "name"]);
        assert_eq!(ds.column("name").unwrap().missing_count(true), 1);
        assert_eq!(ds.row(1).unwrap()[0], &Value::Integer(2));
        assert!(ds.row(2).is_none());
        Ok(())
    }

    #[test]
    fn test_dominant_kind() -> Result<()> {
        let ds = Dataset::builder()
            .column(
                "mixed",
                vec![Value::Integer(1), Value::Float(2.0), Value::from("x"), Value::Null],
            )
            .build()?;
        let col = ds.column("mixed").unwrap();
        assert_eq!(col.dominant_kind(), Some(ValueKind::Number));
        Ok(())
    }

    #[test]
    fn test_empty_dataset() -> Result<()> {
        let ds = Dataset::new(vec![])?;
        assert!(ds.is_empty());
        assert_eq!(ds.row_count(), 0);
        Ok(())
    }
}
