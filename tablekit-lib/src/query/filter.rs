//! Filter definitions and the filter evaluator.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::model::Record;
use crate::model::Value;

/// Relational operator applied by a number filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparison {
    /// `field > value`
    Greater,
    /// `field < value`
    Less,
    /// `field >= value`
    GreaterOrEqual,
    /// `field <= value`
    LessOrEqual,
    /// `field == value`
    #[default]
    Equal,
}

impl Comparison {
    /// Applies the operator to a field value and a filter value.
    pub fn test(self, field: f64, value: f64) -> bool {
        match self {
            Comparison::Greater => field > value,
            Comparison::Less => field < value,
            Comparison::GreaterOrEqual => field >= value,
            Comparison::LessOrEqual => field <= value,
            Comparison::Equal => field == value,
        }
    }
}

/// One choice of a select filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Kind-specific part of a filter definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FilterKind {
    /// Case-insensitive substring search.
    Text {
        /// Fields to search instead of the single target field; any match wins.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        search_keys: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    /// Numeric comparison.
    Number {
        #[serde(default, rename = "comparisonType")]
        comparison: Comparison,
    },
    /// Exact match against one of a fixed set of options.
    Select { options: Vec<SelectOption> },
    /// Inclusive timestamp interval.
    DateRange,
}

/// A declarative filterable dimension of the table.
///
/// `key` identifies the filter in the [`FilterValues`] map. The record field
/// it reads is `filter_for` when set, otherwise `key`, so two filters can
/// target the same field:
///
/// ```
/// use tablekit_lib::query::{Comparison, FilterDef};
///
/// let filters = vec![
///     FilterDef::number("amount", "Min. Amount", Comparison::Greater).filter_for("amount"),
///     FilterDef::number("amount_2", "Max. Amount", Comparison::Less).filter_for("amount"),
/// ];
/// ```
///
/// A definition without a `"type"` is a text filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDef {
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_for: Option<String>,
    #[serde(flatten)]
    pub kind: FilterKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterDefRepr {
    key: String,
    label: String,
    #[serde(default)]
    filter_for: Option<String>,
    #[serde(flatten)]
    kind: FilterKind,
}

impl<'de> Deserialize<'de> for FilterDef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = serde_json::Map::deserialize(deserializer)?;
        fields
            .entry("type")
            .or_insert_with(|| serde_json::Value::from("text"));

        let repr = FilterDefRepr::deserialize(serde_json::Value::Object(fields))
            .map_err(serde::de::Error::custom)?;
        Ok(FilterDef {
            key: repr.key,
            label: repr.label,
            filter_for: repr.filter_for,
            kind: repr.kind,
        })
    }
}

impl FilterDef {
    /// Creates a text filter on the field named by `key`.
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(
            key,
            label,
            FilterKind::Text {
                search_keys: None,
                placeholder: None,
            },
        )
    }

    /// Creates a number filter.
    pub fn number(key: impl Into<String>, label: impl Into<String>, comparison: Comparison) -> Self {
        Self::with_kind(key, label, FilterKind::Number { comparison })
    }

    /// Creates a select filter.
    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = SelectOption>,
    ) -> Self {
        Self::with_kind(
            key,
            label,
            FilterKind::Select {
                options: options.into_iter().collect(),
            },
        )
    }

    /// Creates a date range filter.
    pub fn date_range(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(key, label, FilterKind::DateRange)
    }

    fn with_kind(key: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            filter_for: None,
            kind,
        }
    }

    /// Reads `field` instead of `key` (builder pattern).
    pub fn filter_for(mut self, field: impl Into<String>) -> Self {
        self.filter_for = Some(field.into());
        self
    }

    /// Searches these fields instead of the target field. Text filters only.
    pub fn search_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let FilterKind::Text { search_keys, .. } = &mut self.kind {
            *search_keys = Some(keys.into_iter().map(Into::into).collect());
        }
        self
    }

    /// Sets the input placeholder. Text filters only.
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        if let FilterKind::Text { placeholder, .. } = &mut self.kind {
            *placeholder = Some(text.into());
        }
        self
    }

    /// The record field this filter reads.
    pub fn target(&self) -> &str {
        self.filter_for.as_deref().unwrap_or(&self.key)
    }

    /// Returns `true` if the record satisfies this filter for `value`.
    ///
    /// Inactive values (see [`FilterValue::is_active`]) match every record.
    /// A value of the wrong shape for the filter kind matches nothing.
    pub fn matches(&self, record: &Record, value: &FilterValue) -> bool {
        if !value.is_active() {
            return true;
        }
        match &self.kind {
            FilterKind::Text {
                search_keys: Some(keys),
                ..
            } => {
                let needle = value.needle();
                keys.iter()
                    .any(|key| contains_text(record.resolve(key), &needle))
            }
            FilterKind::Text { .. } => contains_text(record.resolve(self.target()), &value.needle()),
            FilterKind::Number { comparison } => {
                let (Some(expected), Some(actual)) = (
                    value.as_number(),
                    record.resolve(self.target()).and_then(Value::as_f64),
                ) else {
                    return false;
                };
                comparison.test(actual, expected)
            }
            FilterKind::Select { .. } => value.strict_eq(record.resolve(self.target())),
            FilterKind::DateRange => match value {
                FilterValue::Range(range) => range.contains(record.resolve(self.target())),
                _ => false,
            },
        }
    }
}

/// An inclusive interval of timestamps; either bound may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Returns `true` when both bounds are set.
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Tests a field value against the interval, both ends inclusive.
    ///
    /// An incomplete range places no constraint. Values that are not
    /// timestamps never fall inside a complete range.
    pub fn contains(&self, value: Option<&Value>) -> bool {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return true;
        };
        value
            .and_then(Value::as_datetime)
            .is_some_and(|at| start <= at && at <= end)
    }
}

/// The current user-entered value of one filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
    Range(DateRange),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    pub fn range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        FilterValue::Range(DateRange::new(start, end))
    }

    /// Returns `false` for values that place no constraint.
    ///
    /// Empty text and incomplete ranges are inactive. Numbers, including
    /// zero, are always active.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Number(_) => true,
            FilterValue::Text(s) => !s.is_empty(),
            FilterValue::Range(range) => range.is_complete(),
        }
    }

    /// Numeric reading of the value; numeric text is parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => Some(*n),
            FilterValue::Text(s) => s.trim().parse().ok(),
            FilterValue::Range(_) => None,
        }
    }

    // Lowercased search text.
    fn needle(&self) -> String {
        match self {
            FilterValue::Number(n) => Value::Float(*n).to_text(),
            FilterValue::Text(s) => s.to_lowercase(),
            FilterValue::Range(_) => String::new(),
        }
    }

    // Strict equality: same type and same value, no case folding.
    fn strict_eq(&self, field: Option<&Value>) -> bool {
        match (self, field) {
            (FilterValue::Text(expected), Some(Value::String(actual))) => expected == actual,
            (FilterValue::Number(expected), Some(actual)) => {
                actual.as_f64().is_some_and(|actual| actual == *expected)
            }
            _ => false,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Number(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Number(v as f64)
    }
}

impl From<DateRange> for FilterValue {
    fn from(v: DateRange) -> Self {
        FilterValue::Range(v)
    }
}

fn contains_text(field: Option<&Value>, needle: &str) -> bool {
    match field {
        None | Some(Value::Null) => false,
        Some(value) => {
            let text = value.to_text();
            !text.is_empty() && text.to_lowercase().contains(needle)
        }
    }
}

/// The current value of every filter, keyed by filter key.
///
/// A key without an entry is inactive. Entries whose value is inactive are
/// kept, so a half-filled date range survives between edits.
///
/// When deserialized, `null` entries are dropped: a cleared filter reads the
/// same as a missing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Option<FilterValue>>",
    into = "BTreeMap<String, FilterValue>"
)]
pub struct FilterValues {
    values: BTreeMap<String, FilterValue>,
}

impl From<BTreeMap<String, Option<FilterValue>>> for FilterValues {
    fn from(values: BTreeMap<String, Option<FilterValue>>) -> Self {
        Self {
            values: values
                .into_iter()
                .filter_map(|(k, v)| Some((k, v?)))
                .collect(),
        }
    }
}

impl From<FilterValues> for BTreeMap<String, FilterValue> {
    fn from(values: FilterValues) -> Self {
        values.values
    }
}

impl FilterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a filter value (builder pattern).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Returns `true` if no entries are stored (active or not).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries that currently constrain the view.
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.iter().filter(|(_, v)| v.is_active())
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Returns `true` if the record satisfies every active filter value.
///
/// Values are looked up against `definitions` by key. A value whose key has
/// no definition acts as a text filter on the field named by the key.
pub fn matches_all(record: &Record, values: &FilterValues, definitions: &[FilterDef]) -> bool {
    values.active().all(|(key, value)| {
        match definitions.iter().find(|def| def.key == key) {
            Some(def) => def.matches(record, value),
            None => contains_text(record.resolve(key), &value.needle()),
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn people() -> Vec<Record> {
        vec![
            Record::new().set("id", 1i64).set("name", "Cagatay"),
            Record::new().set("id", 2i64).set("name", "Eray"),
        ]
    }

    fn keep<'a>(records: &'a [Record], values: &FilterValues, defs: &[FilterDef]) -> Vec<&'a Record> {
        records
            .iter()
            .filter(|r| matches_all(r, values, defs))
            .collect()
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let records = people();
        let defs = [FilterDef::text("name", "Name")];
        let values = FilterValues::new().with("name", "cAGAT");

        let kept = keep(&records, &values, &defs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id(), Some(&Value::Long(1)));
    }

    #[test]
    fn test_text_filter_search_keys() {
        let records = vec![
            Record::new().set("id", "a1").set("name", "Ann").set("surname", "Smith"),
            Record::new().set("id", "b2").set("name", "Bob").set("surname", "Jones"),
        ];
        let defs = [FilterDef::text("search", "Search").search_keys(["id", "name", "surname"])];

        let by_surname = FilterValues::new().with("search", "jon");
        assert_eq!(keep(&records, &by_surname, &defs).len(), 1);

        let by_id = FilterValues::new().with("search", "A1");
        assert_eq!(keep(&records, &by_id, &defs)[0].get("name"), Some(&Value::from("Ann")));
    }

    #[test]
    fn test_text_filter_excludes_null_and_empty() {
        let records = vec![
            Record::new().set("note", Value::Null),
            Record::new().set("note", ""),
            Record::new(),
            Record::new().set("note", "null pointer"),
        ];
        let defs = [FilterDef::text("note", "Note")];
        let values = FilterValues::new().with("note", "null");

        assert_eq!(keep(&records, &values, &defs).len(), 1);
    }

    #[test]
    fn test_text_filter_uses_filter_for() {
        let records = people();
        let defs = [FilterDef::text("who", "Who").filter_for("name")];
        let values = FilterValues::new().with("who", "eray");

        assert_eq!(keep(&records, &values, &defs).len(), 1);
    }

    #[test]
    fn test_number_filter_greater() {
        let records: Vec<Record> = [50i64, 100, 101, 250]
            .into_iter()
            .map(|amount| Record::new().set("amount", amount))
            .collect();
        let defs = [FilterDef::number("amount", "Min", Comparison::Greater)];
        let values = FilterValues::new().with("amount", 100i64);

        let kept: Vec<_> = keep(&records, &values, &defs)
            .iter()
            .filter_map(|r| r.get("amount").and_then(Value::as_f64))
            .collect();
        assert_eq!(kept, vec![101.0, 250.0]);
    }

    #[test]
    fn test_min_and_max_on_same_field() {
        let records: Vec<Record> = [10i64, 20, 30, 40]
            .into_iter()
            .map(|amount| Record::new().set("amount", amount))
            .collect();
        let defs = [
            FilterDef::number("amount", "Min", Comparison::GreaterOrEqual),
            FilterDef::number("amount_2", "Max", Comparison::LessOrEqual).filter_for("amount"),
        ];
        let values = FilterValues::new().with("amount", 20i64).with("amount_2", 30i64);

        assert_eq!(keep(&records, &values, &defs).len(), 2);
    }

    #[test]
    fn test_number_filter_zero_is_active() {
        let records = vec![
            Record::new().set("balance", 0i64),
            Record::new().set("balance", 5i64),
        ];
        let defs = [FilterDef::number("balance", "Balance", Comparison::Equal)];
        let values = FilterValues::new().with("balance", 0i64);

        assert_eq!(keep(&records, &values, &defs).len(), 1);
    }

    #[test]
    fn test_number_filter_ignores_non_numeric_fields() {
        let records = vec![
            Record::new().set("amount", "500"),
            Record::new().set("amount", Value::Null),
            Record::new(),
        ];
        let defs = [FilterDef::number("amount", "Min", Comparison::Greater)];
        let values = FilterValues::new().with("amount", "1");

        assert!(keep(&records, &values, &defs).is_empty());
    }

    #[test]
    fn test_select_filter_is_strict() {
        let records = vec![
            Record::new().set("status", "success"),
            Record::new().set("status", "Success"),
            Record::new().set("status", "failed"),
        ];
        let defs = [FilterDef::select(
            "status",
            "Status",
            [SelectOption::new("success", "Successful")],
        )];
        let values = FilterValues::new().with("status", "success");

        assert_eq!(keep(&records, &values, &defs).len(), 1);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 0).unwrap();
        let records = vec![
            Record::new().set("timestamp", start),
            Record::new().set("timestamp", "2024-01-31T23:59:00Z"),
            Record::new().set("timestamp", "2024-02-01T00:00:00Z"),
            Record::new().set("timestamp", "not a date"),
        ];
        let defs = [FilterDef::date_range("timestamp", "Date")];
        let values = FilterValues::new().with("timestamp", DateRange::new(Some(start), Some(end)));

        assert_eq!(keep(&records, &values, &defs).len(), 2);
    }

    #[test]
    fn test_incomplete_date_range_is_inactive() {
        let records = vec![Record::new().set("timestamp", "garbage")];
        let defs = [FilterDef::date_range("timestamp", "Date")];
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let values = FilterValues::new().with("timestamp", DateRange::new(Some(start), None));

        assert_eq!(keep(&records, &values, &defs).len(), 1);
    }

    #[test]
    fn test_empty_text_is_inactive() {
        let records = people();
        let defs = [FilterDef::text("name", "Name")];
        let values = FilterValues::new().with("name", "");

        assert_eq!(keep(&records, &values, &defs).len(), 2);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let records = vec![
            Record::new().set("name", "Ann").set("status", "success"),
            Record::new().set("name", "Ann").set("status", "failed"),
            Record::new().set("name", "Bob").set("status", "success"),
        ];
        let defs = [
            FilterDef::text("name", "Name"),
            FilterDef::select("status", "Status", []),
        ];
        let values = FilterValues::new().with("name", "ann").with("status", "success");

        assert_eq!(keep(&records, &values, &defs).len(), 1);
    }

    #[test]
    fn test_undefined_key_acts_as_text_filter() {
        let records = people();
        let values = FilterValues::new().with("name", "ray");

        assert_eq!(keep(&records, &values, &[]).len(), 1);
    }

    #[test]
    fn test_deserialize_definitions() {
        let json = r#"[
            {"key": "search", "label": "Search", "type": "text",
             "searchKeys": ["id", "name"], "placeholder": "Write id"},
            {"key": "amount_2", "filterFor": "amount", "label": "Max. Amount",
             "type": "number", "comparisonType": "less"},
            {"key": "status", "label": "Status", "type": "select",
             "options": [{"value": "success", "label": "Successful"}]},
            {"key": "timestamp", "label": "Date", "type": "dateRange"}
        ]"#;
        let defs: Vec<FilterDef> = serde_json::from_str(json).unwrap();

        assert_eq!(
            defs[0],
            FilterDef::text("search", "Search")
                .search_keys(["id", "name"])
                .placeholder("Write id")
        );
        assert_eq!(
            defs[1],
            FilterDef::number("amount_2", "Max. Amount", Comparison::Less).filter_for("amount")
        );
        assert!(matches!(defs[2].kind, FilterKind::Select { ref options } if options.len() == 1));
        assert_eq!(defs[3].kind, FilterKind::DateRange);
    }

    #[test]
    fn test_deserialize_values() {
        let json = r#"{"search": "eray", "amount": 0, "timestamp": {"start": null, "end": null}}"#;
        let values: FilterValues = serde_json::from_str(json).unwrap();

        assert_eq!(values.get("search"), Some(&FilterValue::text("eray")));
        assert_eq!(values.get("amount"), Some(&FilterValue::Number(0.0)));
        assert_eq!(values.get("timestamp"), Some(&FilterValue::range(None, None)));
        assert_eq!(values.active().count(), 2);
    }

    #[test]
    fn test_null_values_are_dropped() {
        let json = r#"{"status": null, "search": "x"}"#;
        let values: FilterValues = serde_json::from_str(json).unwrap();

        assert_eq!(values.get("status"), None);
        assert_eq!(values.get("search"), Some(&FilterValue::text("x")));
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"{"search":"x"}"#);
    }

    #[test]
    fn test_definition_without_type_is_text() {
        let def: FilterDef = serde_json::from_str(r#"{"key": "name", "label": "Name"}"#).unwrap();
        assert_eq!(def, FilterDef::text("name", "Name"));

        let def: FilterDef =
            serde_json::from_str(r#"{"key": "q", "label": "Search", "searchKeys": ["name"]}"#).unwrap();
        assert_eq!(def, FilterDef::text("q", "Search").search_keys(["name"]));
    }
}
