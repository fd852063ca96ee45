//! Sort state and the record comparator.

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Record;
use crate::model::Value;
use crate::model::text_of;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    /// Applies this direction to an ascending ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// The column a table is sorted by, and in which direction.
///
/// There is always exactly one sort field.
///
/// # Example
///
/// ```
/// use tablekit_lib::query::{Direction, SortState};
///
/// let sort = SortState::toggle(None, "amount");
/// assert_eq!(sort, SortState::asc("amount"));
///
/// let sort = SortState::toggle(Some(&sort), "amount");
/// assert_eq!(sort.direction, Direction::Desc);
///
/// let sort = SortState::toggle(Some(&sort), "name");
/// assert_eq!(sort, SortState::asc("name"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SortState {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }

    /// Next sort state after a header click on `field`.
    ///
    /// Clicking the current column flips its direction; any other column
    /// starts ascending. The result is never "unsorted".
    pub fn toggle(current: Option<&SortState>, field: &str) -> SortState {
        match current {
            Some(sort) if sort.field == field => Self::new(field, sort.direction.flip()),
            _ => Self::asc(field),
        }
    }

    /// Compares two records by this sort state.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        compare_records(a, b, &self.field, self.direction)
    }
}

/// Compares two records on one field.
///
/// Raw field values are compared, never rendered ones. Use with a stable
/// sort so equal records keep their input order in both directions.
pub fn compare_records(a: &Record, b: &Record, field: &str, direction: Direction) -> Ordering {
    direction.apply(compare_values(a.resolve(field), b.resolve(field)))
}

/// Ascending ordering of two raw values.
///
/// Two numbers compare numerically and two timestamps chronologically.
/// Anything else compares by text form through [`collate`], where an absent
/// value reads `undefined` and null reads `null`.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if x.is_numeric() && y.is_numeric() => match (x.as_f64(), y.as_f64()) {
            // NaN compares equal to everything so the sort stays stable
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Some(Value::DateTime(x)), Some(Value::DateTime(y))) => x.cmp(y),
        _ => collate(&text_of(a), &text_of(b)),
    }
}

/// Locale-aware text ordering.
///
/// Letters compare case-insensitively first, so `apple < Banana < cherry`.
/// Strings equal up to case put lowercase first, then fall back to code
/// points so the ordering is total.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded
        .then_with(|| case_order(a, b))
        .then_with(|| a.cmp(b))
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    fn sorted(mut records: Vec<Record>, sort: &SortState) -> Vec<Record> {
        records.sort_by(|a, b| sort.compare(a, b));
        records
    }

    fn ids(records: &[Record]) -> Vec<i64> {
        records
            .iter()
            .filter_map(|r| match r.id() {
                Some(Value::Long(id)) => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_toggle_cycle() {
        let first = SortState::toggle(None, "amount");
        assert_eq!(first, SortState::asc("amount"));

        let second = SortState::toggle(Some(&first), "amount");
        assert_eq!(second, SortState::desc("amount"));

        let third = SortState::toggle(Some(&second), "amount");
        assert_eq!(third, SortState::asc("amount"));

        let other = SortState::toggle(Some(&second), "name");
        assert_eq!(other, SortState::asc("name"));
    }

    #[test]
    fn test_numbers_sort_numerically() {
        let records = vec![
            Record::new().set("id", 1i64).set("amount", 100i64),
            Record::new().set("id", 2i64).set("amount", 9.5),
            Record::new().set("id", 3i64).set("amount", 25i64),
        ];

        assert_eq!(ids(&sorted(records.clone(), &SortState::asc("amount"))), vec![2, 3, 1]);
        assert_eq!(ids(&sorted(records, &SortState::desc("amount"))), vec![1, 3, 2]);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let records = vec![
            Record::new().set("id", 1i64).set("status", "success"),
            Record::new().set("id", 2i64).set("status", "failed"),
            Record::new().set("id", 3i64).set("status", "success"),
            Record::new().set("id", 4i64).set("status", "failed"),
        ];

        assert_eq!(ids(&sorted(records.clone(), &SortState::asc("status"))), vec![2, 4, 1, 3]);
        assert_eq!(ids(&sorted(records, &SortState::desc("status"))), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let records = vec![
            Record::new().set("id", 1i64).set("name", "cherry"),
            Record::new().set("id", 2i64).set("name", "Banana"),
            Record::new().set("id", 3i64).set("name", "apple"),
        ];

        assert_eq!(ids(&sorted(records, &SortState::asc("name"))), vec![3, 2, 1]);
    }

    #[test]
    fn test_mixed_values_compare_as_text() {
        assert_eq!(
            compare_values(Some(&Value::Long(10)), Some(&Value::from("9"))),
            Ordering::Less
        );
        assert_eq!(compare_values(None, Some(&Value::Null)), Ordering::Greater);
    }

    #[test]
    fn test_timestamps_sort_chronologically() {
        let early = Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            compare_values(Some(&Value::from(late)), Some(&Value::from(early))),
            Ordering::Greater
        );
    }

    #[test]
    fn test_collate() {
        assert_eq!(collate("a", "B"), Ordering::Less);
        assert_eq!(collate("b", "B"), Ordering::Less);
        assert_eq!(collate("Eray", "eray"), Ordering::Greater);
        assert_eq!(collate("same", "same"), Ordering::Equal);
        assert_eq!(collate("ab", "abc"), Ordering::Less);
    }

    #[test]
    fn test_nan_keeps_input_order() {
        let records = vec![
            Record::new().set("id", 1i64).set("score", f64::NAN),
            Record::new().set("id", 2i64).set("score", f64::NAN),
        ];
        assert_eq!(ids(&sorted(records, &SortState::asc("score"))), vec![1, 2]);
    }
}
