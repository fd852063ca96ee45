//! Dynamic table record

use std::collections::BTreeMap;

use super::Value;

/// Name of the field that uniquely identifies a record.
///
/// Only used for keying rows (row lookup, stable UI identity), never for
/// filtering or sorting decisions.
pub const ID_FIELD: &str = "id";

/// A single row of data.
///
/// Records hold field values as a map from field name to [`Value`], so any
/// record shape can flow through the same filters, sorts and exports. The
/// engine only ever reads records.
///
/// # Example
///
/// ```
/// use tablekit_lib::model::{Record, Value};
///
/// let record = Record::new()
///     .set("id", 1i64)
///     .set("name", "Cagatay")
///     .set("amount", 250.5);
///
/// assert_eq!(record.resolve("name"), Some(&Value::from("Cagatay")));
/// assert_eq!(record.resolve("surname"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// The field values.
    pub(crate) fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record identifier, if the record has one.
    pub fn id(&self) -> Option<&Value> {
        self.fields.get(ID_FIELD)
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Resolves a field key to its raw value.
    ///
    /// The key is looked up directly first. If there is no such field and the
    /// key is a dotted path (`customer.name`, `items.0.sku`), each segment
    /// is resolved through nested records, with numeric segments indexing
    /// into record lists. Missing fields resolve to `None`; this is never an
    /// error.
    pub fn resolve(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(key) {
            return Some(value);
        }

        let (head, rest) = key.split_once('.')?;
        match self.fields.get(head)? {
            Value::Record(nested) => nested.resolve(rest),
            Value::Records(list) => {
                let (index, rest) = rest.split_once('.')?;
                list.get(index.parse::<usize>().ok()?)?.resolve(rest)
            }
            _ => None,
        }
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_direct_field() {
        let record = Record::new().set("amount", 100i64);
        assert_eq!(record.resolve("amount"), Some(&Value::Long(100)));
        assert_eq!(record.resolve("missing"), None);
    }

    #[test]
    fn test_resolve_nested_path() {
        let user = Record::new()
            .set("firstName", "Cagatay")
            .set("lastName", "Doe");
        let record = Record::new().set("id", 1i64).set("user", user);

        assert_eq!(
            record.resolve("user.firstName"),
            Some(&Value::from("Cagatay"))
        );
        assert_eq!(record.resolve("user.middleName"), None);
        assert_eq!(record.resolve("id.value"), None);
    }

    #[test]
    fn test_resolve_into_record_list() {
        let items = vec![
            Record::new().set("sku", "A-1"),
            Record::new().set("sku", "B-2"),
        ];
        let record = Record::new().set("items", Value::Records(items));

        assert_eq!(record.resolve("items.1.sku"), Some(&Value::from("B-2")));
        assert_eq!(record.resolve("items.5.sku"), None);
        assert_eq!(record.resolve("items.first.sku"), None);
    }

    #[test]
    fn test_direct_key_wins_over_path() {
        let record = Record::new()
            .set("user.name", "flat")
            .set("user", Record::new().set("name", "nested"));
        assert_eq!(record.resolve("user.name"), Some(&Value::from("flat")));
    }

    #[test]
    fn test_id() {
        let record: Record = [("id", Value::from("pay_1")), ("name", Value::from("Eray"))]
            .into_iter()
            .collect();
        assert_eq!(record.id(), Some(&Value::from("pay_1")));
        assert_eq!(Record::new().id(), None);
    }
}
