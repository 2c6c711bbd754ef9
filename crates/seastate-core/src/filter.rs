// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Predicate filter over keyed records.
//!
//! A record matches when every constraint key is present on it (or on its
//! `sub_level` mapping) and the field is exactly equal to the constraint
//! value. Missing keys exclude the record; nothing here fails.

use serde_json::{Map, Number, Value};

use crate::model::{ResultSeries, SeaStatePoint, SeriesMeta};

/// Borrowed scalar view of a record field.
///
/// Equality is exact: text never equals a number, and numbers compare with no
/// tolerance. Two JSON numbers compare as integers when both are integers, so
/// ids beyond 2^53 stay distinct.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    /// String field (enumerations compare by their wire spelling).
    Text(&'a str),
    /// Numeric field of a typed record.
    Number(f64),
    /// Numeric field of a JSON record.
    JsonNumber(&'a Number),
    /// Boolean field.
    Bool(bool),
    /// Explicit null.
    Null,
    /// Arrays and objects, compared structurally.
    Json(&'a Value),
}

impl<'a> FieldValue<'a> {
    /// View a JSON value as a field value.
    pub fn from_json(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Number(n) => Self::JsonNumber(n),
            Value::Bool(b) => Self::Bool(*b),
            Value::Null => Self::Null,
            Value::Array(_) | Value::Object(_) => Self::Json(value),
        }
    }
}

fn same_number(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    // a negative integer never equals one above i64::MAX
    (a.is_f64() || b.is_f64()) && a.as_f64() == b.as_f64()
}

impl PartialEq for FieldValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::JsonNumber(a), Self::JsonNumber(b)) => same_number(a, b),
            (Self::JsonNumber(n), Self::Number(f)) | (Self::Number(f), Self::JsonNumber(n)) => {
                n.as_f64() == Some(*f)
            }
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Json(a), Self::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Keyed access to the fields of a record.
pub trait Fields {
    /// Scalar field named `key`, if present.
    fn field(&self, key: &str) -> Option<FieldValue<'_>>;

    /// Nested mapping named `key`, if present.
    fn nested(&self, key: &str) -> Option<&dyn Fields>;
}

/// A single constraint: field name and required value.
pub type Constraint<'a> = (&'a str, FieldValue<'a>);

/// Outcome of a lookup that is expected to hit at most one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Matches<'r, R> {
    /// No record matched.
    Zero,
    /// Exactly one record matched, at the given index.
    One(usize, &'r R),
    /// Several records matched; indices in input order.
    Many(Vec<(usize, &'r R)>),
}

impl<'r, R> Matches<'r, R> {
    fn from_hits(mut hits: Vec<(usize, &'r R)>) -> Self {
        match hits.len() {
            0 => Self::Zero,
            1 => {
                let (idx, record) = hits.remove(0);
                Self::One(idx, record)
            }
            _ => Self::Many(hits),
        }
    }

    /// Index of the unique match, if there is exactly one.
    pub fn single_index(&self) -> Option<usize> {
        match self {
            Self::One(idx, _) => Some(*idx),
            Self::Zero | Self::Many(_) => None,
        }
    }
}

fn satisfies(record: &dyn Fields, constraints: &[Constraint<'_>]) -> bool {
    constraints
        .iter()
        .all(|(key, expected)| record.field(key).is_some_and(|actual| actual == *expected))
}

/// Every record satisfying all `constraints`, with its index, in input order.
///
/// With `sub_level`, the constraints are tested against that nested mapping
/// and records without it are excluded. An empty constraint list keeps every
/// record that has the `sub_level` mapping (or every record without one).
pub fn filter_records<'r, R: Fields>(
    records: &'r [R],
    constraints: &[Constraint<'_>],
    sub_level: Option<&str>,
) -> Vec<(usize, &'r R)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            let target: Option<&dyn Fields> = match sub_level {
                Some(level) => record.nested(level),
                None => Some(*record),
            };
            target.is_some_and(|t| satisfies(t, constraints))
        })
        .collect()
}

/// [`filter_records`] classified as zero, one or many matches.
pub fn find<'r, R: Fields>(
    records: &'r [R],
    constraints: &[Constraint<'_>],
    sub_level: Option<&str>,
) -> Matches<'r, R> {
    Matches::from_hits(filter_records(records, constraints, sub_level))
}

impl Fields for SeriesMeta {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            "location" => Some(FieldValue::Text(self.location.as_str())),
            "result_type" => Some(FieldValue::Text(self.result_type.as_str())),
            "unit" => Some(FieldValue::Text(self.unit.as_str())),
            _ => None,
        }
    }

    fn nested(&self, _key: &str) -> Option<&dyn Fields> {
        None
    }
}

impl Fields for ResultSeries {
    fn field(&self, _key: &str) -> Option<FieldValue<'_>> {
        None
    }

    fn nested(&self, key: &str) -> Option<&dyn Fields> {
        match key {
            "meta" => Some(&self.meta),
            _ => None,
        }
    }
}

impl Fields for SeaStatePoint {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            "hs" => Some(FieldValue::Number(self.hs)),
            "tp" => Some(FieldValue::Number(self.tp)),
            _ => None,
        }
    }

    fn nested(&self, _key: &str) -> Option<&dyn Fields> {
        None
    }
}

impl Fields for Map<String, Value> {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.get(key).map(FieldValue::from_json)
    }

    fn nested(&self, key: &str) -> Option<&dyn Fields> {
        self.get(key)
            .and_then(Value::as_object)
            .map(|m| m as &dyn Fields)
    }
}

impl Fields for Value {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.as_object().and_then(|m| m.field(key))
    }

    fn nested(&self, key: &str) -> Option<&dyn Fields> {
        self.as_object().and_then(|m| m.nested(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"p1": 1, "p2": 2, "p3": 3}),
            json!({"p1": 2, "p2": 3, "p3": 4, "p6": 6}),
            json!({"p1": 3, "p2": 4, "p3": 5}),
        ]
    }

    fn values<'r>(hits: &[(usize, &'r Value)]) -> Vec<&'r Value> {
        hits.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn single_constraint() {
        let rows = rows();
        let hits = filter_records(&rows, &[("p1", 2.0.into())], None);
        assert_eq!(values(&hits), vec![&rows[1]]);
        assert_eq!(hits[0].0, 1);
    }

    #[test]
    fn no_value_match_is_empty() {
        let rows = rows();
        assert!(filter_records(&rows, &[("p1", 6.0.into())], None).is_empty());
    }

    #[test]
    fn absent_key_excludes_without_error() {
        let rows = rows();
        assert!(filter_records(&rows, &[("p7", 2.0.into())], None).is_empty());
    }

    #[test]
    fn all_constraints_must_hold() {
        let rows = rows();
        let hits = filter_records(&rows, &[("p6", 6.0.into()), ("p1", 2.0.into())], None);
        assert_eq!(values(&hits), vec![&rows[1]]);
    }

    #[test]
    fn empty_constraints_are_identity() {
        let rows = rows();
        let hits = filter_records(&rows, &[], None);
        assert_eq!(values(&hits), rows.iter().collect::<Vec<_>>());
    }

    #[test]
    fn sub_level_scopes_the_test() {
        let rows = vec![
            json!({"meta": {"m1": 10, "m2": 11}, "p1": 1}),
            json!({"meta": {"m1": 11, "m2": 12, "m3": 14}, "p1": 2, "p6": 6}),
            json!({"meta": {"m1": 12, "m2": 13}, "p1": 3}),
            json!({"p1": 4}),
        ];
        let hits = filter_records(&rows, &[("m1", 11.0.into()), ("m2", 12.0.into())], Some("meta"));
        assert_eq!(values(&hits), vec![&rows[1]]);
        // a record without the sub-level mapping never matches
        let all = filter_records(&rows, &[], Some("meta"));
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn no_type_coercion() {
        let rows = vec![json!({"k": "1"}), json!({"k": 1})];
        let hits = filter_records(&rows, &[("k", FieldValue::Text("1"))], None);
        assert_eq!(values(&hits), vec![&rows[0]]);
    }

    #[test]
    fn large_integers_stay_distinct() {
        let ids = vec![
            json!({"k": 9_007_199_254_740_992_u64}),
            json!({"k": 9_007_199_254_740_993_u64}),
        ];
        let wanted = json!(9_007_199_254_740_993_u64);
        let hits = filter_records(&ids, &[("k", FieldValue::from_json(&wanted))], None);
        assert_eq!(values(&hits), vec![&ids[1]]);
        // integer and float spellings of the same number agree
        let rows = rows();
        let two = json!(2.0);
        let hits = filter_records(&rows, &[("p1", FieldValue::from_json(&two))], None);
        assert_eq!(values(&hits), vec![&rows[1]]);
    }

    #[test]
    fn classification() {
        let rows = vec![json!({"k": "a"}), json!({"k": "b"}), json!({"k": "b"})];
        assert_eq!(find(&rows, &[("k", "z".into())], None), Matches::Zero);
        assert_eq!(
            find(&rows, &[("k", "a".into())], None),
            Matches::One(0, &rows[0])
        );
        assert_eq!(
            find(&rows, &[("k", "b".into())], None),
            Matches::Many(vec![(1, &rows[1]), (2, &rows[2])])
        );
    }

    #[test]
    fn input_is_untouched() {
        let rows = rows();
        let before = rows.clone();
        let _ = filter_records(&rows, &[("p1", 3.0.into())], None);
        assert_eq!(rows, before);
    }
}
