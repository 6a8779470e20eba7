use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar contents of a single cell, as reported or accepted by a workbook
/// backend.
///
/// `Empty` stands for a blank cell; backends return it for ranges nothing has
/// written to yet.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Empty,
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Boolean(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::DateTime(dt) => write!(f, "{dt}"),
            CellValue::Empty => write!(f, ""),
        }
    }
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the value, when one exists.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Int(i) => *i != 0,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Boolean(b) => *b,
            CellValue::Date(_) | CellValue::DateTime(_) => true,
            CellValue::Empty => false,
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}
impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}
impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Boolean(v)
    }
}
impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}
impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}
impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(v)
    }
}
impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::DateTime(v)
    }
}

/// A value crossing the call boundary: a scalar cell value, an ordered
/// sequence, or a string-keyed mapping.
///
/// Text is a scalar by construction (`Datum::Cell(CellValue::Text)`), so the
/// "a string is not a collection" rule needs no special casing downstream.
/// Nested `List`s represent row-major rows.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Cell(CellValue),
    List(Vec<Datum>),
    Map(BTreeMap<String, Datum>),
}

impl Datum {
    pub fn empty() -> Self {
        Datum::Cell(CellValue::Empty)
    }

    /// Lists and maps are collections; every `Cell` (text included) is not.
    pub fn is_collection(&self) -> bool {
        matches!(self, Datum::List(_) | Datum::Map(_))
    }

    pub fn as_cell(&self) -> Option<&CellValue> {
        match self {
            Datum::Cell(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Datum]> {
        match self {
            Datum::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short noun for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Datum::Cell(CellValue::Text(_)) => "text",
            Datum::Cell(_) => "cell",
            Datum::List(_) => "list",
            Datum::Map(_) => "map",
        }
    }

    /// Row-major rows, e.g. `Datum::rows(vec![vec![1.into(), 2.into()]])`.
    pub fn rows(rows: Vec<Vec<Datum>>) -> Self {
        Datum::List(rows.into_iter().map(Datum::List).collect())
    }
}

impl From<CellValue> for Datum {
    fn from(v: CellValue) -> Self {
        Datum::Cell(v)
    }
}
impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Cell(CellValue::Int(v))
    }
}
impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Cell(CellValue::Number(v))
    }
}
impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Cell(CellValue::Boolean(v))
    }
}
impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Cell(CellValue::Text(v.to_string()))
    }
}
impl From<String> for Datum {
    fn from(v: String) -> Self {
        Datum::Cell(CellValue::Text(v))
    }
}
impl From<NaiveDate> for Datum {
    fn from(v: NaiveDate) -> Self {
        Datum::Cell(CellValue::Date(v))
    }
}
impl From<NaiveDateTime> for Datum {
    fn from(v: NaiveDateTime) -> Self {
        Datum::Cell(CellValue::DateTime(v))
    }
}

impl From<Vec<Datum>> for Datum {
    fn from(items: Vec<Datum>) -> Self {
        Datum::List(items)
    }
}

impl From<BTreeMap<String, Datum>> for Datum {
    fn from(map: BTreeMap<String, Datum>) -> Self {
        Datum::Map(map)
    }
}

impl FromIterator<Datum> for Datum {
    fn from_iter<I: IntoIterator<Item = Datum>>(iter: I) -> Self {
        Datum::List(iter.into_iter().collect())
    }
}

#[cfg(feature = "json")]
mod json {
    use super::{CellValue, Datum};
    use serde_json::{Map as JsonMap, Number, Value as JsonValue};

    impl From<JsonValue> for Datum {
        fn from(value: JsonValue) -> Self {
            match value {
                JsonValue::Null => Datum::Cell(CellValue::Empty),
                JsonValue::Bool(b) => Datum::Cell(CellValue::Boolean(b)),
                JsonValue::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Datum::Cell(CellValue::Int(i))
                    } else {
                        Datum::Cell(CellValue::Number(n.as_f64().unwrap_or(f64::NAN)))
                    }
                }
                JsonValue::String(s) => Datum::Cell(CellValue::Text(s)),
                JsonValue::Array(items) => {
                    Datum::List(items.into_iter().map(Datum::from).collect())
                }
                JsonValue::Object(map) => Datum::Map(
                    map.into_iter().map(|(k, v)| (k, Datum::from(v))).collect(),
                ),
            }
        }
    }

    impl From<Datum> for JsonValue {
        fn from(value: Datum) -> Self {
            match value {
                Datum::Cell(CellValue::Int(i)) => JsonValue::Number(i.into()),
                Datum::Cell(CellValue::Number(n)) => Number::from_f64(n)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null),
                Datum::Cell(CellValue::Text(s)) => JsonValue::String(s),
                Datum::Cell(CellValue::Boolean(b)) => JsonValue::Bool(b),
                // Dates have no JSON scalar; render ISO-8601 text.
                Datum::Cell(CellValue::Date(d)) => JsonValue::String(d.to_string()),
                Datum::Cell(CellValue::DateTime(dt)) => JsonValue::String(dt.to_string()),
                Datum::Cell(CellValue::Empty) => JsonValue::Null,
                Datum::List(items) => {
                    JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
                }
                Datum::Map(map) => JsonValue::Object(
                    map.into_iter()
                        .map(|(k, v)| (k, JsonValue::from(v)))
                        .collect::<JsonMap<_, _>>(),
                ),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde_json::json;

        #[test]
        fn json_round_trip_preserves_structure() {
            let datum = Datum::from(json!({"a": [1, 2.5, "x", null], "b": true}));
            match &datum {
                Datum::Map(map) => {
                    assert_eq!(map.len(), 2);
                    assert_eq!(
                        map["a"],
                        Datum::List(vec![
                            Datum::Cell(CellValue::Int(1)),
                            Datum::Cell(CellValue::Number(2.5)),
                            Datum::Cell(CellValue::Text("x".into())),
                            Datum::Cell(CellValue::Empty),
                        ])
                    );
                }
                other => panic!("expected map, got {other:?}"),
            }
            assert_eq!(
                JsonValue::from(datum),
                json!({"a": [1, 2.5, "x", null], "b": true})
            );
        }
    }
}
