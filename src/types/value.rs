use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::types::{InetValue, RangeValue};

/// The dynamic value model passed to and returned from database functions.
///
/// Result columns decode into the variant matching their reported type;
/// arguments classify into a target type name from their variant (see
/// `types::type_resolution`).
#[derive(Debug, Clone, PartialEq)]
pub enum PgValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Inet(InetValue),
    Range(Box<RangeValue>),
    Array(Vec<PgValue>),
    Map(BTreeMap<String, PgValue>),
}

impl PgValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PgValue::Null)
    }
}

impl From<bool> for PgValue {
    fn from(v: bool) -> Self {
        PgValue::Bool(v)
    }
}

impl From<i16> for PgValue {
    fn from(v: i16) -> Self {
        PgValue::Int(v as i64)
    }
}

impl From<i32> for PgValue {
    fn from(v: i32) -> Self {
        PgValue::Int(v as i64)
    }
}

impl From<i64> for PgValue {
    fn from(v: i64) -> Self {
        PgValue::Int(v)
    }
}

impl From<f32> for PgValue {
    fn from(v: f32) -> Self {
        PgValue::Float(v as f64)
    }
}

impl From<f64> for PgValue {
    fn from(v: f64) -> Self {
        PgValue::Float(v)
    }
}

impl From<Decimal> for PgValue {
    fn from(v: Decimal) -> Self {
        PgValue::Decimal(v)
    }
}

impl From<&str> for PgValue {
    fn from(v: &str) -> Self {
        PgValue::Text(v.to_string())
    }
}

impl From<String> for PgValue {
    fn from(v: String) -> Self {
        PgValue::Text(v)
    }
}

impl From<Vec<u8>> for PgValue {
    fn from(v: Vec<u8>) -> Self {
        PgValue::Bytes(v)
    }
}

impl From<Uuid> for PgValue {
    fn from(v: Uuid) -> Self {
        PgValue::Uuid(v)
    }
}

impl From<NaiveDate> for PgValue {
    fn from(v: NaiveDate) -> Self {
        PgValue::Date(v)
    }
}

impl From<NaiveTime> for PgValue {
    fn from(v: NaiveTime) -> Self {
        PgValue::Time(v)
    }
}

impl From<NaiveDateTime> for PgValue {
    fn from(v: NaiveDateTime) -> Self {
        PgValue::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for PgValue {
    fn from(v: DateTime<Utc>) -> Self {
        PgValue::TimestampTz(v)
    }
}

impl From<InetValue> for PgValue {
    fn from(v: InetValue) -> Self {
        PgValue::Inet(v)
    }
}

impl From<RangeValue> for PgValue {
    fn from(v: RangeValue) -> Self {
        PgValue::Range(Box::new(v))
    }
}

impl From<Vec<PgValue>> for PgValue {
    fn from(v: Vec<PgValue>) -> Self {
        PgValue::Array(v)
    }
}

impl From<BTreeMap<String, PgValue>> for PgValue {
    fn from(v: BTreeMap<String, PgValue>) -> Self {
        PgValue::Map(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(PgValue::from(42i32), PgValue::Int(42));
        assert_eq!(PgValue::from("abc"), PgValue::Text("abc".to_string()));
        assert_eq!(PgValue::from(true), PgValue::Bool(true));
        assert!(PgValue::Null.is_null());
        assert!(!PgValue::Int(0).is_null());
    }

    #[test]
    fn test_byte_and_array_conversions_stay_distinct() {
        assert_eq!(PgValue::from(vec![1u8, 2u8]), PgValue::Bytes(vec![1, 2]));
        assert_eq!(
            PgValue::from(vec![PgValue::Int(1)]),
            PgValue::Array(vec![PgValue::Int(1)])
        );
    }
}
