use chrono::NaiveTime;
use uuid::Uuid;

use crate::types::PgValue;

/// Call-argument wrapper controlling how a value is classified and encoded.
///
/// Most arguments are `Plain` and classify through the built-in rules. The
/// other variants override classification where the default is ambiguous
/// (an empty array), wrong (`interval` for a plain string), or impossible
/// (a raw SQL fragment).
#[derive(Debug, Clone, PartialEq)]
pub enum PgArg {
    /// Classified and encoded by the built-in rules.
    Plain(PgValue),

    /// Forces the target type name.
    Typed { value: PgValue, type_name: String },

    /// Forces the element type of a collection. Required for empty arrays,
    /// whose element type cannot be inferred.
    TypedArray { value: PgValue, element_type: String },

    /// Pre-formatted SQL spliced verbatim, bypassing classification and
    /// encoding entirely.
    Literal(String),

    /// A value carrying an explicit type tag and an optional pre-rendered
    /// wire form, for types the codec does not natively understand.
    Tagged {
        value: PgValue,
        type_name: String,
        wire_value: Option<String>,
    },
}

impl PgArg {
    pub fn typed(value: impl Into<PgValue>, type_name: &str) -> Self {
        PgArg::Typed {
            value: value.into(),
            type_name: type_name.to_string(),
        }
    }

    pub fn typed_array(elements: Vec<PgValue>, element_type: &str) -> Self {
        PgArg::TypedArray {
            value: PgValue::Array(elements),
            element_type: element_type.to_string(),
        }
    }

    pub fn literal(sql: &str) -> Self {
        PgArg::Literal(sql.to_string())
    }

    pub fn tagged(value: impl Into<PgValue>, type_name: &str, wire_value: Option<String>) -> Self {
        PgArg::Tagged {
            value: value.into(),
            type_name: type_name.to_string(),
            wire_value,
        }
    }

    /// A `time` argument.
    pub fn time(value: NaiveTime) -> Self {
        Self::typed(value, "time")
    }

    /// An `interval` argument from its text form, e.g. `"1 day"`.
    pub fn interval(spec: &str) -> Self {
        Self::typed(spec, "interval")
    }

    /// A `uuid` argument.
    pub fn uuid(value: Uuid) -> Self {
        Self::typed(value, "uuid")
    }
}

impl From<PgValue> for PgArg {
    fn from(value: PgValue) -> Self {
        PgArg::Plain(value)
    }
}

impl From<bool> for PgArg {
    fn from(v: bool) -> Self {
        PgArg::Plain(v.into())
    }
}

impl From<i32> for PgArg {
    fn from(v: i32) -> Self {
        PgArg::Plain(v.into())
    }
}

impl From<i64> for PgArg {
    fn from(v: i64) -> Self {
        PgArg::Plain(v.into())
    }
}

impl From<f64> for PgArg {
    fn from(v: f64) -> Self {
        PgArg::Plain(v.into())
    }
}

impl From<&str> for PgArg {
    fn from(v: &str) -> Self {
        PgArg::Plain(v.into())
    }
}

impl From<String> for PgArg {
    fn from(v: String) -> Self {
        PgArg::Plain(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_tag_helpers() {
        assert_eq!(
            PgArg::interval("1 day"),
            PgArg::Typed {
                value: PgValue::Text("1 day".to_string()),
                type_name: "interval".to_string(),
            }
        );

        let t = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(
            PgArg::time(t),
            PgArg::Typed {
                value: PgValue::Time(t),
                type_name: "time".to_string(),
            }
        );
    }

    #[test]
    fn test_plain_from_scalars() {
        assert_eq!(PgArg::from(7), PgArg::Plain(PgValue::Int(7)));
        assert_eq!(PgArg::from("x"), PgArg::Plain(PgValue::Text("x".to_string())));
    }
}
