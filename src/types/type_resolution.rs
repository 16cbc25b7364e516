use crate::types::{PgArg, PgValue, RangeValue};
use crate::{PgCallError, Result};

/// Derive the target database type name for a call argument.
///
/// Wrapper tags win over the built-in table; `Literal` arguments bypass
/// typing entirely and yield `None`.
pub fn type_name_for_arg(arg: &PgArg) -> Result<Option<String>> {
    match arg {
        PgArg::Literal(_) => Ok(None),
        PgArg::TypedArray { element_type, .. } => Ok(Some(format!("{element_type}[]"))),
        PgArg::Typed { type_name, .. } => Ok(Some(type_name.clone())),
        PgArg::Tagged { type_name, .. } => Ok(Some(type_name.clone())),
        PgArg::Plain(value) => type_name_for_value(value).map(Some),
    }
}

/// The built-in native-to-SQL type table, applied when no wrapper forces a
/// type. Anything unrecognized defaults to `text`.
pub fn type_name_for_value(value: &PgValue) -> Result<String> {
    let name = match value {
        PgValue::Bool(_) => "bool".to_string(),
        PgValue::Int(_) => "int4".to_string(),
        PgValue::Float(_) => "float4".to_string(),
        PgValue::Decimal(_) => "numeric".to_string(),
        PgValue::Bytes(_) => "bytea".to_string(),
        PgValue::Uuid(_) => "uuid".to_string(),
        PgValue::Date(_) => "date".to_string(),
        PgValue::Time(_) => "time".to_string(),
        PgValue::Timestamp(_) => "timestamp".to_string(),
        PgValue::TimestampTz(_) => "timestamptz".to_string(),
        PgValue::Map(_) => "hstore".to_string(),
        PgValue::Inet(addr) => {
            if addr.is_host() {
                "inet".to_string()
            } else {
                "cidr".to_string()
            }
        }
        PgValue::Range(range) => range_type_name(range)?.to_string(),
        PgValue::Array(items) => {
            let first = items.first().ok_or(PgCallError::AmbiguousType)?;
            format!("{}[]", type_name_for_value(first)?)
        }
        PgValue::Null | PgValue::Text(_) => "text".to_string(),
    };
    Ok(name)
}

// The range type is chosen by inspecting the upper bound.
fn range_type_name(range: &RangeValue) -> Result<&'static str> {
    match &range.upper {
        PgValue::Int(n) if *n <= i32::MAX as i64 => Ok("int4range"),
        PgValue::Int(_) => Ok("int8range"),
        PgValue::Float(_) | PgValue::Decimal(_) => Ok("numrange"),
        PgValue::Date(_) => Ok("daterange"),
        PgValue::Timestamp(_) | PgValue::TimestampTz(_) => Ok("tsrange"),
        other => Err(PgCallError::UnsupportedType(format!(
            "range with {other:?} upper bound"
        ))),
    }
}
