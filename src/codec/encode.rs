use std::collections::BTreeMap;

use crate::session::Backend;
use crate::types::{PgArg, PgValue, RangeValue};
use crate::Result;

/// Render a call argument for direct inclusion in SQL text.
///
/// Collections and maps have structural renderings; every scalar goes
/// through the backend's literal quoting, the single point where
/// injection safety is delegated to the driver.
pub fn encode_inline<B: Backend>(backend: &B, arg: &PgArg) -> Result<String> {
    match arg {
        PgArg::Literal(sql) => Ok(sql.clone()),
        PgArg::Tagged {
            wire_value: Some(wire),
            ..
        } => Ok(backend.quote_literal(&PgValue::Text(wire.clone()))),
        PgArg::Typed { value, .. }
        | PgArg::TypedArray { value, .. }
        | PgArg::Tagged { value, .. }
        | PgArg::Plain(value) => encode_inline_value(backend, value),
    }
}

fn encode_inline_value<B: Backend>(backend: &B, value: &PgValue) -> Result<String> {
    match value {
        PgValue::Array(items) => {
            let parts = items
                .iter()
                .map(|item| encode_inline_value(backend, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("ARRAY[{}]", parts.join(",")))
        }
        PgValue::Map(map) => Ok(format!("$${}$$::hstore", map_pairs(map))),
        other => Ok(backend.quote_literal(other)),
    }
}

/// Render a call argument as an out-of-band text-format parameter.
/// `None` is SQL NULL.
///
/// `type_name` is the classified target type, which drives the few
/// renderings that depend on it (`bytea` hex dumps, timestamp-range
/// bound normalization).
pub fn encode_parameter(arg: &PgArg, type_name: Option<&str>) -> Result<Option<String>> {
    match arg {
        PgArg::Literal(sql) => Ok(Some(sql.clone())),
        PgArg::Tagged {
            wire_value: Some(wire),
            ..
        } => Ok(Some(wire.clone())),
        PgArg::TypedArray { value, element_type } => {
            let full = format!("{element_type}[]");
            Ok(encode_parameter_value(value, Some(&full)))
        }
        PgArg::Typed { value, type_name } | PgArg::Tagged { value, type_name, .. } => {
            Ok(encode_parameter_value(value, Some(type_name)))
        }
        PgArg::Plain(value) => Ok(encode_parameter_value(value, type_name)),
    }
}

fn encode_parameter_value(value: &PgValue, type_name: Option<&str>) -> Option<String> {
    match value {
        PgValue::Null => None,
        PgValue::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        PgValue::Text(s) if type_name == Some("bytea") => Some(hex_dump(s.as_bytes())),
        PgValue::Text(s) => Some(s.clone()),
        PgValue::Bytes(bytes) => Some(hex_dump(bytes)),
        PgValue::Array(items) => {
            let parts = items
                .iter()
                .map(|item| {
                    encode_parameter_value(item, None).unwrap_or_else(|| "NULL".to_string())
                })
                .collect::<Vec<_>>();
            Some(format!("{{{}}}", parts.join(",")))
        }
        PgValue::Inet(addr) => Some(addr.to_string()),
        PgValue::Range(range) => Some(render_range(range, type_name)),
        PgValue::Map(map) => Some(map_pairs(map)),
        other => Some(wire_text(other)),
    }
}

fn hex_dump(bytes: &[u8]) -> String {
    format!("\\x{}", hex::encode_upper(bytes))
}

fn map_pairs(map: &BTreeMap<String, PgValue>) -> String {
    map.iter()
        .map(|(key, value)| format!("{key} => {}", wire_text(value)))
        .collect::<Vec<_>>()
        .join(",")
}

fn render_range(range: &RangeValue, type_name: Option<&str>) -> String {
    let close = if range.exclusive_upper { ')' } else { ']' };
    let normalize_utc = matches!(type_name, Some("tsrange") | Some("tstzrange"));
    format!(
        "[{},{}{close}",
        range_bound(&range.lower, normalize_utc),
        range_bound(&range.upper, normalize_utc)
    )
}

fn range_bound(bound: &PgValue, normalize_utc: bool) -> String {
    match bound {
        PgValue::Null => String::new(),
        // timestamp-range bounds travel as bare UTC timestamps
        PgValue::TimestampTz(ts) if normalize_utc => {
            ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.f").to_string()
        }
        other => wire_text(other),
    }
}

/// The bare text form of a value as it travels on the wire: no quoting,
/// no escaping.
pub fn wire_text(value: &PgValue) -> String {
    match value {
        PgValue::Null => "NULL".to_string(),
        PgValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        PgValue::Int(n) => n.to_string(),
        PgValue::Float(f) => f.to_string(),
        PgValue::Decimal(d) => d.to_string(),
        PgValue::Text(s) => s.clone(),
        PgValue::Bytes(bytes) => hex_dump(bytes),
        PgValue::Uuid(u) => u.to_string(),
        PgValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        PgValue::Time(t) => t.format("%H:%M:%S%.f").to_string(),
        PgValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        PgValue::TimestampTz(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f+00").to_string(),
        PgValue::Inet(addr) => addr.to_string(),
        PgValue::Range(range) => render_range(range, None),
        PgValue::Array(_) | PgValue::Map(_) => {
            encode_parameter_value(value, None).unwrap_or_else(|| "NULL".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StubBackend;
    use crate::types::InetValue;
    use chrono::NaiveDate;

    fn inline(arg: PgArg) -> String {
        encode_inline(&StubBackend::new(), &arg).unwrap()
    }

    fn parameter(arg: PgArg) -> Option<String> {
        let type_name = crate::types::type_resolution::type_name_for_arg(&arg).unwrap();
        encode_parameter(&arg, type_name.as_deref()).unwrap()
    }

    #[test]
    fn test_inline_array_of_integers() {
        let arg = PgArg::from(PgValue::Array(vec![PgValue::Int(99), PgValue::Int(100)]));
        assert_eq!(inline(arg), "ARRAY[99,100]");
    }

    #[test]
    fn test_parameter_array_of_integers() {
        let arg = PgArg::from(PgValue::Array(vec![PgValue::Int(99), PgValue::Int(100)]));
        assert_eq!(parameter(arg), Some("{99,100}".to_string()));
    }

    #[test]
    fn test_inline_map_is_dollar_quoted_hstore() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), PgValue::Int(1));
        map.insert("b".to_string(), PgValue::Text("foo".to_string()));
        assert_eq!(
            inline(PgValue::Map(map).into()),
            "$$a => 1,b => foo$$::hstore"
        );
    }

    #[test]
    fn test_parameter_map_is_bare_pairs() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), PgValue::Int(1));
        map.insert("b".to_string(), PgValue::Text("foo".to_string()));
        assert_eq!(
            parameter(PgValue::Map(map).into()),
            Some("a => 1,b => foo".to_string())
        );
    }

    #[test]
    fn test_inline_scalars_go_through_quoting() {
        assert_eq!(inline(PgArg::from("it's")), "'it''s'");
        assert_eq!(inline(PgArg::from(true)), "TRUE");
        assert_eq!(inline(PgArg::from(42)), "42");
    }

    #[test]
    fn test_literal_passes_through_both_modes() {
        assert_eq!(inline(PgArg::literal("now()")), "now()");
        assert_eq!(parameter(PgArg::literal("now()")), Some("now()".to_string()));
    }

    #[test]
    fn test_parameter_booleans_are_bare_words() {
        assert_eq!(parameter(PgArg::from(true)), Some("true".to_string()));
        assert_eq!(parameter(PgArg::from(false)), Some("false".to_string()));
    }

    #[test]
    fn test_parameter_bytes_hex_dump() {
        let arg = PgArg::from(PgValue::Bytes(vec![0xDE, 0xAD]));
        assert_eq!(parameter(arg), Some("\\xDEAD".to_string()));
    }

    #[test]
    fn test_parameter_string_forced_to_bytea() {
        let arg = PgArg::typed("AB", "bytea");
        assert_eq!(parameter(arg), Some("\\x4142".to_string()));
    }

    #[test]
    fn test_parameter_network_address_cidr_notation() {
        let arg = PgArg::from(PgValue::Inet(InetValue::parse("1.2.3.4/32").unwrap()));
        assert_eq!(parameter(arg), Some("1.2.3.4/32".to_string()));
    }

    #[test]
    fn test_parameter_ranges() {
        let arg = PgArg::from(PgValue::from(RangeValue::exclusive(1, 10)));
        assert_eq!(parameter(arg), Some("[1,10)".to_string()));

        let arg = PgArg::from(PgValue::from(RangeValue::inclusive(1, 10)));
        assert_eq!(parameter(arg), Some("[1,10]".to_string()));
    }

    #[test]
    fn test_timestamp_range_bounds_are_bare_utc() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let end = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let arg = PgArg::from(PgValue::from(RangeValue::exclusive(start, end)));
        assert_eq!(
            parameter(arg),
            Some("[2024-03-01 12:00:00,2024-03-02 12:00:00)".to_string())
        );
    }

    #[test]
    fn test_tagged_wire_value_substitutes() {
        let arg = PgArg::tagged("ignored", "ltree", Some("a.b.c".to_string()));
        assert_eq!(parameter(arg.clone()), Some("a.b.c".to_string()));
        assert_eq!(inline(arg), "'a.b.c'");
    }

    #[test]
    fn test_null_parameter_is_sql_null() {
        assert_eq!(parameter(PgArg::from(PgValue::Null)), None);
    }

    #[test]
    fn test_array_with_null_element() {
        let arg = PgArg::from(PgValue::Array(vec![PgValue::Int(1), PgValue::Null]));
        assert_eq!(parameter(arg), Some("{1,NULL}".to_string()));
    }

    #[test]
    fn test_nested_array_encodes_in_both_modes() {
        let nested = PgValue::Array(vec![
            PgValue::Array(vec![PgValue::Int(1), PgValue::Int(2)]),
            PgValue::Array(vec![PgValue::Int(3), PgValue::Int(4)]),
        ]);
        assert_eq!(inline(nested.clone().into()), "ARRAY[ARRAY[1,2],ARRAY[3,4]]");
        assert_eq!(
            parameter(nested.into()),
            Some("{{1,2},{3,4}}".to_string())
        );
    }
}
