use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::catalog::{TypeCatalog, TypeCategory, TypeDescriptor};
use crate::types::{InetValue, PgValue, RangeValue};
use crate::{Oid, PgCallError, Result};

/// Convert one result cell to its native representation.
///
/// The reported OID must resolve through the catalog; a miss is an error
/// rather than a silent fall-back to raw text, since an unresolvable OID
/// means the shape of the data is genuinely unknown.
pub fn decode(raw: Option<&str>, oid: Oid, catalog: &TypeCatalog) -> Result<PgValue> {
    let Some(raw) = raw else {
        return Ok(PgValue::Null);
    };
    let descriptor = catalog
        .resolve_oid(oid)
        .ok_or_else(|| PgCallError::UnknownType(format!("oid {oid}")))?
        .clone();
    decode_with(raw, &descriptor, catalog)
}

/// Convert wire text through a specific type descriptor.
pub fn decode_with(raw: &str, descriptor: &TypeDescriptor, catalog: &TypeCatalog) -> Result<PgValue> {
    // name-specific codecs first, then the category fallbacks
    match descriptor.name.as_str() {
        "bytea" => return decode_bytea(raw),
        "uuid" => {
            return Uuid::parse_str(raw)
                .map(PgValue::Uuid)
                .map_err(|_| conversion("uuid", raw));
        }
        "hstore" => return decode_hstore(raw),
        "int4range" | "int8range" => return decode_range(raw, BoundKind::Int),
        "numrange" => return decode_range(raw, BoundKind::Decimal),
        "daterange" => return decode_range(raw, BoundKind::Date),
        "tsrange" => return decode_range(raw, BoundKind::Timestamp),
        "tstzrange" => return decode_range(raw, BoundKind::TimestampTz),
        _ => {}
    }

    match descriptor.category {
        TypeCategory::Array => decode_array(raw, descriptor, catalog),
        TypeCategory::Boolean => decode_bool(raw),
        TypeCategory::Numeric => decode_numeric(raw, &descriptor.name),
        TypeCategory::DateTime => decode_datetime(raw, &descriptor.name),
        TypeCategory::NetworkAddress => decode_network(raw, &descriptor.name),
        // interval, enum, composite, geometric, bit strings and anything
        // else without a richer native form stay textual
        _ => Ok(PgValue::Text(raw.to_string())),
    }
}

fn conversion(type_name: &str, raw: &str) -> PgCallError {
    PgCallError::TypeConversion(format!("invalid {type_name} value: {raw}"))
}

fn decode_bool(raw: &str) -> Result<PgValue> {
    match raw {
        "t" | "true" => Ok(PgValue::Bool(true)),
        "f" | "false" => Ok(PgValue::Bool(false)),
        _ => Err(conversion("bool", raw)),
    }
}

fn decode_bytea(raw: &str) -> Result<PgValue> {
    let hex_digits = raw
        .strip_prefix("\\x")
        .ok_or_else(|| conversion("bytea", raw))?;
    hex::decode(hex_digits)
        .map(PgValue::Bytes)
        .map_err(|_| conversion("bytea", raw))
}

fn decode_numeric(raw: &str, name: &str) -> Result<PgValue> {
    match name {
        "int2" | "int4" | "int8" | "oid" => raw
            .parse::<i64>()
            .map(PgValue::Int)
            .map_err(|_| conversion(name, raw)),
        "float4" | "float8" => raw
            .parse::<f64>()
            .map(PgValue::Float)
            .map_err(|_| conversion(name, raw)),
        "numeric" => raw
            .parse::<Decimal>()
            .map(PgValue::Decimal)
            .map_err(|_| conversion(name, raw)),
        // money and friends keep their formatted text
        _ => Ok(PgValue::Text(raw.to_string())),
    }
}

fn decode_datetime(raw: &str, name: &str) -> Result<PgValue> {
    match name {
        "date" => parse_date(raw).map(PgValue::Date),
        "time" => NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .map(PgValue::Time)
            .map_err(|_| conversion(name, raw)),
        "timestamp" => parse_timestamp(raw).map(PgValue::Timestamp),
        "timestamptz" => parse_timestamptz(raw).map(PgValue::TimestampTz),
        // timetz and the rest have no native counterpart
        _ => Ok(PgValue::Text(raw.to_string())),
    }
}

fn decode_network(raw: &str, name: &str) -> Result<PgValue> {
    match name {
        "inet" | "cidr" => InetValue::parse(raw).map(PgValue::Inet),
        // macaddr / macaddr8
        _ => Ok(PgValue::Text(raw.to_string())),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| conversion("date", raw))
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|_| conversion("timestamp", raw))
}

fn parse_timestamptz(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(ts.with_timezone(&Utc));
    }
    // bare "+00"-less output is treated as UTC
    parse_timestamp(raw.trim_end_matches("+00"))
        .map(|naive| naive.and_utc())
        .map_err(|_| conversion("timestamptz", raw))
}

static HSTORE_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""((?:[^"\\]|\\.)*)"\s*=>\s*(?:"((?:[^"\\]|\\.)*)"|(NULL))|([^\s=,"]+)\s*=>\s*([^,]*)"#,
    )
    .unwrap()
});

// Accepts both the server's quoted output ("a"=>"1") and the bare pair
// form this crate emits (a => 1).
fn decode_hstore(raw: &str) -> Result<PgValue> {
    let mut map = BTreeMap::new();
    for captures in HSTORE_PAIR_RE.captures_iter(raw) {
        if let Some(key) = captures.get(1) {
            let value = match (captures.get(2), captures.get(3)) {
                (Some(quoted), _) => PgValue::Text(unescape_hstore(quoted.as_str())),
                (None, Some(_)) => PgValue::Null,
                (None, None) => return Err(conversion("hstore", raw)),
            };
            map.insert(unescape_hstore(key.as_str()), value);
        } else if let (Some(key), Some(value)) = (captures.get(4), captures.get(5)) {
            let text = value.as_str().trim();
            let value = if text == "NULL" {
                PgValue::Null
            } else {
                PgValue::Text(text.to_string())
            };
            map.insert(key.as_str().to_string(), value);
        }
    }
    Ok(PgValue::Map(map))
}

fn unescape_hstore(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn decode_array(raw: &str, descriptor: &TypeDescriptor, catalog: &TypeCatalog) -> Result<PgValue> {
    let element_oid = descriptor.element_type_oid.ok_or_else(|| {
        PgCallError::TypeConversion(format!("array type {} has no element type", descriptor.name))
    })?;
    let element = catalog
        .resolve_oid(element_oid)
        .ok_or_else(|| PgCallError::UnknownType(format!("oid {element_oid}")))?
        .clone();

    let inner = raw
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| conversion("array", raw))?;
    if inner.is_empty() {
        return Ok(PgValue::Array(Vec::new()));
    }

    let mut items = Vec::new();
    for token in split_array_elements(inner)? {
        match token {
            None => items.push(PgValue::Null),
            Some(text) => items.push(decode_with(&text, &element, catalog)?),
        }
    }
    Ok(PgValue::Array(items))
}

// Quote-aware top-level split of an array literal's contents. `None` is a
// NULL element. An element that opens a nested array is rejected: nested
// arrays do not round-trip through this layer and failing loudly beats
// returning nulls.
fn split_array_elements(inner: &str) -> Result<Vec<Option<String>>> {
    fn finish(text: String, quoted: bool) -> Option<String> {
        if !quoted && text == "NULL" { None } else { Some(text) }
    }

    let mut elements = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                '"' => in_quotes = false,
                _ => current.push(ch),
            }
            continue;
        }
        match ch {
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            '{' if current.is_empty() && !quoted => {
                return Err(PgCallError::UnsupportedType(
                    "nested array decoding is not supported".to_string(),
                ));
            }
            ',' => {
                elements.push(finish(std::mem::take(&mut current), quoted));
                quoted = false;
            }
            _ => current.push(ch),
        }
    }
    elements.push(finish(current, quoted));
    Ok(elements)
}

enum BoundKind {
    Int,
    Decimal,
    Date,
    Timestamp,
    TimestampTz,
}

fn decode_range(raw: &str, kind: BoundKind) -> Result<PgValue> {
    let trimmed = raw.trim();
    if trimmed == "empty" {
        return Err(PgCallError::TypeConversion(
            "empty range has no bounded representation".to_string(),
        ));
    }

    let mut chars = trimmed.chars();
    let open = chars.next().ok_or_else(|| conversion("range", raw))?;
    let close = chars.next_back().ok_or_else(|| conversion("range", raw))?;
    if !matches!(open, '[' | '(') || !matches!(close, ']' | ')') {
        return Err(conversion("range", raw));
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    let (lower_text, upper_text) = split_range_bounds(inner).ok_or_else(|| conversion("range", raw))?;

    let lower = decode_range_bound(&lower_text, &kind)?;
    let upper = decode_range_bound(&upper_text, &kind)?;

    Ok(PgValue::Range(Box::new(RangeValue {
        lower,
        upper,
        exclusive_upper: close == ')',
    })))
}

// Bounds may be double-quoted (timestamps); split at the top-level comma.
fn split_range_bounds(inner: &str) -> Option<(String, String)> {
    let mut in_quotes = false;
    for (index, ch) in inner.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                let lower = inner[..index].trim().trim_matches('"').to_string();
                let upper = inner[index + 1..].trim().trim_matches('"').to_string();
                return Some((lower, upper));
            }
            _ => {}
        }
    }
    None
}

fn decode_range_bound(text: &str, kind: &BoundKind) -> Result<PgValue> {
    if text.is_empty() {
        return Ok(PgValue::Null);
    }
    match kind {
        BoundKind::Int => text
            .parse::<i64>()
            .map(PgValue::Int)
            .map_err(|_| conversion("range bound", text)),
        BoundKind::Decimal => text
            .parse::<Decimal>()
            .map(PgValue::Decimal)
            .map_err(|_| conversion("range bound", text)),
        BoundKind::Date => parse_date(text).map(PgValue::Date),
        BoundKind::Timestamp => parse_timestamp(text).map(PgValue::Timestamp),
        BoundKind::TimestampTz => parse_timestamptz(text).map(PgValue::TimestampTz),
    }
}
