use postgres_protocol::escape::escape_literal;

use crate::codec::wire_text;
use crate::types::PgValue;
use crate::{Oid, Result};

/// Text parameter format code.
pub const TEXT_FORMAT: i16 = 0;

/// Rows and result metadata returned by the connection primitive.
///
/// Cells are text-format wire values; `None` is SQL NULL. `column_oids`
/// carries the type OID the server reported for each column, which is
/// authoritative for decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub column_oids: Vec<Oid>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    /// First column of the first row, if any.
    pub fn first_value(&self) -> Option<&str> {
        self.rows.first()?.first()?.as_deref()
    }
}

/// One positional parameter: rendered text value, declared type OID
/// (0 lets the server infer), and format code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub value: Option<String>,
    pub type_oid: Oid,
    pub format: i16,
}

/// The database connection primitive this crate is layered over.
///
/// Any driver that can run a text query, run a query with positional
/// text-format parameters tagged with type OIDs, and report per-column
/// result OIDs can sit behind this trait. Failures surface as
/// `PgCallError::Database`; nothing in this crate retries.
pub trait Backend {
    /// Execute a parameterless query, returning text rows and per-column
    /// reported type OIDs.
    fn query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Execute a query with positional parameters.
    fn query_params(&mut self, sql: &str, params: &[ParamDescriptor]) -> Result<QueryResult>;

    /// Escape one value for direct inclusion in SQL text. The default
    /// covers the stock Postgres rules; a driver may substitute its own.
    fn quote_literal(&self, value: &PgValue) -> String {
        quote_value(value)
    }
}

/// Stock literal quoting: numbers and booleans bare, `NULL` for null,
/// bytes as a quoted hex escape, everything else through the
/// protocol-level escape primitive.
pub fn quote_value(value: &PgValue) -> String {
    match value {
        PgValue::Null => "NULL".to_string(),
        PgValue::Bool(true) => "TRUE".to_string(),
        PgValue::Bool(false) => "FALSE".to_string(),
        PgValue::Int(n) => n.to_string(),
        PgValue::Float(f) => f.to_string(),
        PgValue::Decimal(d) => d.to_string(),
        PgValue::Bytes(bytes) => format!("'\\x{}'", hex::encode_upper(bytes)),
        other => escape_literal(&wire_text(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_scalars() {
        assert_eq!(quote_value(&PgValue::Null), "NULL");
        assert_eq!(quote_value(&PgValue::Bool(true)), "TRUE");
        assert_eq!(quote_value(&PgValue::Int(99)), "99");
        assert_eq!(quote_value(&PgValue::Float(1.5)), "1.5");
        assert_eq!(quote_value(&PgValue::Text("foo".into())), "'foo'");
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(quote_value(&PgValue::Text("it's".into())), "'it''s'");
    }

    #[test]
    fn test_quote_bytes_as_hex() {
        assert_eq!(
            quote_value(&PgValue::Bytes(vec![0xAB, 0xCD])),
            "'\\xABCD'"
        );
    }

    #[test]
    fn test_first_value() {
        let result = QueryResult {
            columns: vec!["res".to_string()],
            column_oids: vec![25],
            rows: vec![vec![Some("x".to_string())]],
        };
        assert_eq!(result.first_value(), Some("x"));
        assert_eq!(QueryResult::default().first_value(), None);
    }
}
