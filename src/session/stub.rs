use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::{SEARCH_PATH_QUERY, TYPE_CATALOG_QUERY};
use crate::session::{Backend, ParamDescriptor, QueryResult};
use crate::{Oid, PgCallError, Result};

/// OID the stub assigns to its `hstore` extension type.
pub const HSTORE_OID: Oid = 16385;
/// OID the stub assigns to `hstore[]`.
pub const HSTORE_ARRAY_OID: Oid = 16386;

// (oid, typname, nspname, typcategory, typelem, typarray) — the pg_catalog
// subset the stub serves, plus hstore as a representative extension type.
const BUILTIN_TYPES: &[(Oid, &str, &str, char, Oid, Oid)] = &[
    (16, "bool", "pg_catalog", 'B', 0, 1000),
    (17, "bytea", "pg_catalog", 'U', 0, 1001),
    (20, "int8", "pg_catalog", 'N', 0, 1016),
    (21, "int2", "pg_catalog", 'N', 0, 1005),
    (23, "int4", "pg_catalog", 'N', 0, 1007),
    (25, "text", "pg_catalog", 'S', 0, 1009),
    (650, "cidr", "pg_catalog", 'I', 0, 651),
    (700, "float4", "pg_catalog", 'N', 0, 1021),
    (701, "float8", "pg_catalog", 'N', 0, 1022),
    (705, "unknown", "pg_catalog", 'X', 0, 0),
    (790, "money", "pg_catalog", 'N', 0, 791),
    (869, "inet", "pg_catalog", 'I', 0, 1041),
    (1043, "varchar", "pg_catalog", 'S', 0, 1015),
    (1082, "date", "pg_catalog", 'D', 0, 1182),
    (1083, "time", "pg_catalog", 'D', 0, 1183),
    (1114, "timestamp", "pg_catalog", 'D', 0, 1115),
    (1184, "timestamptz", "pg_catalog", 'D', 0, 1185),
    (1186, "interval", "pg_catalog", 'T', 0, 1187),
    (1700, "numeric", "pg_catalog", 'N', 0, 1231),
    (2950, "uuid", "pg_catalog", 'U', 0, 2951),
    (3904, "int4range", "pg_catalog", 'R', 0, 3905),
    (3906, "numrange", "pg_catalog", 'R', 0, 3907),
    (3908, "tsrange", "pg_catalog", 'R', 0, 3909),
    (3910, "tstzrange", "pg_catalog", 'R', 0, 3911),
    (3912, "daterange", "pg_catalog", 'R', 0, 3913),
    (3926, "int8range", "pg_catalog", 'R', 0, 3927),
    (HSTORE_OID, "hstore", "public", 'U', 0, HSTORE_ARRAY_OID),
    // array companions
    (651, "_cidr", "pg_catalog", 'A', 650, 0),
    (791, "_money", "pg_catalog", 'A', 790, 0),
    (1000, "_bool", "pg_catalog", 'A', 16, 0),
    (1001, "_bytea", "pg_catalog", 'A', 17, 0),
    (1005, "_int2", "pg_catalog", 'A', 21, 0),
    (1007, "_int4", "pg_catalog", 'A', 23, 0),
    (1009, "_text", "pg_catalog", 'A', 25, 0),
    (1015, "_varchar", "pg_catalog", 'A', 1043, 0),
    (1016, "_int8", "pg_catalog", 'A', 20, 0),
    (1021, "_float4", "pg_catalog", 'A', 700, 0),
    (1022, "_float8", "pg_catalog", 'A', 701, 0),
    (1041, "_inet", "pg_catalog", 'A', 869, 0),
    (1182, "_date", "pg_catalog", 'A', 1082, 0),
    (1183, "_time", "pg_catalog", 'A', 1083, 0),
    (1115, "_timestamp", "pg_catalog", 'A', 1114, 0),
    (1185, "_timestamptz", "pg_catalog", 'A', 1184, 0),
    (1187, "_interval", "pg_catalog", 'A', 1186, 0),
    (1231, "_numeric", "pg_catalog", 'A', 1700, 0),
    (2951, "_uuid", "pg_catalog", 'A', 2950, 0),
    (HSTORE_ARRAY_OID, "_hstore", "public", 'A', HSTORE_OID, 0),
];

static PROC_QUERY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"proname = '([^']+)' AND n\.nspname = '([^']+)'").unwrap());
static OID_QUERY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"typname = '([^']+)'").unwrap());

struct StubFunction {
    schema: String,
    name: String,
    return_type_oid: Oid,
    arg_type_oids: String,
}

/// In-memory backend for tests and examples.
///
/// Serves the catalog queries from a canned `pg_type` subset and from
/// functions registered with [`register_function`](Self::register_function).
/// Everything else pops a scripted result FIFO. Submitted statements and
/// parameter descriptors are recorded for assertions.
pub struct StubBackend {
    search_path: String,
    functions: Vec<StubFunction>,
    scripted: VecDeque<QueryResult>,
    pub executed: Vec<String>,
    pub captured_params: Vec<Vec<ParamDescriptor>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::with_search_path("\"$user\", public")
    }

    pub fn with_search_path(search_path: &str) -> Self {
        StubBackend {
            search_path: search_path.to_string(),
            functions: Vec::new(),
            scripted: VecDeque::new(),
            executed: Vec::new(),
            captured_params: Vec::new(),
        }
    }

    /// Register one function overload for signature lookups.
    pub fn register_function(
        &mut self,
        schema: &str,
        name: &str,
        return_type_oid: Oid,
        arg_type_oids: &[Oid],
    ) {
        let arg_type_oids = arg_type_oids
            .iter()
            .map(|oid| oid.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.functions.push(StubFunction {
            schema: schema.to_string(),
            name: name.to_string(),
            return_type_oid,
            arg_type_oids,
        });
    }

    /// Queue a full result for the next non-catalog statement.
    pub fn push_result(&mut self, result: QueryResult) {
        self.scripted.push_back(result);
    }

    /// Queue a single-row, single-column result.
    pub fn push_value(&mut self, oid: Oid, value: Option<&str>) {
        self.push_column(oid, &[value]);
    }

    /// Queue a one-column result with one row per value.
    pub fn push_column(&mut self, oid: Oid, values: &[Option<&str>]) {
        self.push_result(QueryResult {
            columns: vec!["res".to_string()],
            column_oids: vec![oid],
            rows: values
                .iter()
                .map(|value| vec![value.map(str::to_string)])
                .collect(),
        });
    }

    fn catalog_result(&self) -> QueryResult {
        QueryResult {
            columns: ["oid", "typname", "nspname", "typcategory", "typelem", "typarray"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            column_oids: vec![26, 19, 19, 18, 26, 26],
            rows: BUILTIN_TYPES
                .iter()
                .map(|(oid, name, ns, category, elem, array)| {
                    vec![
                        Some(oid.to_string()),
                        Some(name.to_string()),
                        Some(ns.to_string()),
                        Some(category.to_string()),
                        Some(elem.to_string()),
                        Some(array.to_string()),
                    ]
                })
                .collect(),
        }
    }

    fn function_result(&self, name: &str, schema: &str) -> QueryResult {
        QueryResult {
            columns: vec!["prorettype".to_string(), "proargtypes".to_string()],
            column_oids: vec![26, 30],
            rows: self
                .functions
                .iter()
                .filter(|f| f.name == name && f.schema == schema)
                .map(|f| {
                    vec![
                        Some(f.return_type_oid.to_string()),
                        Some(f.arg_type_oids.clone()),
                    ]
                })
                .collect(),
        }
    }

    fn oid_result(&self, name: &str) -> QueryResult {
        QueryResult {
            columns: vec!["oid".to_string(), "typarray".to_string()],
            column_oids: vec![26, 26],
            rows: BUILTIN_TYPES
                .iter()
                .filter(|(_, typname, ..)| *typname == name)
                .map(|(oid, _, _, _, _, array)| {
                    vec![Some(oid.to_string()), Some(array.to_string())]
                })
                .collect(),
        }
    }

    fn next_scripted(&mut self, sql: &str) -> Result<QueryResult> {
        self.scripted
            .pop_front()
            .ok_or_else(|| PgCallError::Database(format!("unexpected query: {sql}")))
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for StubBackend {
    fn query(&mut self, sql: &str) -> Result<QueryResult> {
        self.executed.push(sql.to_string());

        if sql == TYPE_CATALOG_QUERY {
            return Ok(self.catalog_result());
        }
        if sql == SEARCH_PATH_QUERY {
            return Ok(QueryResult {
                columns: vec!["search_path".to_string()],
                column_oids: vec![25],
                rows: vec![vec![Some(self.search_path.clone())]],
            });
        }
        if let Some(captures) = PROC_QUERY_RE.captures(sql) {
            return Ok(self.function_result(&captures[1], &captures[2]));
        }
        if sql.starts_with("SELECT oid, typarray FROM pg_type") {
            if let Some(captures) = OID_QUERY_RE.captures(sql) {
                return Ok(self.oid_result(&captures[1]));
            }
        }

        self.next_scripted(sql)
    }

    fn query_params(&mut self, sql: &str, params: &[ParamDescriptor]) -> Result<QueryResult> {
        self.executed.push(sql.to_string());
        self.captured_params.push(params.to_vec());
        self.next_scripted(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serves_catalog_queries() {
        let mut backend = StubBackend::new();
        let result = backend.query(TYPE_CATALOG_QUERY).unwrap();
        assert_eq!(result.columns.len(), 6);
        assert!(result.rows.len() > 30);

        let path = backend.query(SEARCH_PATH_QUERY).unwrap();
        assert_eq!(path.first_value(), Some("\"$user\", public"));
    }

    #[test]
    fn test_unexpected_query_is_a_database_error() {
        let mut backend = StubBackend::new();
        assert!(matches!(
            backend.query("SELECT 1"),
            Err(PgCallError::Database(_))
        ));
    }

    #[test]
    fn test_scripted_results_pop_in_order() {
        let mut backend = StubBackend::new();
        backend.push_value(25, Some("a"));
        backend.push_value(25, Some("b"));
        assert_eq!(backend.query("SELECT 'a'").unwrap().first_value(), Some("a"));
        assert_eq!(backend.query("SELECT 'b'").unwrap().first_value(), Some("b"));
    }
}
