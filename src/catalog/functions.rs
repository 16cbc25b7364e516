use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use postgres_protocol::escape::escape_literal;
use tracing::debug;

use crate::catalog::{row_oid, row_text};
use crate::session::Backend;
use crate::{Oid, PgCallError, Result};

/// Session search-path listing.
pub const SEARCH_PATH_QUERY: &str = "SHOW search_path;";

// One row per overload: declared return type plus the space-separated
// argument type OID vector.
fn signature_query(name: &str, schema: &str) -> String {
    format!(
        "SELECT prorettype, proargtypes FROM pg_proc AS p \
         JOIN pg_namespace AS n ON p.pronamespace = n.oid \
         WHERE proname = {} AND n.nspname = {};",
        escape_literal(name),
        escape_literal(schema)
    )
}

/// Declared types of a database function. Overloads sharing the name
/// contribute one argument-type tuple each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub return_type_oid: Oid,
    /// Sorted and deduplicated for stable equality comparison.
    pub arg_type_oid_sets: Vec<Vec<Oid>>,
}

/// LRU over resolved signatures, keyed by the exact string the caller
/// used. Qualified and unqualified forms of the same function cache
/// independently; entries are immutable once stored.
pub struct SignatureCache {
    cache: Mutex<LruCache<String, Arc<FunctionSignature>>>,
}

impl SignatureCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        SignatureCache {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<FunctionSignature>> {
        self.cache.lock().get(name).cloned()
    }

    pub fn insert(&self, name: String, signature: Arc<FunctionSignature>) {
        self.cache.lock().put(name, signature);
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

/// Resolve a function's declared types.
///
/// A qualified name queries that exact schema. An unqualified name walks
/// the search path and takes the first schema with a match; an empty
/// search path in that case is a caller error. A function absent
/// everywhere is `None`, not an error.
pub fn resolve_signature<B: Backend>(
    backend: &mut B,
    name: &str,
    search_path: &[String],
) -> Result<Option<FunctionSignature>> {
    let rows = match name.split_once('.') {
        Some((schema, fname)) => lookup(backend, fname, schema)?,
        None => {
            if search_path.is_empty() {
                return Err(PgCallError::Configuration(
                    "a search path is required to resolve an unqualified function name".to_string(),
                ));
            }
            let mut found = Vec::new();
            for schema in search_path {
                let rows = lookup(backend, name, schema)?;
                if !rows.is_empty() {
                    found = rows;
                    break;
                }
            }
            found
        }
    };

    if rows.is_empty() {
        debug!(function = name, "no matching function");
        return Ok(None);
    }

    let return_type_oid = rows[0].0;
    let mut arg_type_oid_sets: Vec<Vec<Oid>> = rows.into_iter().map(|(_, args)| args).collect();
    arg_type_oid_sets.sort();
    arg_type_oid_sets.dedup();

    Ok(Some(FunctionSignature {
        name: name.to_string(),
        return_type_oid,
        arg_type_oid_sets,
    }))
}

fn lookup<B: Backend>(backend: &mut B, fname: &str, schema: &str) -> Result<Vec<(Oid, Vec<Oid>)>> {
    let result = backend.query(&signature_query(fname, schema))?;
    result
        .rows
        .iter()
        .map(|row| {
            let return_type = row_oid(row, 0)?;
            let args = row_text(row, 1)?
                .split_whitespace()
                .map(|oid| {
                    oid.parse().map_err(|_| {
                        PgCallError::TypeConversion(format!("invalid oid in proargtypes: {oid}"))
                    })
                })
                .collect::<Result<Vec<Oid>>>()?;
            Ok((return_type, args))
        })
        .collect()
}

/// Split the `SHOW search_path` output into schema names.
pub fn parse_search_path(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StubBackend;

    #[test]
    fn test_parse_search_path() {
        assert_eq!(
            parse_search_path("\"$user\", public"),
            vec!["$user".to_string(), "public".to_string()]
        );
        assert_eq!(parse_search_path("public"), vec!["public".to_string()]);
        assert!(parse_search_path("").is_empty());
    }

    #[test]
    fn test_qualified_name_skips_search_path() {
        let mut backend = StubBackend::new();
        backend.register_function("other", "area", 701, &[701, 701]);

        let signature = resolve_signature(&mut backend, "other.area", &[])
            .unwrap()
            .unwrap();
        assert_eq!(signature.return_type_oid, 701);
        assert_eq!(signature.arg_type_oid_sets, vec![vec![701, 701]]);
    }

    #[test]
    fn test_unqualified_name_requires_search_path() {
        let mut backend = StubBackend::new();
        assert!(matches!(
            resolve_signature(&mut backend, "area", &[]),
            Err(PgCallError::Configuration(_))
        ));
    }

    #[test]
    fn test_overloads_merge_into_one_signature() {
        let mut backend = StubBackend::new();
        backend.register_function("public", "fmt", 25, &[25]);
        backend.register_function("public", "fmt", 25, &[25, 23]);
        backend.register_function("public", "fmt", 25, &[25]);

        let signature = resolve_signature(&mut backend, "fmt", &["public".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(
            signature.arg_type_oid_sets,
            vec![vec![25], vec![25, 23]]
        );
    }

    #[test]
    fn test_missing_function_is_not_found() {
        let mut backend = StubBackend::new();
        let resolved = resolve_signature(&mut backend, "nope", &["public".to_string()]).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_signature_cache_round_trip() {
        let cache = SignatureCache::new(4);
        assert!(cache.get("f").is_none());
        let signature = Arc::new(FunctionSignature {
            name: "f".to_string(),
            return_type_oid: 23,
            arg_type_oid_sets: vec![vec![23]],
        });
        cache.insert("f".to_string(), signature.clone());
        assert_eq!(cache.get("f"), Some(signature));
        cache.clear();
        assert!(cache.get("f").is_none());
    }
}
