use std::sync::Arc;

use tracing::debug;

use crate::catalog::{
    self, FunctionSignature, SEARCH_PATH_QUERY, SignatureCache, TypeCatalog,
};
use crate::codec::{decode, decode_with, encode_inline, encode_parameter};
use crate::config::Config;
use crate::session::{Backend, ParamDescriptor, TEXT_FORMAT};
use crate::types::{PgArg, PgValue, type_resolution};
use crate::{Oid, PgCallError, Result};

/// Orchestrates classification, encoding, submission, and decoding for
/// database function calls over one backend connection.
///
/// One caller per connection; methods take `&mut self` and the caches are
/// populated lazily. The type catalog is built whole and swapped in as one
/// `Arc`, never mutated in place.
pub struct Caller<B: Backend> {
    backend: B,
    config: Config,
    catalog: Option<Arc<TypeCatalog>>,
    signatures: SignatureCache,
}

impl<B: Backend> Caller<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, Config::from_env())
    }

    pub fn with_config(backend: B, config: Config) -> Self {
        let signatures = SignatureCache::new(config.signature_cache_size);
        Caller {
            backend,
            config,
            catalog: None,
            signatures,
        }
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Drop the cached catalog and signatures; both repopulate lazily.
    pub fn clear_caches(&mut self) {
        self.catalog = None;
        self.signatures.clear();
    }

    /// The loaded type catalog, fetched once per caller.
    pub fn catalog(&mut self) -> Result<Arc<TypeCatalog>> {
        if let Some(catalog) = &self.catalog {
            return Ok(catalog.clone());
        }
        let loaded = Arc::new(TypeCatalog::load(&mut self.backend)?);
        self.catalog = Some(loaded.clone());
        Ok(loaded)
    }

    /// Schema list consulted for unqualified function names: the
    /// configured override, or the live session search path.
    pub fn search_path(&mut self) -> Result<Vec<String>> {
        if let Some(path) = &self.config.search_path {
            return Ok(path.clone());
        }
        let result = self.backend.query(SEARCH_PATH_QUERY)?;
        Ok(result
            .first_value()
            .map(catalog::parse_search_path)
            .unwrap_or_default())
    }

    /// Declared argument and return types for a function, cached by the
    /// exact name string used. Qualified and unqualified forms of the same
    /// function are independent cache entries.
    pub fn function_signature(&mut self, name: &str) -> Result<Option<Arc<FunctionSignature>>> {
        if let Some(signature) = self.signatures.get(name) {
            debug!(function = name, "signature cache hit");
            return Ok(Some(signature));
        }

        let search_path = if name.contains('.') {
            Vec::new()
        } else {
            self.search_path()?
        };
        let Some(signature) = catalog::resolve_signature(&mut self.backend, name, &search_path)?
        else {
            return Ok(None);
        };

        let signature = Arc::new(signature);
        self.signatures.insert(name.to_string(), signature.clone());
        Ok(Some(signature))
    }

    /// Resolve a type name to an OID, falling back to a live single-type
    /// lookup for names missing from the loaded snapshot. `None` means the
    /// server should infer.
    pub fn oid_for_type(&mut self, type_name: &str) -> Result<Option<Oid>> {
        let catalog = self.catalog()?;
        if let Some(oid) = catalog.oid_for(type_name) {
            return Ok(Some(oid));
        }
        catalog::fetch_type_oid(&mut self.backend, type_name)
    }

    fn inline_call_sql(&self, function: &str, args: &[PgArg]) -> Result<String> {
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            rendered.push(encode_inline(&self.backend, arg)?);
        }
        Ok(format!("SELECT {function}({}) AS res;", rendered.join(", ")))
    }

    fn param_descriptors(&mut self, args: &[PgArg]) -> Result<Vec<ParamDescriptor>> {
        let mut descriptors = Vec::with_capacity(args.len());
        for arg in args {
            let type_name = type_resolution::type_name_for_arg(arg)?;
            // a resolution miss lets the server infer
            let type_oid = match &type_name {
                Some(name) => self.oid_for_type(name)?.unwrap_or(0),
                None => 0,
            };
            let value = encode_parameter(arg, type_name.as_deref())?;
            descriptors.push(ParamDescriptor {
                value,
                type_oid,
                format: TEXT_FORMAT,
            });
        }
        Ok(descriptors)
    }

    /// Call with inline-encoded arguments, returning the first column of
    /// the first row verbatim.
    pub fn call_uncast(&mut self, function: &str, args: &[PgArg]) -> Result<Option<String>> {
        let sql = self.inline_call_sql(function, args)?;
        debug!(function, "submitting uncast call");
        let result = self.backend.query(&sql)?;
        Ok(result.first_value().map(str::to_string))
    }

    /// Alias for [`call_uncast`](Self::call_uncast).
    pub fn call_scalar(&mut self, function: &str, args: &[PgArg]) -> Result<Option<String>> {
        self.call_uncast(function, args)
    }

    /// Call with inline-encoded arguments, returning every row verbatim.
    pub fn call_returning_rows(
        &mut self,
        function: &str,
        args: &[PgArg],
    ) -> Result<Vec<Vec<Option<String>>>> {
        let sql = self.inline_call_sql(function, args)?;
        debug!(function, "submitting uncast call");
        let result = self.backend.query(&sql)?;
        Ok(result.rows)
    }

    /// Typecast call: parameter-mode submission with resolved OIDs, the
    /// single result column decoded by the OID the server reported — the
    /// actual output type is authoritative, not the types sent in.
    pub fn call(&mut self, function: &str, args: &[PgArg]) -> Result<PgValue> {
        let descriptors = self.param_descriptors(args)?;
        let placeholders = (1..=args.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {function}({placeholders}) AS res;");
        debug!(function, "submitting typecast call");
        let result = self.backend.query_params(&sql, &descriptors)?;

        let Some(row) = result.rows.first() else {
            // a set-returning function can legitimately yield no rows
            return Ok(PgValue::Null);
        };
        let oid = result
            .column_oids
            .first()
            .copied()
            .ok_or_else(|| PgCallError::Database("result reported no column type".to_string()))?;
        let raw = row.first().and_then(|cell| cell.as_deref());
        let catalog = self.catalog()?;
        decode(raw, oid, &catalog)
    }

    /// Force the return type: decode the uncast result through the named
    /// type instead of whatever the server reports.
    pub fn call_returning_type(
        &mut self,
        function: &str,
        type_name: &str,
        args: &[PgArg],
    ) -> Result<PgValue> {
        let raw = self.call_uncast(function, args)?;
        let catalog = self.catalog()?;
        let descriptor = catalog
            .resolve_name(type_name)
            .ok_or_else(|| PgCallError::UnknownType(format!("name {type_name}")))?
            .clone();
        match raw {
            None => Ok(PgValue::Null),
            Some(text) => decode_with(&text, &descriptor, &catalog),
        }
    }

    /// Round-trip typed-parameter query: submits `query` with encoded,
    /// OID-tagged parameters and decodes the first column of every row.
    pub fn casting_query(&mut self, query: &str, params: &[PgArg]) -> Result<Vec<PgValue>> {
        let descriptors = self.param_descriptors(params)?;
        debug!(query, "submitting casting query");
        let result = self.backend.query_params(query, &descriptors)?;

        let Some(&oid) = result.column_oids.first() else {
            if result.rows.is_empty() {
                return Ok(Vec::new());
            }
            return Err(PgCallError::Database(
                "result reported no column type".to_string(),
            ));
        };
        let catalog = self.catalog()?;
        result
            .rows
            .iter()
            .map(|row| decode(row.first().and_then(|cell| cell.as_deref()), oid, &catalog))
            .collect()
    }
}
