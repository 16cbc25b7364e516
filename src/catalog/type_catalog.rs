use std::collections::HashMap;
use std::sync::Arc;

use postgres_protocol::escape::escape_literal;
use tracing::{debug, info};

use crate::catalog::{TypeCategory, TypeDescriptor, row_oid, row_text};
use crate::session::Backend;
use crate::{Oid, Result};

/// Bulk listing of every type known to the database, issued once per
/// catalog load.
pub const TYPE_CATALOG_QUERY: &str =
    "SELECT t.oid, t.typname, n.nspname, t.typcategory, t.typelem, t.typarray \
     FROM pg_type AS t JOIN pg_namespace AS n ON t.typnamespace = n.oid;";

/// Indexes every catalog type by OID and by name.
///
/// Both indexes share the same descriptors, so a type reachable by one key
/// is always reachable by the other. Built whole and swapped in as one
/// `Arc`; never mutated after load.
pub struct TypeCatalog {
    by_oid: HashMap<Oid, Arc<TypeDescriptor>>,
    by_name: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    /// Fetch every type row in one query and build both indexes. A failure
    /// of the underlying query is fatal for the load.
    pub fn load<B: Backend>(backend: &mut B) -> Result<Self> {
        let result = backend.query(TYPE_CATALOG_QUERY)?;

        let mut catalog = TypeCatalog {
            by_oid: HashMap::with_capacity(result.rows.len()),
            by_name: HashMap::with_capacity(result.rows.len()),
        };

        for row in &result.rows {
            let descriptor = Arc::new(parse_type_row(row)?);
            // The qualified name always resolves; the bare name goes to the
            // first claimant, except that pg_catalog types always win it.
            catalog
                .by_name
                .insert(descriptor.fqname(), descriptor.clone());
            if !catalog.by_name.contains_key(&descriptor.name) {
                catalog
                    .by_name
                    .insert(descriptor.name.clone(), descriptor.clone());
            }
            catalog.by_oid.insert(descriptor.oid, descriptor);
        }

        info!(types = catalog.by_oid.len(), "loaded type catalog");
        Ok(catalog)
    }

    pub fn resolve_oid(&self, oid: Oid) -> Option<&Arc<TypeDescriptor>> {
        self.by_oid.get(&oid)
    }

    pub fn resolve_name(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.by_name.get(name)
    }

    /// Strip trailing array markers and map the base name to its own OID,
    /// or to its companion array OID when a marker was present. A miss is
    /// `None` so callers can fall back to letting the server infer.
    pub fn oid_for(&self, type_name: &str) -> Option<Oid> {
        let base = type_name.trim_end_matches("[]");
        let descriptor = self.resolve_name(base)?;
        if base.len() != type_name.len() {
            descriptor.array_type_oid
        } else {
            Some(descriptor.oid)
        }
    }

    pub fn len(&self) -> usize {
        self.by_oid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_oid.is_empty()
    }
}

fn parse_type_row(row: &[Option<String>]) -> Result<TypeDescriptor> {
    let oid = row_oid(row, 0)?;
    let name = row_text(row, 1)?.to_string();
    let namespace = row_text(row, 2)?.to_string();
    let category = TypeCategory::from_code(row_text(row, 3)?.chars().next().unwrap_or('X'));
    let typelem = row_oid(row, 4)?;
    let typarray = row_oid(row, 5)?;

    Ok(TypeDescriptor {
        oid,
        name,
        namespace,
        element_type_oid: (category == TypeCategory::Array && typelem != 0).then_some(typelem),
        array_type_oid: (typarray != 0).then_some(typarray),
        category,
    })
}

/// Live both-OID lookup for one type name, used for names missing from a
/// loaded catalog snapshot (for example a type created after load).
pub fn fetch_type_oid<B: Backend>(backend: &mut B, type_name: &str) -> Result<Option<Oid>> {
    let base = type_name.trim_end_matches("[]");
    let sql = format!(
        "SELECT oid, typarray FROM pg_type WHERE typname = {};",
        escape_literal(base)
    );
    let result = backend.query(&sql)?;

    let Some(row) = result.rows.first() else {
        debug!(type_name, "no pg_type row");
        return Ok(None);
    };

    let column = if base.len() != type_name.len() { 1 } else { 0 };
    let oid = row_oid(row, column)?;
    Ok((oid != 0).then_some(oid))
}
