pub mod functions;
pub mod type_catalog;
pub mod type_descriptor;

pub use functions::{
    FunctionSignature, SEARCH_PATH_QUERY, SignatureCache, parse_search_path, resolve_signature,
};
pub use type_catalog::{TYPE_CATALOG_QUERY, TypeCatalog, fetch_type_oid};
pub use type_descriptor::{TypeCategory, TypeDescriptor};

use crate::{Oid, PgCallError, Result};

// Catalog rows arrive as text cells; these keep the per-column plumbing in
// one place.

pub(crate) fn row_text(row: &[Option<String>], index: usize) -> Result<&str> {
    row.get(index).and_then(|cell| cell.as_deref()).ok_or_else(|| {
        PgCallError::TypeConversion(format!("catalog row is missing column {index}"))
    })
}

pub(crate) fn row_oid(row: &[Option<String>], index: usize) -> Result<Oid> {
    let text = row_text(row, index)?;
    text.parse()
        .map_err(|_| PgCallError::TypeConversion(format!("invalid oid: {text}")))
}
