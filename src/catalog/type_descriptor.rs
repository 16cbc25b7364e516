use crate::Oid;

/// Catalog classification of a type, one variant per `pg_type.typcategory`
/// code this crate recognizes. Codes outside the table (for example the
/// range category) map to `Unknown`; range types are handled by name in the
/// decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Array,
    Boolean,
    Composite,
    DateTime,
    Enum,
    Geometric,
    NetworkAddress,
    Numeric,
    Pseudotype,
    String,
    Timespan,
    UserDefined,
    BitString,
    Unknown,
}

impl TypeCategory {
    pub fn from_code(code: char) -> Self {
        match code {
            'A' => TypeCategory::Array,
            'B' => TypeCategory::Boolean,
            'C' => TypeCategory::Composite,
            'D' => TypeCategory::DateTime,
            'E' => TypeCategory::Enum,
            'G' => TypeCategory::Geometric,
            'I' => TypeCategory::NetworkAddress,
            'N' => TypeCategory::Numeric,
            'P' => TypeCategory::Pseudotype,
            'S' => TypeCategory::String,
            'T' => TypeCategory::Timespan,
            'U' => TypeCategory::UserDefined,
            'V' => TypeCategory::BitString,
            _ => TypeCategory::Unknown,
        }
    }

    pub fn code(&self) -> char {
        match self {
            TypeCategory::Array => 'A',
            TypeCategory::Boolean => 'B',
            TypeCategory::Composite => 'C',
            TypeCategory::DateTime => 'D',
            TypeCategory::Enum => 'E',
            TypeCategory::Geometric => 'G',
            TypeCategory::NetworkAddress => 'I',
            TypeCategory::Numeric => 'N',
            TypeCategory::Pseudotype => 'P',
            TypeCategory::String => 'S',
            TypeCategory::Timespan => 'T',
            TypeCategory::UserDefined => 'U',
            TypeCategory::BitString => 'V',
            TypeCategory::Unknown => 'X',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeCategory::Array => "array",
            TypeCategory::Boolean => "boolean",
            TypeCategory::Composite => "composite",
            TypeCategory::DateTime => "datetime",
            TypeCategory::Enum => "enum",
            TypeCategory::Geometric => "geometric",
            TypeCategory::NetworkAddress => "network_address",
            TypeCategory::Numeric => "numeric",
            TypeCategory::Pseudotype => "pseudotype",
            TypeCategory::String => "string",
            TypeCategory::Timespan => "timespan",
            TypeCategory::UserDefined => "user_defined",
            TypeCategory::BitString => "bit_string",
            TypeCategory::Unknown => "unknown",
        }
    }
}

/// Immutable record describing one catalog type. Loaded once per session
/// and shared through the catalog's indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub oid: Oid,
    pub name: String,
    pub namespace: String,
    pub category: TypeCategory,
    /// Present iff `category` is `Array`.
    pub element_type_oid: Option<Oid>,
    /// OID of "array of this type"; present for non-array base types.
    pub array_type_oid: Option<Oid>,
}

impl TypeDescriptor {
    /// Base types are not namespace-qualified.
    pub fn fqname(&self) -> String {
        if self.namespace == "pg_catalog" {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}
