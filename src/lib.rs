pub mod call;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod session;
pub mod types;

use thiserror::Error;

/// PostgreSQL object identifier.
pub type Oid = u32;

#[derive(Error, Debug)]
pub enum PgCallError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot infer the element type of an empty untyped collection")]
    AmbiguousType,

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("No catalog entry for type {0}")]
    UnknownType(String),

    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, PgCallError>;

pub use call::Caller;
pub use catalog::{FunctionSignature, TypeCatalog, TypeCategory, TypeDescriptor};
pub use config::Config;
pub use session::{Backend, ParamDescriptor, QueryResult, StubBackend};
pub use types::{InetValue, PgArg, PgValue, RangeValue};
