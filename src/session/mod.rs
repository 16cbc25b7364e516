pub mod connection;
pub mod stub;

pub use connection::{Backend, ParamDescriptor, QueryResult, TEXT_FORMAT, quote_value};
pub use stub::StubBackend;
