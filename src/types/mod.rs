pub mod arg;
pub mod network;
pub mod range;
pub mod type_resolution;
pub mod value;

pub use arg::PgArg;
pub use network::InetValue;
pub use range::RangeValue;
pub use value::PgValue;
