pub mod decode;
pub mod encode;

pub use decode::{decode, decode_with};
pub use encode::{encode_inline, encode_parameter, wire_text};
