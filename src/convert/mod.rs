//! Dynamic converter between JSON and typed values.
//!
//! Shapes are described by [`RuntimeTypeData`](crate::schema::RuntimeTypeData)
//! rather than by host types: decoding maps JSON keys onto declared
//! property names (directly or through a rename), encoding maps them back.

pub mod decode;
pub mod encode;
pub mod value;

pub use decode::{decode, decode_object};
pub use encode::{NullHandling, encode, encode_object};
pub use value::{DynamicValue, TypedObject};
