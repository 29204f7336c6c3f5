mod bytes;
mod datum;
mod value;

pub use bytes::Bytes;
pub use datum::Datum;
pub(crate) use datum::mismatch;
pub use value::Value;
