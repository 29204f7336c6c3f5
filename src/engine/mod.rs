pub mod errors;
pub mod group;
pub mod types;

pub use errors::*;
