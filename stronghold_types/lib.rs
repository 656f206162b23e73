pub mod buildings;
pub mod common;
pub mod errors;

pub use errors::Result;
