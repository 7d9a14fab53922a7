//! Common traits shared between the library and its callers

pub mod traits;

pub use traits::TagChecker;
