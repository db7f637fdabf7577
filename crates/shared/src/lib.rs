pub mod domain;
pub mod error;
pub mod field_errors;
pub mod path;
pub mod protocol;
