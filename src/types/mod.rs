//! Declared-type parsing and value conversion.

mod catalog;
mod descriptor;

pub use catalog::{resolve, resolve_descriptor, Converter, Value, DATETIME_NULL, DATE_NULL};
pub use descriptor::TypeDescriptor;
