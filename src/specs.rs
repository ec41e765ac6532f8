//!
//! Provides the element catalog types.
//!
//! Typically won't be used unless you are mapping a custom EBML document format.  The [`matroska`](crate::matroska) module is an example of a catalog-driven mapper.
//!

pub use ebml_cursor_specification::ElementCatalog as ElementCatalog;
pub use ebml_cursor_specification::ElementType as ElementType;
