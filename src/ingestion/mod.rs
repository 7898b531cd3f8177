//! Tabular input/output.
//!
//! [`csv`] loads delimited text files into a typed [`crate::types::Table`],
//! sniffing the encoding and delimiter; [`writer`] persists a table back to
//! disk after transformations.

pub mod csv;
pub mod writer;

pub use self::csv::{load_csv_from_bytes, load_csv_from_path};
pub use self::writer::write_csv_to_path;
