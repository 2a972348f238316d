//! History-table ingestion: column-shape repair and canonicalization.

pub mod table;

pub use table::{load_history, ColumnShape};
