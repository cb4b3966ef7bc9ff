//! The in-memory car table
//!
//! Records are loaded from JSON into named, ordered columns of optional
//! cells, rendered for the terminal, and written back out as CSV.

pub mod column;
pub mod frame;
pub mod loader;
pub mod render;
pub mod writer;

pub use column::{BadCell, CellKey, Column, ColumnKind};
pub use frame::CarTable;
pub use loader::{load_path, LoadError};
pub use writer::{save_table, CsvTableWriter, PersistError};
