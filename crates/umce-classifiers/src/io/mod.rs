//! Reading labelled tables from disk and pairing them into train/test splits.
pub mod repository;
pub mod table_reader;

pub use repository::DatasetRepository;
pub use table_reader::{read_table, TableFile, TableReaderConfig};
