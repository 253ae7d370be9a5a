pub mod csv;
pub mod memory;

pub use self::csv::CsvConnector;
pub use memory::InMemoryConnector;
