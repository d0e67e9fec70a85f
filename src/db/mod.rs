mod records;
mod repository;
mod schema;

pub use records::Record;
pub use repository::Repository;
