pub mod connection;
pub mod schema;
pub mod settings;
pub mod stats;

pub use connection::Database;
