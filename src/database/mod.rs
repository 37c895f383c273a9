mod connection;

pub use connection::{create_pool, ping};
