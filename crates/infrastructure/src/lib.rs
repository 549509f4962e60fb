pub mod connection;
pub mod dynamodb;
pub mod memory;
pub mod models;
pub mod store;

pub use connection::*;
pub use dynamodb::*;
pub use memory::*;
pub use models::*;
pub use store::*;
