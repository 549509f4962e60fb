pub mod config;
pub mod connection_string;
pub mod logging;

pub use config::*;
pub use connection_string::*;
pub use logging::*;
