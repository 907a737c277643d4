pub mod config;
pub mod focus;
pub mod todo;

pub use config::*;
pub use focus::*;
pub use todo::*;
