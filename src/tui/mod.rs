pub mod app;
pub mod command_actions;
pub mod command_registry;
pub mod focus;
pub mod input;
pub mod line_buffer;
pub mod render;
pub mod theme;
pub mod undo;

pub use app::run;
