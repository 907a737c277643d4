pub mod input_parser;

pub use input_parser::{NewTodo, ParsedInput, parse_input, parse_new_todo};
