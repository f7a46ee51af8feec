mod ast;
mod commands;
mod config;
mod editor;
mod error;
mod history;
mod interner;
mod io;
mod linker;
pub mod markup;
mod sanitizer;
mod selection;
pub mod splice;
mod table;
pub mod templates;
mod tree;

pub use ast::*;
pub use commands::*;
pub use config::*;
pub use editor::*;
pub use error::*;
pub use history::*;
pub use interner::*;
pub use io::*;
pub use linker::*;
pub use sanitizer::{sanitize, Sanitizer, DEFAULT_MAX_DEPTH};
pub use selection::*;
pub use table::*;
pub use tree::flatten_blocks;
