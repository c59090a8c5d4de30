pub mod book;
pub mod cli;

pub use book::{BookData, Page};
pub use cli::{Action, Cli};
