pub mod configuration;
pub mod history;
pub mod images;
pub mod keyboard;
pub mod loader;
pub mod models;
pub mod navigator;
pub mod render;
pub mod router;
pub mod run;
#[cfg(test)]
mod test_server;
pub mod validation;
pub mod viewer;

pub use configuration::Settings;
pub use models::{Action, BookData, Cli, Page};
pub use run::run;
