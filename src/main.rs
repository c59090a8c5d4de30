use env_logger::{Builder, Env, Target};
use log::error;
use std::process;
use storybook::{run, Cli, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Init logging; pages go to stdout
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(Target::Stderr);
    builder.init();

    // Parse Args
    let cli = Cli::new();

    // Parse Settings
    let settings = match Settings::new(&cli.config_file) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    // Run
    if let Err(e) = run(settings, cli.action).await {
        error!("Application error: {}", e);
        process::exit(1);
    }
}
