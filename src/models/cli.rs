use clap::Parser;

#[derive(clap::Parser)]
#[command(version, about = "Read picture books in the terminal")]
pub struct Cli {
    #[arg(short, long, default_value = "storybook")]
    pub config_file: String,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open the reader at a route such as `/super-bowie/3`
    Read {
        #[arg(default_value = "/")]
        route: String,
    },
    /// Load every registered book and check its content
    Validate {
        /// Also check that every page image can be loaded
        #[arg(long)]
        check_images: bool,
    },
    /// Print the list of books
    List,
}

impl Cli {
    pub fn new() -> Self {
        Cli::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}
