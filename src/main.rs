use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;

use rendoc_lib::exit_codes::exit;

mod commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// HTML fragment
    Html,
    /// `{html, headings}` object
    Json,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file path (default: nearest .rendoc.toml or rendoc.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore configuration files and use built-in defaults
    #[arg(long, conflicts_with = "config")]
    no_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render Markdown files to HTML
    Render {
        /// Files to render; `-` reads stdin
        #[arg(required = true)]
        paths: Vec<String>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,

        /// Write one output file per input into this directory instead of stdout
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the table of contents of a Markdown file
    Toc {
        /// File to read; `-` reads stdin
        path: String,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print the syntax highlighting stylesheet
    Css {
        /// Theme name
        #[arg(short, long, default_value = "InspiredGitHub")]
        theme: String,

        /// List the bundled theme names instead
        #[arg(long)]
        list: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[cfg(feature = "native")]
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render {
            paths,
            config,
            format,
            output_dir,
        } => commands::render::handle_render(&paths, &config, format, output_dir.as_deref()),
        Commands::Toc { path, config } => commands::toc::handle_toc(&path, &config),
        Commands::Css { theme, list, config } => commands::css::handle_css(&theme, list, &config),
        Commands::Schema => commands::schema::handle_schema(),
    };

    if let Err(e) = result {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        exit::tool_error();
    }
}
