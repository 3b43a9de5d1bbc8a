//! Tally CLI - npm package usage for JavaScript/TypeScript code bases.

mod cli;
mod commands;
mod formatters;
mod logging;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version)]
#[command(about = "Count which npm packages a JavaScript/TypeScript code base imports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Paths to analyze (one directory, or one or more source files)
    ///
    /// Examples:
    ///   tally .                    # Walk the whole project
    ///   tally src/app.tsx          # A single file
    ///   tally src/a.ts src/b.ts    # Several files
    #[arg(value_name = "PATHS", default_values = ["."])]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long = "output", value_enum, default_value = "human")]
    format: OutputFormat,

    /// Output JSON format (alias for --output json)
    #[arg(long)]
    json: bool,

    /// Skip registry requests; report local usage only
    #[arg(long)]
    offline: bool,

    /// Maximum number of packages fetched at the same time
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Configuration file path (default: ~/.tally/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Manage tally configuration
    Config {
        #[command(subcommand)]
        command: commands::ConfigCommand,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(Command::Config { command }) => {
            commands::handle_config_command(command, cli.config.as_deref())
        }
        None => cli::analysis::run_analysis(&cli::analysis::AnalysisRunOptions {
            paths: cli.paths,
            config: cli.config,
            offline: cli.offline,
            concurrency: cli.concurrency,
            verbose: cli.verbose,
            format: match (cli.json, cli.format) {
                (true, _) | (false, OutputFormat::Json) => cli::analysis::OutputFormat::Json,
                (false, OutputFormat::Human) => cli::analysis::OutputFormat::Human,
            },
        }),
    }
}
