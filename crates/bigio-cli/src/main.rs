use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use bigio_cli::{Commands, OutputFormat, commands};

#[derive(Parser)]
#[command(
    name = "bigio",
    about = "Inspect, read and sort fixed-size records in large memory-mapped files",
    version,
    author,
    long_about = "A command-line tool for files larger than a single memory mapping. Files are mapped whole or in power-of-two segments, and fixed-size records are sorted in place."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::default().add_directive(Level::from(cli.log_level).into())
        }))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { file, map } => commands::info::handle(&file, &map, cli.format)?,
        Commands::Get {
            file,
            pos,
            width,
            map,
        } => commands::get::handle(&file, pos, width, &map, cli.format)?,
        Commands::Sort(args) => commands::sort::handle(&args, cli.format)?,
        Commands::Verify(args) => commands::verify::handle(&args, cli.format)?,
    }

    Ok(())
}
