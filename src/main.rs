use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use console::style;
use log::LevelFilter;

use beamer2nb::config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Beamer source to convert
    input: PathBuf,
    /// Notebook file to write
    output: PathBuf,
    /// TOML file with notebook metadata and macro aliases
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print more diagnostics (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path).context("Error loading configuration:")?,
        None => Config::default(),
    };

    let notebook = beamer2nb::convert_file(&cli.input, &cli.output, &config)?;

    println!(
        "{} {} ({} cells)",
        style("Wrote").green().bold(),
        cli.output.display(),
        notebook.cells.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            e.chain()
                .skip(1)
                .for_each(|cause| eprintln!(" {} {}", style("caused by:").bold(), cause));
            ExitCode::FAILURE
        }
    }
}
