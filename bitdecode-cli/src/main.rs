//! Command-line front-end for inspecting decode trees.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use bitdecode_gen::emit::StreamPrinter;
use bitdecode_gen::{show_decode_tree, show_size_tree, InputDoc};

#[derive(Parser)]
#[command(name = "bitdecode", about = "Inspect instruction decode trees", version)]
struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the decode tree of an instruction set.
    ShowTree {
        /// YAML file with the pattern definitions.
        input: PathBuf,

        /// Target bit width; patterns are extended to this width.
        #[arg(long, default_value_t = 32)]
        decoder_width: u32,

        /// Write to a file instead of stdout.
        #[arg(long)]
        out_file: Option<PathBuf>,
    },
    /// Render the minimized size tree, or the uniform instruction size.
    ShowSizeTree {
        /// YAML file with the pattern definitions.
        input: PathBuf,

        /// Target bit width; patterns are extended to this width.
        #[arg(long, default_value_t = 32)]
        decoder_width: u32,

        /// Write to a file instead of stdout.
        #[arg(long)]
        out_file: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn load_doc(input: &PathBuf) -> anyhow::Result<InputDoc> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    InputDoc::from_yaml(&text).with_context(|| format!("failed to parse {}", input.display()))
}

fn open_printer(out_file: Option<&PathBuf>) -> anyhow::Result<StreamPrinter<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match out_file {
        Some(path) => Box::new(
            fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    Ok(StreamPrinter::new(sink))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::ShowTree {
            input,
            decoder_width,
            out_file,
        } => {
            let doc = load_doc(input)?;
            let mut printer = open_printer(out_file.as_ref())?;
            show_decode_tree(&doc, *decoder_width, &mut printer)?;
        }
        Command::ShowSizeTree {
            input,
            decoder_width,
            out_file,
        } => {
            let doc = load_doc(input)?;
            let mut printer = open_printer(out_file.as_ref())?;
            show_size_tree(&doc, *decoder_width, &mut printer)?;
        }
    }

    Ok(())
}
