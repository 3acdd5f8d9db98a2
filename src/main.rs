//! seqview - Terminal Sequence Viewer
//!
//! Displays one protein or nucleotide sequence with layered highlights and
//! mouse-driven range selection.
//!
//! ## Usage
//!
//! ```bash
//! seqview <sequence_file>
//! seqview -f pride --cols 60 <sequence_file>
//! seqview --highlight 10:20:white:green --highlight 15:25 <sequence_file>
//! seqview --print <sequence_file>   # Write the layout to stdout
//! ```
//!
//! ## Interaction
//!
//! - Press, drag and release the left button to select residues
//! - `j/k`, arrows, PageUp/PageDown: scroll
//! - `:q`: Quit
//! - `:h`: Help

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use seqview::component::SequenceViewer;
use seqview::config::{HighlightSpec, SequenceConfig, SequenceFormat};
use seqview::controller::run_app;
use seqview::fasta::read_sequence_file;
use seqview::layout::SequenceLayout;
use seqview::logging::{default_log_path, init_file_logging, LOG_ENV};
use seqview::model::Sequence;
use seqview::state::AppState;
use seqview::ui::{glyphs, TerminalCanvas};

/// Runs CLI mode: lay the sequence out and write it to stdout.
fn run_cli_mode(sequence: &Sequence, config: &SequenceConfig, fancy: bool) -> Result<()> {
    let layout = SequenceLayout::build(
        sequence,
        config.format,
        config.columns,
        &config.annotations,
        &glyphs::select(fancy),
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for line in layout.lines() {
        writeln!(handle, "{}", line.text().trim_end())?;
    }
    Ok(())
}

/// Layout format for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Header line, residues in blocks
    Fasta,
    /// Numbered rows under a ruler, ENTRY/SEQUENCE header
    Codata,
    /// Bare residues
    Raw,
    /// Zero padded numbers on both sides of each row
    Pride,
}

impl From<FormatArg> for SequenceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Fasta => SequenceFormat::Fasta,
            FormatArg::Codata => SequenceFormat::Codata,
            FormatArg::Raw => SequenceFormat::Raw,
            FormatArg::Pride => SequenceFormat::Pride,
        }
    }
}

/// seqview - A terminal viewer for a single biological sequence
///
/// Opens an interactive viewer by default. With --print, writes the laid out
/// sequence to stdout instead.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sequence file (FASTA, or bare residues)
    file: PathBuf,

    /// Record to display when the file holds several sequences (1-based)
    #[arg(short = 'r', long = "record", default_value = "1")]
    record: usize,

    /// Layout format (overrides the config file)
    #[arg(short = 'f', long = "format", value_enum)]
    format: Option<FormatArg>,

    /// Residues per row (overrides the config file)
    #[arg(short = 'c', long = "cols")]
    cols: Option<usize>,

    /// Blank inserted every N residues, 0 disables (overrides the config file)
    #[arg(long = "spaced-each")]
    spaced_each: Option<usize>,

    /// TOML configuration file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Highlight START:END[:FG[:BG]], may be repeated
    #[arg(long = "highlight", value_name = "START:END[:FG[:BG]]")]
    highlight: Vec<HighlightSpec>,

    /// Use box drawing characters for annotation marks
    #[arg(long = "fancy")]
    fancy: bool,

    /// Write the layout to stdout and exit
    #[arg(short = 'p', long = "print")]
    print: bool,

    /// Write a log file (see also the SEQVIEW_LOG environment variable)
    #[arg(long = "log")]
    log: bool,

    /// Log file path (implies --log)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Log level
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

/// Merges the config file and command line overrides.
fn load_config(args: &Args) -> Result<SequenceConfig> {
    let mut config = match &args.config {
        Some(path) => SequenceConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SequenceConfig::default(),
    };

    if let Some(format) = args.format {
        config.format = format.into();
    }
    if let Some(cols) = args.cols {
        config.columns.size = cols;
    }
    if let Some(spaced_each) = args.spaced_each {
        config.columns.spaced_each = spaced_each;
    }
    config.highlights.extend(args.highlight.iter().cloned());
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.record == 0 {
        anyhow::bail!("Record numbers start at 1");
    }

    let config = load_config(&args)?;
    let sequence = read_sequence_file(&args.file, args.record - 1)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    // CLI mode: layout to stdout
    if args.print {
        return run_cli_mode(&sequence, &config, args.fancy);
    }

    let log_path = if args.log || args.log_file.is_some() || std::env::var_os(LOG_ENV).is_some() {
        let path = args.log_file.clone().unwrap_or_else(default_log_path);
        init_file_logging(&path, &args.log_level)?;
        Some(path)
    } else {
        None
    };

    let viewer = SequenceViewer::with_glyphs(
        sequence,
        config,
        TerminalCanvas::new(),
        glyphs::select(args.fancy),
    )?;
    run_app(AppState::new(viewer))?;

    if let Some(path) = log_path {
        eprintln!("Log written to {}", path.display());
    }
    Ok(())
}
