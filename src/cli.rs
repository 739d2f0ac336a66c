//! This module contains the command-line interface [`Cli`] parser for the
//! gradebook backup tool.

use clap::Parser;
use std::path::PathBuf;

/// Back up Canvas gradebook scores to a CSV file suitable for re-import.
#[derive(Parser, Debug)]
pub struct Cli {
    /// The Canvas course id.
    pub course: u64,

    /// Your Canvas account token. Falls back to the CANVAS_KEY environment
    /// variable. See:
    /// https://canvas.instructure.com/doc/api/file.oauth.html#manual-token-generation
    #[arg(long = "canvas_key")]
    pub canvas_key: Option<String>,

    /// The URL of your Canvas instance, e.g. https://canvas.jmu.edu/.
    /// Falls back to the CANVAS_URL environment variable.
    #[arg(long = "canvas_url")]
    pub canvas_url: Option<String>,

    /// File to write the backup to. An existing directory gets a generated
    /// timestamped filename inside it.
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,

    /// Back up a single assignment by its Canvas assignment id.
    #[arg(long)]
    pub assignment: Option<u64>,

    /// Back up the scores for all assignments.
    #[arg(long)]
    pub all: bool,
}
