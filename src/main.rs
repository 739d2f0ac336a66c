use anyhow::Result;
use canvas_backup::canvas::Canvas;
use canvas_backup::cli::Cli;
use canvas_backup::{BackupOptions, load_settings, run_backup};
use clap::Parser;
use dotenvy::dotenv;
use std::{env, process};

fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let canvas_key = cli.canvas_key.or_else(|| env::var("CANVAS_KEY").ok());
    let canvas_url = cli.canvas_url.or_else(|| env::var("CANVAS_URL").ok());
    let (Some(canvas_url), Some(canvas_key)) = (canvas_url, canvas_key) else {
        eprintln!(
            "must provide the canvas api key and url via either the optional \
             flags or the environment variables: CANVAS_KEY and CANVAS_URL"
        );
        process::exit(1);
    };

    if cli.all && cli.assignment.is_some() {
        eprintln!("cannot provide both an assignment id and the --all flag");
        process::exit(1);
    }
    if !cli.all && cli.assignment.is_none() {
        eprintln!("must provide either an assignment id or the --all flag");
        process::exit(1);
    }

    let settings = load_settings()?;
    let canvas = Canvas::new(canvas_url, canvas_key);
    let options = BackupOptions {
        course: cli.course,
        assignment: cli.assignment,
        outfile: cli.outfile,
    };

    let path = run_backup(&canvas, &options, &settings)?;
    println!("Wrote backup to {}", path.display());

    Ok(())
}
