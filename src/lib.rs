use anyhow::Result;
use chrono::Local;
use config::Config;
use serde::Deserialize;
use std::path::PathBuf;

pub mod backup;
pub mod canvas;
pub mod cli;
pub mod display;
pub mod models;
pub mod output;
pub mod roster;

use crate::backup::{backup_all_assignments, backup_single_assignment, merge};
use crate::canvas::CourseApi;
use crate::output::{BackupTarget, resolve_backup_path, write_backup};
use crate::roster::Roster;

/// Runtime settings, read from the optional `config.toml`.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Short names of accounts whose off-roster submissions are skipped
    /// instead of treated as data errors.
    pub excluded_short_names: Vec<String>,
}

impl Settings {
    pub fn is_excluded(&self, short_name: &str) -> bool {
        self.excluded_short_names.iter().any(|name| name == short_name)
    }
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    backup: Settings,
}

/// Loads [`Settings`] from `config.toml` if one exists, falling back to the
/// default exclusion of Canvas's seeded "Test Student" account.
pub fn load_settings() -> Result<Settings> {
    let settings = Config::builder()
        .set_default("backup.excluded_short_names", vec!["Test Student".to_string()])?
        .add_source(config::File::with_name("config").required(false))
        .build()?;

    let file_config: FileConfig = settings.try_deserialize()?;

    Ok(file_config.backup)
}

/// What to back up and where to put it, after CLI validation.
#[derive(Debug)]
pub struct BackupOptions {
    pub course: u64,
    /// A single assignment id, or `None` for all-assignments mode.
    pub assignment: Option<u64>,
    pub outfile: Option<PathBuf>,
}

/// Runs the whole backup pipeline against the given API client and returns
/// the path the CSV was written to.
pub fn run_backup(
    api: &impl CourseApi,
    options: &BackupOptions,
    settings: &Settings,
) -> Result<PathBuf> {
    let roster = Roster::build(api, options.course)?;

    let backups = match options.assignment {
        Some(assignment_id) => {
            let assignment = api.assignment(options.course, assignment_id)?;
            vec![backup_single_assignment(
                api,
                options.course,
                &assignment,
                &roster,
                settings,
            )?]
        }
        None => backup_all_assignments(api, options.course, &roster, settings)?,
    };

    display::show_backup_summary(&backups);

    let target = match options.assignment {
        Some(_) => BackupTarget::Assignment(&backups[0].assignment.name),
        None => BackupTarget::All,
    };
    let path = resolve_backup_path(
        options.outfile.as_deref(),
        options.course,
        target,
        Local::now(),
    );

    write_backup(&path, &merge(&backups))?;

    Ok(path)
}
