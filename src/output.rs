//! CSV serialization and backup path resolution.

use crate::backup::MergedTable;
use crate::roster::ROSTER_FIELDS;

use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// What is being backed up, for the generated filename.
pub enum BackupTarget<'a> {
    All,
    Assignment(&'a str),
}

/// Writes the merged table as a UTF-8 CSV with a header row. Cells for
/// (student, assignment) pairs with no recorded score are written empty.
pub fn write_backup(path: &Path, table: &MergedTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = ROSTER_FIELDS.to_vec();
    header.extend(table.columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = row.entry.record();
        for column in &table.columns {
            record.push(row.scores.get(column).cloned().unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Resolves where the backup lands.
///
/// An explicit path that is not an existing directory is used verbatim. An
/// explicit path naming an existing directory gets a generated filename
/// appended; with no path at all the generated name goes in the current
/// directory. Generated names are
/// `{timestamp}-{course}-ALL.bk.csv` or
/// `{timestamp}-{course}-{assignment name, spaces as underscores}.bk.csv`.
pub fn resolve_backup_path(
    outfile: Option<&Path>,
    course: u64,
    target: BackupTarget,
    now: DateTime<Local>,
) -> PathBuf {
    let directory = match outfile {
        Some(path) if path.is_dir() => path.to_path_buf(),
        Some(path) => return path.to_path_buf(),
        None => PathBuf::new(),
    };

    let timestamp = now.format("%Y-%m-%d-%H-%M-%S");
    let name = match target {
        BackupTarget::All => format!("{timestamp}-{course}-ALL.bk.csv"),
        BackupTarget::Assignment(assignment_name) => {
            format!(
                "{timestamp}-{course}-{}.bk.csv",
                assignment_name.replace(' ', "_")
            )
        }
    };
    directory.join(name)
}
