use crate::backup::AssignmentBackup;

use tabled::{Table, Tabled, settings::Style};

/// Pretty prints how many records each assignment contributed to the backup.
pub fn show_backup_summary(backups: &[AssignmentBackup]) {
    #[derive(Tabled)]
    struct SummaryRow {
        assignment: String,
        records: usize,
    }

    let rows: Vec<SummaryRow> = backups
        .iter()
        .map(|backup| SummaryRow {
            assignment: backup.column_label(),
            records: backup.rows.len(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    println!("Backed up:\n{table}");
}
