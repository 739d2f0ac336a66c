//! Builds the course roster and the id lookup tables used to join submissions
//! back to students.

use crate::canvas::CourseApi;

use anyhow::{Result, bail};
use std::collections::HashMap;

type SisId = String;

/// The CSV field names Canvas requires for a gradebook re-import, in order.
pub const ROSTER_FIELDS: [&str; 5] = ["Student", "ID", "SIS User ID", "SIS Login ID", "Section"];

/// One enrolled student's identity row in the backup.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    /// Sortable display name, e.g. `"Doe, Jane"`.
    pub student: String,
    /// Canvas-internal user id.
    pub id: u64,
    pub sis_user_id: SisId,
    pub login_id: String,
    pub section: String,
}

impl RosterEntry {
    /// The entry's values in [`ROSTER_FIELDS`] order.
    pub fn record(&self) -> Vec<String> {
        vec![
            self.student.clone(),
            self.id.to_string(),
            self.sis_user_id.clone(),
            self.login_id.clone(),
            self.section.clone(),
        ]
    }
}

/// The enrolled students of one course, keyed by SIS id, together with both
/// directions of the internal-id / SIS-id mapping. Built once per run and
/// read-only afterward.
#[derive(Debug, Default)]
pub struct Roster {
    students: HashMap<SisId, RosterEntry>,
    id_to_sis: HashMap<u64, SisId>,
    sis_to_id: HashMap<SisId, u64>,
}

impl Roster {
    /// Fetches the course's students and section enrollments and builds the
    /// roster. Enrollments that are not of type `StudentEnrollment` are
    /// ignored; a student enrollment whose SIS id cannot be tied back to the
    /// student listing is a data-consistency error and aborts the run.
    pub fn build(api: &impl CourseApi, course: u64) -> Result<Self> {
        let mut roster = Self::default();

        for student in api.recent_students(course)? {
            if let Some(sis_id) = student.sis_user_id {
                roster.id_to_sis.insert(student.id, sis_id.clone());
                roster.sis_to_id.insert(sis_id, student.id);
            }
        }

        for section in api.sections(course)? {
            for enrollment in api.enrollments(section.id)? {
                if enrollment.kind != "StudentEnrollment" {
                    continue;
                }
                let Some(sis_id) = enrollment.sis_user_id else {
                    bail!(
                        "student enrollment for {} in section {} has no SIS user id",
                        enrollment.user.sortable_name,
                        section.name
                    );
                };
                let Some(&id) = roster.sis_to_id.get(&sis_id) else {
                    bail!("{} not in {:?}", sis_id, roster.known_sis_ids());
                };
                roster.students.insert(
                    sis_id.clone(),
                    RosterEntry {
                        student: enrollment.user.sortable_name,
                        id,
                        sis_user_id: sis_id,
                        login_id: enrollment.user.login_id.unwrap_or_default(),
                        section: section.name.clone(),
                    },
                );
            }
        }

        Ok(roster)
    }

    /// Resolves a Canvas-internal user id to the student's SIS id.
    pub fn sis_for(&self, user_id: u64) -> Option<&str> {
        self.id_to_sis.get(&user_id).map(String::as_str)
    }

    pub fn entry(&self, sis_id: &str) -> Option<&RosterEntry> {
        self.students.get(sis_id)
    }

    /// The known Canvas-internal ids, sorted, for error diagnostics.
    pub fn known_user_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.id_to_sis.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The known SIS ids, sorted, for error diagnostics.
    pub fn known_sis_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sis_to_id.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
