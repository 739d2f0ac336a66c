//! The backup pipeline: per-assignment score collection and the merge into
//! one row per student.

use crate::Settings;
use crate::canvas::CourseApi;
use crate::models::{Assignment, Submission};
use crate::roster::{Roster, RosterEntry};

use anyhow::{Result, bail};
use std::collections::{BTreeMap, HashMap};

/// One student's score for one assignment, joined to their roster identity.
#[derive(Debug, Clone)]
pub struct ScoreRow {
    pub entry: RosterEntry,
    /// The rendered score cell. Empty when the submission is flagged missing
    /// or has no score yet.
    pub score: String,
}

/// Every resolvable submission for one assignment, sorted by display name.
#[derive(Debug)]
pub struct AssignmentBackup {
    pub assignment: Assignment,
    pub rows: Vec<ScoreRow>,
}

impl AssignmentBackup {
    pub fn column_label(&self) -> String {
        self.assignment.column_label()
    }
}

/// The final table: one row per SIS id, one score column per assignment, with
/// columns in assignment processing order.
#[derive(Debug)]
pub struct MergedTable {
    pub columns: Vec<String>,
    pub rows: Vec<MergedRow>,
}

#[derive(Debug)]
pub struct MergedRow {
    pub entry: RosterEntry,
    /// Column label to score cell. A student with no submission for an
    /// assignment simply has no entry here; the writer fills the blank.
    pub scores: HashMap<String, String>,
}

/// Backs up the scores of a single assignment.
///
/// Submissions from users absent from the roster are fatal unless the user's
/// short name is on the configured exclusion list (by default the seeded
/// "Test Student"), in which case they are skipped silently.
pub fn backup_single_assignment(
    api: &impl CourseApi,
    course: u64,
    assignment: &Assignment,
    roster: &Roster,
    settings: &Settings,
) -> Result<AssignmentBackup> {
    let mut rows = Vec::new();

    for submission in api.submissions(course, assignment.id)? {
        let Some(sis_id) = roster.sis_for(submission.user_id) else {
            let submitter = api.user(submission.user_id)?;
            if settings.is_excluded(&submitter.short_name) {
                continue;
            }
            bail!(
                "{} not in {:?}\nfor submission {}\nfor assignment {}",
                submission.user_id,
                roster.known_user_ids(),
                submission.id,
                assignment.id
            );
        };
        let Some(entry) = roster.entry(sis_id) else {
            bail!("{} not in {:?}", sis_id, roster.known_sis_ids());
        };
        rows.push(ScoreRow {
            entry: entry.clone(),
            score: render_score(&submission),
        });
    }

    rows.sort_by(|a, b| a.entry.student.cmp(&b.entry.student));

    Ok(AssignmentBackup {
        assignment: assignment.clone(),
        rows,
    })
}

/// Backs up every assignment in the course, in the order Canvas lists them.
/// Assignment names are not deduplicated; the id in each column label keeps
/// colliding names distinct.
pub fn backup_all_assignments(
    api: &impl CourseApi,
    course: u64,
    roster: &Roster,
    settings: &Settings,
) -> Result<Vec<AssignmentBackup>> {
    let mut backups = Vec::new();
    for assignment in api.assignments(course)? {
        backups.push(backup_single_assignment(
            api, course, &assignment, roster, settings,
        )?);
    }
    Ok(backups)
}

/// Unions the per-assignment backups into one row per SIS id. The column set
/// is the explicit union over all backups, so rows that miss an assignment
/// still serialize with an empty cell for it.
pub fn merge(backups: &[AssignmentBackup]) -> MergedTable {
    let columns: Vec<String> = backups.iter().map(AssignmentBackup::column_label).collect();

    let mut by_sis_id: BTreeMap<String, MergedRow> = BTreeMap::new();
    for backup in backups {
        let column = backup.column_label();
        for row in &backup.rows {
            by_sis_id
                .entry(row.entry.sis_user_id.clone())
                .or_insert_with(|| MergedRow {
                    entry: row.entry.clone(),
                    scores: HashMap::new(),
                })
                .scores
                .insert(column.clone(), row.score.clone());
        }
    }

    let mut rows: Vec<MergedRow> = by_sis_id.into_values().collect();
    rows.sort_by(|a, b| a.entry.student.cmp(&b.entry.student));

    MergedTable { columns, rows }
}

/// Renders a submission's score cell. A missing submission is always blank,
/// whatever its score field says.
fn render_score(submission: &Submission) -> String {
    if submission.missing {
        return String::new();
    }
    submission
        .score
        .map(|score| score.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Enrollment, EnrollmentUser, Section, User};

    struct FakeApi {
        students: Vec<User>,
        enrollments: Vec<Enrollment>,
        assignments: Vec<Assignment>,
        submissions: Vec<Submission>,
        extra_users: Vec<User>,
    }

    impl CourseApi for FakeApi {
        fn recent_students(&self, _course: u64) -> anyhow::Result<Vec<User>> {
            Ok(self.students.clone())
        }

        fn sections(&self, _course: u64) -> anyhow::Result<Vec<Section>> {
            Ok(vec![Section {
                id: 1,
                name: "Section A".to_string(),
            }])
        }

        fn enrollments(&self, _section: u64) -> anyhow::Result<Vec<Enrollment>> {
            Ok(self.enrollments.clone())
        }

        fn assignment(&self, _course: u64, assignment: u64) -> anyhow::Result<Assignment> {
            Ok(self
                .assignments
                .iter()
                .find(|a| a.id == assignment)
                .cloned()
                .unwrap())
        }

        fn assignments(&self, _course: u64) -> anyhow::Result<Vec<Assignment>> {
            Ok(self.assignments.clone())
        }

        fn submissions(&self, _course: u64, assignment: u64) -> anyhow::Result<Vec<Submission>> {
            // Fake data carries the assignment id in the submission id's high
            // digits to keep one flat list.
            Ok(self
                .submissions
                .iter()
                .filter(|s| s.id / 1000 == assignment)
                .cloned()
                .collect())
        }

        fn user(&self, user: u64) -> anyhow::Result<User> {
            self.students
                .iter()
                .chain(self.extra_users.iter())
                .find(|u| u.id == user)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no such user {user}"))
        }
    }

    fn fake_course() -> FakeApi {
        let student = |id: u64, sis: &str, name: &str, login: &str| User {
            id,
            sis_user_id: Some(sis.to_string()),
            sortable_name: name.to_string(),
            short_name: login.to_string(),
            login_id: Some(login.to_string()),
        };
        let enrollment = |sis: &str, name: &str, login: &str| Enrollment {
            kind: "StudentEnrollment".to_string(),
            sis_user_id: Some(sis.to_string()),
            user: EnrollmentUser {
                sortable_name: name.to_string(),
                login_id: Some(login.to_string()),
            },
        };

        FakeApi {
            students: vec![
                student(10, "S1", "Zebra, Zoe", "zoe"),
                student(20, "S2", "Apple, Alice", "alice"),
            ],
            enrollments: vec![
                enrollment("S1", "Zebra, Zoe", "zoe"),
                enrollment("S2", "Apple, Alice", "alice"),
            ],
            assignments: vec![
                Assignment {
                    id: 9,
                    name: "HW1".to_string(),
                },
                Assignment {
                    id: 11,
                    name: "Lab 1".to_string(),
                },
            ],
            submissions: vec![
                Submission {
                    id: 9001,
                    user_id: 10,
                    score: Some(80.0),
                    missing: false,
                },
                Submission {
                    id: 9002,
                    user_id: 20,
                    score: Some(55.0),
                    missing: true,
                },
                Submission {
                    id: 11001,
                    user_id: 20,
                    score: Some(92.5),
                    missing: false,
                },
            ],
            extra_users: Vec::new(),
        }
    }

    fn settings() -> Settings {
        Settings {
            excluded_short_names: vec!["Test Student".to_string()],
        }
    }

    #[test]
    fn single_assignment_rows_are_sorted_by_student_name() {
        let api = fake_course();
        let roster = Roster::build(&api, 42).unwrap();
        let assignment = api.assignment(42, 9).unwrap();

        let backup =
            backup_single_assignment(&api, 42, &assignment, &roster, &settings()).unwrap();

        assert_eq!(backup.column_label(), "HW1 (9)");
        let names: Vec<&str> = backup.rows.iter().map(|r| r.entry.student.as_str()).collect();
        assert_eq!(names, ["Apple, Alice", "Zebra, Zoe"]);
    }

    #[test]
    fn missing_submission_scores_are_blank_regardless_of_score() {
        let api = fake_course();
        let roster = Roster::build(&api, 42).unwrap();
        let assignment = api.assignment(42, 9).unwrap();

        let backup =
            backup_single_assignment(&api, 42, &assignment, &roster, &settings()).unwrap();

        assert_eq!(backup.rows[0].score, "");
        assert_eq!(backup.rows[1].score, "80");
    }

    #[test]
    fn ungraded_submission_renders_an_empty_cell() {
        let mut api = fake_course();
        api.submissions.push(Submission {
            id: 11002,
            user_id: 10,
            score: None,
            missing: false,
        });
        let roster = Roster::build(&api, 42).unwrap();
        let assignment = api.assignment(42, 11).unwrap();

        let backup =
            backup_single_assignment(&api, 42, &assignment, &roster, &settings()).unwrap();

        let zoe = backup
            .rows
            .iter()
            .find(|r| r.entry.student == "Zebra, Zoe")
            .unwrap();
        assert_eq!(zoe.score, "");
    }

    #[test]
    fn excluded_short_names_are_skipped_silently() {
        let mut api = fake_course();
        api.submissions.push(Submission {
            id: 9003,
            user_id: 77,
            score: None,
            missing: false,
        });
        api.extra_users.push(User {
            id: 77,
            sis_user_id: None,
            sortable_name: "Student, Test".to_string(),
            short_name: "Test Student".to_string(),
            login_id: None,
        });
        let roster = Roster::build(&api, 42).unwrap();
        let assignment = api.assignment(42, 9).unwrap();

        let backup =
            backup_single_assignment(&api, 42, &assignment, &roster, &settings()).unwrap();

        assert_eq!(backup.rows.len(), 2);
    }

    #[test]
    fn unknown_submitter_is_fatal() {
        let mut api = fake_course();
        api.submissions.push(Submission {
            id: 9004,
            user_id: 88,
            score: Some(100.0),
            missing: false,
        });
        api.extra_users.push(User {
            id: 88,
            sis_user_id: None,
            sortable_name: "Lurker, Larry".to_string(),
            short_name: "Larry".to_string(),
            login_id: None,
        });
        let roster = Roster::build(&api, 42).unwrap();
        let assignment = api.assignment(42, 9).unwrap();

        let err =
            backup_single_assignment(&api, 42, &assignment, &roster, &settings()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("88"));
        assert!(message.contains("for assignment 9"));
    }

    #[test]
    fn merge_unions_rows_and_keeps_column_order() {
        let api = fake_course();
        let roster = Roster::build(&api, 42).unwrap();

        let backups = backup_all_assignments(&api, 42, &roster, &settings()).unwrap();
        let table = merge(&backups);

        assert_eq!(table.columns, ["HW1 (9)", "Lab 1 (11)"]);
        assert_eq!(table.rows.len(), 2);

        // Alice submitted both, Zoe only HW1.
        let alice = &table.rows[0];
        assert_eq!(alice.entry.sis_user_id, "S2");
        assert_eq!(alice.scores["HW1 (9)"], "");
        assert_eq!(alice.scores["Lab 1 (11)"], "92.5");

        let zoe = &table.rows[1];
        assert_eq!(zoe.entry.sis_user_id, "S1");
        assert_eq!(zoe.scores["HW1 (9)"], "80");
        assert!(!zoe.scores.contains_key("Lab 1 (11)"));
    }

    #[test]
    fn merge_of_one_backup_is_one_row_per_student() {
        let api = fake_course();
        let roster = Roster::build(&api, 42).unwrap();
        let assignment = api.assignment(42, 11).unwrap();

        let backup =
            backup_single_assignment(&api, 42, &assignment, &roster, &settings()).unwrap();
        let table = merge(&[backup]);

        assert_eq!(table.columns, ["Lab 1 (11)"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].entry.student, "Apple, Alice");
    }
}
