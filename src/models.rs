//! Wire types for the Canvas REST API responses this tool consumes.

use serde::Deserialize;

/// A Canvas user, as returned by the course student listing and the
/// user-by-id lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    /// Absent for accounts without an institutional identity, e.g. the
    /// seeded "Test Student".
    pub sis_user_id: Option<String>,
    #[serde(default)]
    pub sortable_name: String,
    #[serde(default)]
    pub short_name: String,
    pub login_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub id: u64,
    pub name: String,
}

/// One enrollment within a section. Only enrollments of type
/// `StudentEnrollment` contribute to the roster.
#[derive(Debug, Clone, Deserialize)]
pub struct Enrollment {
    #[serde(rename = "type")]
    pub kind: String,
    pub sis_user_id: Option<String>,
    pub user: EnrollmentUser,
}

/// The embedded user object carried on each enrollment.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentUser {
    #[serde(default)]
    pub sortable_name: String,
    pub login_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub name: String,
}

impl Assignment {
    /// The column label used for this assignment in the backup CSV. Canvas
    /// re-imports match on this exact `name (id)` form.
    pub fn column_label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub user_id: u64,
    pub score: Option<f64>,
    #[serde(default)]
    pub missing: bool,
}
