//! The Canvas REST API client.
//!
//! [`CourseApi`] is the seam between the backup pipeline and the remote API:
//! everything downstream of argument parsing takes `&impl CourseApi`, so tests
//! can drive the pipeline with an in-memory fake. [`Canvas`] is the real
//! implementation speaking HTTP.

use crate::models::{Assignment, Enrollment, Section, Submission, User};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;

/// The course, section, and user operations the backup needs from Canvas.
pub trait CourseApi {
    /// Lists the recently-active students in a course.
    fn recent_students(&self, course: u64) -> Result<Vec<User>>;

    /// Lists the sections of a course.
    fn sections(&self, course: u64) -> Result<Vec<Section>>;

    /// Lists the enrollments of a section, all types included.
    fn enrollments(&self, section: u64) -> Result<Vec<Enrollment>>;

    /// Fetches a single assignment by id.
    fn assignment(&self, course: u64, assignment: u64) -> Result<Assignment>;

    /// Lists every assignment in a course.
    fn assignments(&self, course: u64) -> Result<Vec<Assignment>>;

    /// Lists every submission for an assignment.
    fn submissions(&self, course: u64, assignment: u64) -> Result<Vec<Submission>>;

    /// Fetches a single user by their Canvas-internal id.
    fn user(&self, user: u64) -> Result<User>;
}

/// A blocking client for one Canvas instance, authenticated with an API token.
pub struct Canvas {
    base_url: String,
    token: String,
    http: Client,
}

impl Canvas {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            http: Client::new(),
        }
    }

    fn get_object<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/api/v1/{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("GET {url}"))?;
        response.json().with_context(|| format!("decoding {url}"))
    }

    /// Fetches a list endpoint, following `Link: rel="next"` pages until the
    /// server stops handing them out.
    fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut url = format!("{}/api/v1/{path}?per_page=100", self.base_url);
        let mut items = Vec::new();
        loop {
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .and_then(|r| r.error_for_status())
                .with_context(|| format!("GET {url}"))?;
            let next = next_page(response.headers());
            let mut page: Vec<T> =
                response.json().with_context(|| format!("decoding {url}"))?;
            items.append(&mut page);
            match next {
                Some(next_url) => url = next_url,
                None => return Ok(items),
            }
        }
    }
}

impl CourseApi for Canvas {
    fn recent_students(&self, course: u64) -> Result<Vec<User>> {
        self.get_list(&format!("courses/{course}/recent_students"))
    }

    fn sections(&self, course: u64) -> Result<Vec<Section>> {
        self.get_list(&format!("courses/{course}/sections"))
    }

    fn enrollments(&self, section: u64) -> Result<Vec<Enrollment>> {
        self.get_list(&format!("sections/{section}/enrollments"))
    }

    fn assignment(&self, course: u64, assignment: u64) -> Result<Assignment> {
        self.get_object(&format!("courses/{course}/assignments/{assignment}"))
    }

    fn assignments(&self, course: u64) -> Result<Vec<Assignment>> {
        self.get_list(&format!("courses/{course}/assignments"))
    }

    fn submissions(&self, course: u64, assignment: u64) -> Result<Vec<Submission>> {
        self.get_list(&format!(
            "courses/{course}/assignments/{assignment}/submissions"
        ))
    }

    fn user(&self, user: u64) -> Result<User> {
        self.get_object(&format!("users/{user}"))
    }
}

/// Extracts the `rel="next"` URL from a Canvas pagination `Link` header.
fn next_page(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (url, rel) = part.split_once(';')?;
        rel.contains("rel=\"next\"")
            .then(|| url.trim().trim_start_matches('<').trim_end_matches('>').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn next_page_finds_the_next_relation() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://canvas.test/api/v1/courses/1/assignments?page=2&per_page=100>; rel=\"next\", \
                 <https://canvas.test/api/v1/courses/1/assignments?page=1&per_page=100>; rel=\"first\"",
            ),
        );

        assert_eq!(
            next_page(&headers).as_deref(),
            Some("https://canvas.test/api/v1/courses/1/assignments?page=2&per_page=100")
        );
    }

    #[test]
    fn next_page_is_none_on_the_last_page() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://canvas.test/api/v1/courses/1/assignments?page=1>; rel=\"current\"",
            ),
        );

        assert_eq!(next_page(&headers), None);
        assert_eq!(next_page(&HeaderMap::new()), None);
    }
}
