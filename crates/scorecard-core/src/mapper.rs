//! Header → canonical field mapping.
//!
//! Each canonical field has an ordered list of lower-case tokens; the first
//! header (in source order) containing a token wins, trying tokens in
//! priority order. Matching is plain substring search, so ambiguous headers
//! resolve exactly as the rules below say and nothing more.

use serde::{Deserialize, Serialize};

/// Header names reserved for identity in general uploads.
pub const RESERVED_IDENTITY_HEADERS: [&str; 4] = ["name", "student_id", "id", "student_name"];

const FIRST_NAME_TOKENS: &[&str] = &["first name", "firstname"];
const NAME_TOKENS: &[&str] = &["name"];
const MIDDLE_NAME_TOKENS: &[&str] = &["middle name", "middlename"];
const LAST_NAME_TOKENS: &[&str] = &["last name", "lastname", "surname"];
const SIS_ID_TOKENS: &[&str] = &["sis id"];
const STUDENT_NUMBER_TOKENS: &[&str] = &["student number"];
const USERNAME_TOKENS: &[&str] = &["username"];
const TOTAL_QUESTIONS_TOKENS: &[&str] = &["total questions", "out of"];

/// Canonical field → source header lookup built from one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub student_name: Option<String>,
    pub student_id: Option<String>,
    pub score: Option<String>,
    pub total_questions: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub sis_id: Option<String>,
    pub student_number: Option<String>,
    pub username: Option<String>,
    /// General mode: every non-identity header, used directly as a grade column.
    pub subject_columns: Vec<String>,
}

impl FieldMap {
    /// Build the map from a header row. Pure; the headers are not modified.
    pub fn from_headers(headers: &[String]) -> Self {
        let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

        let find = |tokens: &[&str]| -> Option<String> {
            tokens.iter().find_map(|token| {
                lowered
                    .iter()
                    .position(|h| h.contains(token))
                    .map(|i| headers[i].clone())
            })
        };

        let first_name = find(FIRST_NAME_TOKENS);
        let student_name = first_name.clone().or_else(|| find(NAME_TOKENS));

        let sis_id = find(SIS_ID_TOKENS);
        let student_number = find(STUDENT_NUMBER_TOKENS);
        let username = find(USERNAME_TOKENS);
        let student_id = sis_id
            .clone()
            .or_else(|| student_number.clone())
            .or_else(|| username.clone());

        let score = lowered
            .iter()
            .position(|h| h.contains("score") && !h.contains('%'))
            .map(|i| headers[i].clone());

        let subject_columns = headers
            .iter()
            .zip(&lowered)
            .filter(|(_, l)| !RESERVED_IDENTITY_HEADERS.contains(&l.as_str()))
            .map(|(h, _)| h.clone())
            .collect();

        let map = Self {
            student_name,
            student_id,
            score,
            total_questions: find(TOTAL_QUESTIONS_TOKENS),
            first_name,
            middle_name: find(MIDDLE_NAME_TOKENS),
            last_name: find(LAST_NAME_TOKENS),
            sis_id,
            student_number,
            username,
            subject_columns,
        };
        tracing::debug!(?map, "mapped headers");
        map
    }

    /// `true` when any of the name-part columns resolved.
    pub fn has_name_parts(&self) -> bool {
        self.first_name.is_some() || self.middle_name.is_some() || self.last_name.is_some()
    }
}

/// `true` if `header` is one of the reserved identity headers.
pub fn is_identity_header(header: &str) -> bool {
    RESERVED_IDENTITY_HEADERS.contains(&header.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_name_beats_generic_name() {
        let map = FieldMap::from_headers(&headers(&["Last Name", "First Name", "Score"]));
        assert_eq!(map.student_name.as_deref(), Some("First Name"));
        assert_eq!(map.last_name.as_deref(), Some("Last Name"));
    }

    #[test]
    fn generic_name_fallback() {
        let map = FieldMap::from_headers(&headers(&["Student Name", "Score"]));
        assert_eq!(map.student_name.as_deref(), Some("Student Name"));
        assert!(!map.has_name_parts());
    }

    #[test]
    fn student_id_priority_order() {
        let map = FieldMap::from_headers(&headers(&["Username", "Student Number", "SIS ID"]));
        assert_eq!(map.student_id.as_deref(), Some("SIS ID"));

        let map = FieldMap::from_headers(&headers(&["Username", "Student Number"]));
        assert_eq!(map.student_id.as_deref(), Some("Student Number"));

        let map = FieldMap::from_headers(&headers(&["Username"]));
        assert_eq!(map.student_id.as_deref(), Some("Username"));
    }

    #[test]
    fn score_skips_percentage_columns() {
        let map = FieldMap::from_headers(&headers(&["Name", "Score %", "Raw Score"]));
        assert_eq!(map.score.as_deref(), Some("Raw Score"));

        let map = FieldMap::from_headers(&headers(&["Name", "Score %"]));
        assert!(map.score.is_none());
    }

    #[test]
    fn substring_matching_is_not_second_guessed() {
        let map = FieldMap::from_headers(&headers(&["username_score_backup", "Score"]));
        assert_eq!(map.score.as_deref(), Some("username_score_backup"));
        assert_eq!(map.student_name.as_deref(), Some("username_score_backup"));
    }

    #[test]
    fn general_subject_columns_exclude_identity() {
        let map = FieldMap::from_headers(&headers(&["Name", "student_id", "ID", "math", "english"]));
        assert_eq!(map.subject_columns, vec!["math", "english"]);
        assert!(is_identity_header("Student_Name"));
        assert!(!is_identity_header("math"));
    }

    #[test]
    fn mapping_is_repeatable() {
        let h = headers(&["First Name", "Last Name", "SIS ID", "Score"]);
        assert_eq!(FieldMap::from_headers(&h), FieldMap::from_headers(&h));
    }
}
