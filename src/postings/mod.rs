// Posting models — the records that flow from the job source through the
// pipeline and into the persisted posting table.
//
// A RawPosting is whatever the job source handed us; every field may be
// missing. Converting it into a Posting is the one place where required
// fields are enforced, so a bad record becomes a SkipReason instead of an
// aborted run.

pub mod table;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A posting as yielded by the job source. Column names match the posting table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPosting {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Company", default)]
    pub company: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Experience", default)]
    pub experience: Option<String>,
    #[serde(rename = "Summary", default)]
    pub summary: Option<String>,
    #[serde(rename = "Skills", default)]
    pub skills: Option<String>,
}

/// One job listing. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub experience: String,
    pub summary: String,
    /// Comma-separated skill list as published. May be empty.
    pub raw_skills: String,
}

/// A posting with its derived cluster label (None until predicted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledPosting {
    pub posting: Posting,
    pub cluster: Option<usize>,
}

impl LabeledPosting {
    pub fn unlabeled(posting: Posting) -> Self {
        Self {
            posting,
            cluster: None,
        }
    }
}

/// Why a unit of ingestion work was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A single record lacked a required field.
    MissingField(&'static str),
    /// A whole page failed to fetch or parse.
    PageFailed { page: u32, error: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing required field '{field}'"),
            SkipReason::PageFailed { page, error } => write!(f, "page {page} failed: {error}"),
        }
    }
}

/// Take a required field, treating blank strings as missing.
fn required(value: Option<String>, field: &'static str) -> Result<String, SkipReason> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(SkipReason::MissingField(field)),
    }
}

impl TryFrom<RawPosting> for Posting {
    type Error = SkipReason;

    fn try_from(raw: RawPosting) -> Result<Self, Self::Error> {
        Ok(Posting {
            title: required(raw.title, "Title")?,
            company: required(raw.company, "Company")?,
            location: required(raw.location, "Location")?,
            experience: required(raw.experience, "Experience")?,
            summary: raw.summary.unwrap_or_default().trim().to_string(),
            raw_skills: raw.skills.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: Option<&str>, skills: Option<&str>) -> RawPosting {
        RawPosting {
            title: title.map(String::from),
            company: Some("Acme".to_string()),
            location: Some("Pune".to_string()),
            experience: Some("2-4 years".to_string()),
            summary: None,
            skills: skills.map(String::from),
        }
    }

    #[test]
    fn test_missing_title_is_skipped() {
        let err = Posting::try_from(raw(None, Some("Python"))).unwrap_err();
        assert_eq!(err, SkipReason::MissingField("Title"));
        assert_eq!(err.to_string(), "missing required field 'Title'");
    }

    #[test]
    fn test_blank_title_is_skipped() {
        let err = Posting::try_from(raw(Some("   "), Some("Python"))).unwrap_err();
        assert_eq!(err, SkipReason::MissingField("Title"));
    }

    #[test]
    fn test_optional_fields_default_to_empty() {
        let posting = Posting::try_from(raw(Some("Data Scientist"), None)).unwrap();
        assert_eq!(posting.summary, "");
        assert_eq!(posting.raw_skills, "");
    }
}
