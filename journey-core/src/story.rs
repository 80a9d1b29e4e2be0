//! Story records and the drafts they are built from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signature used when a submitter leaves the author field blank.
pub const DEFAULT_AUTHOR: &str = "广东外语外贸大学某校友";

/// The submitter's relationship to the university.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Identity {
    Student,
    Alumni,
    Faculty,
}

impl Identity {
    pub fn all() -> &'static [Identity] {
        &[Identity::Student, Identity::Alumni, Identity::Faculty]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Identity::Student => "student",
            Identity::Alumni => "alumni",
            Identity::Faculty => "faculty",
        }
    }

    /// Short badge text shown on wall cards and filter buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Identity::Student => "在校生",
            Identity::Alumni => "校友",
            Identity::Faculty => "老师",
        }
    }

    /// Longer wording used by the submission form picker.
    pub fn form_label(&self) -> &'static str {
        match self {
            Identity::Student => "在校学生",
            Identity::Alumni => "校友",
            Identity::Faculty => "教职员工 (老师)",
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown identity name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown identity '{0}' (expected student, alumni or faculty)")]
pub struct ParseIdentityError(pub String);

impl FromStr for Identity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Identity::Student),
            "alumni" => Ok(Identity::Alumni),
            "faculty" => Ok(Identity::Faculty),
            other => Err(ParseIdentityError(other.to_string())),
        }
    }
}

/// Opaque story identifier, assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A completed submission that has not yet been given an id or date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub identity: Identity,
    pub college: String,
    pub graduation_year: String,
    pub target_person: String,
    pub content: String,
    /// Data URL of the attached photo, if any.
    pub image: Option<String>,
    pub author: String,
}

/// One persisted testimonial.
///
/// Field names serialize in camelCase so the stored array stays readable by
/// anything that already wrote to the same storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub identity: Identity,
    pub college: String,
    /// Year of graduation (or expected), free text.
    pub graduation_year: String,
    /// The person the story is written to.
    pub target_person: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub author: String,
    pub date: NaiveDate,
}

impl Story {
    pub fn from_draft(id: StoryId, date: NaiveDate, draft: Draft) -> Self {
        Self {
            id,
            identity: draft.identity,
            college: draft.college,
            graduation_year: draft.graduation_year,
            target_person: draft.target_person,
            content: draft.content,
            image: draft.image,
            author: draft.author,
            date,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_story() -> Story {
        Story::from_draft(
            StoryId::new("1700000000000"),
            NaiveDate::from_ymd_opt(2024, 9, 10).unwrap(),
            Draft {
                identity: Identity::Alumni,
                college: "新闻与传播学院".to_string(),
                graduation_year: "2018".to_string(),
                target_person: "王老师".to_string(),
                content: "谢谢您。".to_string(),
                image: None,
                author: DEFAULT_AUTHOR.to_string(),
            },
        )
    }

    #[test]
    fn test_identity_parse() {
        assert_eq!("faculty".parse::<Identity>(), Ok(Identity::Faculty));
        assert_eq!(" Alumni ".parse::<Identity>(), Ok(Identity::Alumni));
        assert!("dean".parse::<Identity>().is_err());
    }

    #[test]
    fn test_story_json_field_names() {
        let json = serde_json::to_value(sample_story()).unwrap();
        assert_eq!(json["identity"], "alumni");
        assert_eq!(json["graduationYear"], "2018");
        assert_eq!(json["targetPerson"], "王老师");
        assert_eq!(json["date"], "2024-09-10");
        assert_eq!(json["id"], "1700000000000");
        // Absent images are omitted rather than written as null
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_story_reads_stored_layout() {
        let raw = r#"{
            "id": "1718000000000",
            "identity": "student",
            "college": "国际商务英语学院",
            "graduationYear": "2025",
            "targetPerson": "李同学",
            "content": "一起熬过的期末周",
            "image": "data:image/png;base64,AAAA",
            "author": "小林",
            "date": "2024-06-10"
        }"#;
        let story: Story = serde_json::from_str(raw).unwrap();
        assert_eq!(story.identity, Identity::Student);
        assert!(story.has_image());
        assert_eq!(story.date.to_string(), "2024-06-10");
    }
}
