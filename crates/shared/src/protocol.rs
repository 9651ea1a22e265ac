use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Author, ExperienceLevel, InterviewId, InterviewStatus, InterviewSummary, OwnedInterviewSummary,
};

/// Filter parameters carried to the list endpoint as a query string.
/// Unset axes are omitted entirely rather than sent empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterviewFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<ExperienceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl InterviewFilter {
    pub fn is_unfiltered(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initials: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    #[serde(rename = "_id", default)]
    pub id: InterviewId,
    pub company: String,
    pub role: String,
    pub level: ExperienceLevel,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorDetail>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub comments: Option<u64>,
    #[serde(default)]
    pub experience: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedInterviewRecord {
    #[serde(rename = "_id", default)]
    pub id: InterviewId,
    pub company: String,
    pub role: String,
    pub level: ExperienceLevel,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub comments: Option<u64>,
}

// Default substitution happens here, once, so render layers never see the
// raw optional wire shape.

impl From<InterviewRecord> for InterviewSummary {
    fn from(record: InterviewRecord) -> Self {
        let initials = record.author.and_then(|detail| detail.initials);
        Self {
            id: record.id,
            company: record.company,
            role: record.role,
            level: record.level,
            tags: record.tags,
            author: Author::from_wire(record.author_name, initials, record.author_avatar),
            created_at: record.created_at,
            likes: record.likes.unwrap_or(0),
            comments: record.comments.unwrap_or(0),
            experience: record.experience,
        }
    }
}

impl From<OwnedInterviewRecord> for OwnedInterviewSummary {
    fn from(record: OwnedInterviewRecord) -> Self {
        Self {
            id: record.id,
            company: record.company,
            role: record.role,
            level: record.level,
            status: record.status,
            created_at: record.created_at,
            views: record.views.unwrap_or(0),
            likes: record.likes.unwrap_or(0),
            comments: record.comments.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_apply_at_the_model_boundary() {
        let record: InterviewRecord = serde_json::from_str(
            r#"{
                "_id": "abc",
                "company": "Acme",
                "role": "SWE",
                "level": "Mid",
                "createdAt": "2024-01-01T00:00:00Z"
            }"#,
        )
        .expect("record");

        let summary = InterviewSummary::from(record);
        assert_eq!(summary.id.as_str(), "abc");
        assert_eq!(summary.likes, 0);
        assert_eq!(summary.comments, 0);
        assert!(summary.tags.is_empty());
        assert!(summary.author.is_anonymous());
        assert!(summary.experience.is_none());
    }

    #[test]
    fn record_without_identity_still_deserializes() {
        let record: InterviewRecord = serde_json::from_str(
            r#"{
                "company": "Acme",
                "role": "SWE",
                "level": "Senior",
                "createdAt": "2024-01-01T00:00:00Z"
            }"#,
        )
        .expect("record");
        assert!(record.id.is_empty());
    }

    #[test]
    fn nested_author_detail_feeds_initials() {
        let record: InterviewRecord = serde_json::from_str(
            r#"{
                "_id": "abc",
                "company": "Acme",
                "role": "SWE",
                "level": "Junior",
                "authorName": "Priya Kumar",
                "authorAvatar": "https://cdn.example/p.png",
                "author": {"name": "Priya Kumar", "initials": "PK"},
                "createdAt": "2024-01-01T00:00:00Z",
                "likes": 3,
                "comments": 1
            }"#,
        )
        .expect("record");

        let summary = InterviewSummary::from(record);
        assert_eq!(summary.author.display_name(), "Priya Kumar");
        assert_eq!(summary.author.initials(), Some("PK"));
        assert_eq!(summary.likes, 3);
    }

    #[test]
    fn owned_record_parses_status_and_defaults_counters() {
        let record: OwnedInterviewRecord = serde_json::from_str(
            r#"{
                "_id": "abc",
                "company": "Acme",
                "role": "SWE",
                "level": "Mid",
                "status": "pending",
                "createdAt": "2024-01-01T00:00:00Z"
            }"#,
        )
        .expect("record");

        assert_eq!(record.status, InterviewStatus::Pending);
        let summary = OwnedInterviewSummary::from(record);
        assert_eq!(summary.views, 0);
        assert_eq!(summary.status.badge_label(), "Under Review");
    }

    #[test]
    fn unset_filter_axes_are_omitted_from_the_query() {
        let filter = InterviewFilter {
            company: Some("Acme".to_string()),
            level: Some(ExperienceLevel::Mid),
            ..InterviewFilter::default()
        };
        let query = serde_json::to_value(&filter).expect("filter");
        assert_eq!(query["company"], "Acme");
        assert_eq!(query["level"], "Mid");
        assert!(query.get("role").is_none());
        assert!(!filter.is_unfiltered());
        assert!(InterviewFilter::default().is_unfiltered());
    }
}
