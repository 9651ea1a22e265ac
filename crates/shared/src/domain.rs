use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire value the API uses to mark an anonymous author.
pub const ANONYMOUS_AUTHOR_NAME: &str = "Anonymous";

/// Cards show at most this many tags; the rest collapse into an overflow count.
pub const TAG_PREVIEW_LIMIT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterviewId(pub String);

impl InterviewId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for InterviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InterviewId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InterviewId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExperienceLevel {
    Senior,
    Mid,
    Junior,
    Internship,
    Other(String),
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Senior => "Senior",
            Self::Mid => "Mid",
            Self::Junior => "Junior",
            Self::Internship => "Internship",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for ExperienceLevel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Senior" => Self::Senior,
            "Mid" => Self::Mid,
            "Junior" => Self::Junior,
            "Internship" => Self::Internship,
            _ => Self::Other(value),
        }
    }
}

impl From<ExperienceLevel> for String {
    fn from(value: ExperienceLevel) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Draft,
    Published,
    Pending,
}

impl InterviewStatus {
    pub fn badge_label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
            Self::Pending => "Under Review",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author {
    Anonymous,
    Named {
        name: String,
        initials: Option<String>,
        avatar_url: Option<String>,
    },
}

impl Author {
    /// Normalizes the wire author fields once, at model construction.
    /// A missing, empty, or literal-"Anonymous" name collapses to `Anonymous`;
    /// missing initials fall back to the display name's first character.
    pub fn from_wire(
        name: Option<String>,
        initials: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
            return Self::Anonymous;
        };
        if name == ANONYMOUS_AUTHOR_NAME {
            return Self::Anonymous;
        }
        let initials = initials
            .filter(|i| !i.trim().is_empty())
            .or_else(|| name.chars().next().map(|c| c.to_string()));
        Self::Named {
            name,
            initials,
            avatar_url,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Anonymous => ANONYMOUS_AUTHOR_NAME,
            Self::Named { name, .. } => name,
        }
    }

    pub fn initials(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Named { initials, .. } => initials.as_deref(),
        }
    }

    pub fn avatar_url(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Named { avatar_url, .. } => avatar_url.as_deref(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSummary {
    pub id: InterviewId,
    pub company: String,
    pub role: String,
    pub level: ExperienceLevel,
    pub tags: Vec<String>,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub comments: u64,
    pub experience: Option<String>,
}

impl InterviewSummary {
    /// Splits tags into the shown prefix and the count folded into "+N".
    pub fn visible_tags(&self) -> (&[String], usize) {
        let shown = self.tags.len().min(TAG_PREVIEW_LIMIT);
        (&self.tags[..shown], self.tags.len() - shown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedInterviewSummary {
    pub id: InterviewId,
    pub company: String,
    pub role: String,
    pub level: ExperienceLevel,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

impl OwnedInterviewSummary {
    /// Engagement counters are only meaningful for published interviews.
    pub fn shows_engagement(&self) -> bool {
        self.status == InterviewStatus::Published
    }
}

pub trait Identified {
    fn identity(&self) -> &InterviewId;
}

impl Identified for InterviewSummary {
    fn identity(&self) -> &InterviewId {
        &self.id
    }
}

impl Identified for OwnedInterviewSummary {
    fn identity(&self) -> &InterviewId {
        &self.id
    }
}

/// Ordered collection as returned by the server; never re-sorted client-side.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot<T> {
    entries: Vec<T>,
}

impl<T> Default for CollectionSnapshot<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Identified> CollectionSnapshot<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Entries that carry a usable identity; id-less records stay in the
    /// snapshot (and its count) but are skipped when rendering.
    pub fn renderable(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter(|e| !e.identity().is_empty())
    }

    pub fn contains(&self, id: &InterviewId) -> bool {
        self.entries.iter().any(|e| e.identity() == id)
    }

    /// Removes the first entry matching `id`, preserving the relative order
    /// of the remaining entries. Absent ids are a no-op.
    pub fn remove(&mut self, id: &InterviewId) -> Option<T> {
        let index = self.entries.iter().position(|e| e.identity() == id)?;
        Some(self.entries.remove(index))
    }
}
