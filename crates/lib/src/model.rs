//! Domain types: bills, their AI analysis, votes, and discussion messages.
//!
//! Everything here is plain data. Values reach these types only through the gateway's
//! validation boundary or through the state modules; nothing is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Legislative status of a bill as reported by search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    Passed,
    InProcess,
    Appealed,
    Announced,
}

impl BillStatus {
    /// Parse the loose labels the generation service emits ("In Process", "passed", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "passed" => Some(Self::Passed),
            "inprocess" => Some(Self::InProcess),
            "appealed" => Some(Self::Appealed),
            "announced" => Some(Self::Announced),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::InProcess => "In Process",
            Self::Appealed => "Appealed",
            Self::Announced => "Announced",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Displayed for/against tally. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    #[serde(rename = "for")]
    pub for_votes: u64,
    pub against: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub status: BillStatus,
    /// Free text, e.g. "Introduced on Aug 3, 2023". Not a structured date.
    pub date: String,
    pub vote_count: VoteCount,
}

/// A user's per-detail-view choice. `None` means no vote cast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserVote {
    #[default]
    None,
    For,
    Against,
    Abstain,
}

impl UserVote {
    /// Choice after clicking `clicked`: clicking the current choice retracts it.
    pub fn toggled(self, clicked: UserVote) -> UserVote {
        if self == clicked {
            UserVote::None
        } else {
            clicked
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewpoints {
    pub pro: String,
    pub con: String,
    pub neutral: String,
}

/// Impact on one sector; both scores lie in [-100, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactPoint {
    pub name: String,
    pub if_passed: f64,
    pub if_not_passed: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateSegment {
    pub speaker: String,
    pub party: String,
    pub statement: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
    News,
}

impl MediaKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "news" => Some(Self::News),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::News => "News",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub title: String,
    pub description: String,
    /// Only ever set for `MediaKind::News`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapBranch {
    pub title: String,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    pub central_topic: String,
    pub branches: Vec<MindMapBranch>,
}

/// AI-generated explanatory bundle for one bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillAnalysis {
    pub explanation: String,
    pub viewpoints: Viewpoints,
    pub impact: Vec<ImpactPoint>,
    pub debate: Vec<DebateSegment>,
    pub media: Vec<MediaItem>,
    pub flashcards: Vec<Flashcard>,
    pub mind_map: MindMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Ai,
}

/// One entry in a discussion thread. Ids are unique within a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub author: Author,
    pub name: String,
    pub text: String,
}

impl ChatMessage {
    pub fn ai(id: u64, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            author: Author::Ai,
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            author: Author::User,
            name: USER_DISPLAY_NAME.to_string(),
            text: text.into(),
        }
    }
}

/// Display name of the local participant.
pub const USER_DISPLAY_NAME: &str = "You";

/// Author of the apology message appended when a discussion turn cannot be generated.
pub const ADMIN_DISPLAY_NAME: &str = "Admin";

/// Simulated forum participants the generation service may speak as.
pub const PARTICIPANT_ROSTER: &[&str] = &[
    "Priya K.",
    "Rohan S.",
    "Anjali M.",
    "Vikram C.",
    "Sameer P.",
    "Neha G.",
];

/// Languages offered for analysis output.
pub const LANGUAGES: &[&str] = &[
    "Assamese", "Bengali", "Bodo", "Dogri", "English", "Gujarati", "Hindi", "Kannada",
    "Kashmiri", "Konkani", "Maithili", "Malayalam", "Manipuri", "Marathi", "Nepali", "Odia",
    "Punjabi", "Sanskrit", "Santali", "Sindhi", "Tamil", "Telugu", "Urdu",
];

pub const DEFAULT_LANGUAGE: &str = "English";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_are_loose() {
        assert_eq!(BillStatus::from_label("In Process"), Some(BillStatus::InProcess));
        assert_eq!(BillStatus::from_label("in-process"), Some(BillStatus::InProcess));
        assert_eq!(BillStatus::from_label("PASSED"), Some(BillStatus::Passed));
        assert_eq!(BillStatus::from_label("vetoed"), None);
    }

    #[test]
    fn clicking_the_same_vote_retracts_it() {
        assert_eq!(UserVote::For.toggled(UserVote::For), UserVote::None);
        assert_eq!(UserVote::For.toggled(UserVote::Against), UserVote::Against);
        assert_eq!(UserVote::None.toggled(UserVote::Abstain), UserVote::Abstain);
    }

    #[test]
    fn vote_count_serializes_with_for_key() {
        let json = serde_json::to_value(VoteCount { for_votes: 3, against: 1 }).unwrap();
        assert_eq!(json, serde_json::json!({ "for": 3, "against": 1 }));
    }
}
