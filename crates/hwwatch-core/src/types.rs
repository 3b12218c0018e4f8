//! Domain types for the review-status API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of a homework, with its fixed human-readable verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    /// Wire code as sent by the API.
    pub fn code(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "The work has been reviewed: the reviewer liked everything. Hooray!",
            Self::Reviewing => "The work has been taken for review.",
            Self::Rejected => "The work has been reviewed: the reviewer left some remarks.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The most recent homework reported by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRecord {
    pub name: String,
    pub status: HomeworkStatus,
}

impl TrackedRecord {
    /// Notification text. Identical records always render identical text.
    pub fn message(&self) -> String {
        format!(
            "Review status of \"{}\" changed. {}",
            self.name,
            self.status.verdict()
        )
    }
}
