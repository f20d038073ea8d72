//! Content kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The family a content item (and its scheduled children) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A dated event, optionally at a place.
    Event,
    /// A news item.
    New,
    /// A student benefit.
    Benefit,
}

impl ContentKind {
    /// All kinds in dispatch order.
    pub const ALL: [Self; 3] = [Self::Event, Self::New, Self::Benefit];

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::New => "new",
            Self::Benefit => "benefit",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "event" | "events" => Ok(Self::Event),
            "new" | "news" => Ok(Self::New),
            "benefit" | "benefits" => Ok(Self::Benefit),
            other => Err(format!("unknown content kind '{other}'")),
        }
    }
}
