//! Trello event classification.

/// The kinds of Trello action this bridge distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `createCard`
    CardCreated,
    /// `updateCard`
    CardUpdated,
    /// `deleteCard`
    CardDeleted,
    /// `commentCard`
    CardCommented,
    /// Anything else, including a missing type
    Unknown,
}

/// Action type tags that map to a dedicated kind.
const ACTION_TYPES: [(&str, EventKind); 4] = [
    ("createCard", EventKind::CardCreated),
    ("updateCard", EventKind::CardUpdated),
    ("deleteCard", EventKind::CardDeleted),
    ("commentCard", EventKind::CardCommented),
];

/// Classify a raw Trello action type.
#[must_use]
pub fn classify(action_type: Option<&str>) -> EventKind {
    action_type
        .and_then(|tag| ACTION_TYPES.iter().find(|(known, _)| *known == tag))
        .map_or(EventKind::Unknown, |(_, kind)| *kind)
}

impl EventKind {
    /// Whether events of this kind are posted to the chat channel.
    #[must_use]
    pub const fn is_actionable(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Display name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CardCreated => "card_created",
            Self::CardUpdated => "card_updated",
            Self::CardDeleted => "card_deleted",
            Self::CardCommented => "card_commented",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
