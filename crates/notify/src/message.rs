//! Notification message model handed to chat channels.

use chrono::{DateTime, Utc};

/// Embed color for a notification, one per event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Something was created
    Success,
    /// Something changed
    Warning,
    /// Something was removed
    Danger,
    /// Someone said something
    Info,
    /// Anything we don't have a dedicated style for
    Neutral,
}

impl Color {
    /// Get the RGB value for this color (for embeds).
    #[must_use]
    pub const fn rgb(&self) -> u32 {
        match self {
            Self::Success => 0x0000_ff00, // Green
            Self::Warning => 0x00ff_aa00, // Amber
            Self::Danger => 0x00ff_0000,  // Red
            Self::Info => 0x0000_99ff,    // Blue
            Self::Neutral => 0x0066_6666, // Gray
        }
    }
}

/// A labelled value shown under the message description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field label
    pub name: String,
    /// Field value
    pub value: String,
    /// Whether the field may share a row with its neighbours
    pub inline: bool,
}

impl Field {
    /// A field that may be laid out side by side with other inline fields.
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: true,
        }
    }

    /// A field that always takes a full row.
    pub fn block(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }
}

/// A structured, human-readable notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// Short headline
    pub title: String,
    /// Body text (markdown)
    pub description: String,
    /// Category color
    pub color: Color,
    /// When the underlying event happened, if known
    pub timestamp: Option<DateTime<Utc>>,
    /// Ordered field list
    pub fields: Vec<Field>,
}

impl NotificationMessage {
    /// Look up the value of the first field with the given label.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors() {
        assert_eq!(Color::Success.rgb(), 0x00ff00);
        assert_eq!(Color::Warning.rgb(), 0xffaa00);
        assert_eq!(Color::Danger.rgb(), 0xff0000);
        assert_eq!(Color::Info.rgb(), 0x0099ff);
        assert_eq!(Color::Neutral.rgb(), 0x666666);
    }

    #[test]
    fn test_field_constructors() {
        let f = Field::inline("List", "Backlog");
        assert!(f.inline);
        let f = Field::block("Comment", "hi");
        assert!(!f.inline);
    }

    #[test]
    fn test_field_lookup() {
        let message = NotificationMessage {
            title: "t".to_string(),
            description: "d".to_string(),
            color: Color::Info,
            timestamp: None,
            fields: vec![Field::inline("A", "1"), Field::inline("B", "2")],
        };
        assert_eq!(message.field("B"), Some("2"));
        assert_eq!(message.field("C"), None);
    }
}
