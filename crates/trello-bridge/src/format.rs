//! Turns Trello events into chat notifications.
//!
//! Each [`EventKind`] maps to one [`Template`]; adding a kind means adding a
//! row to [`template`], not another branch in the formatter.

use chrono::{DateTime, NaiveDateTime, Utc};
use notify::{Color, Field, NotificationMessage};
use serde_json::Value;
use tracing::{debug, error};

use crate::events::EventKind;
use crate::webhooks::TrelloEvent;

/// Placeholder for names missing from the payload.
const UNKNOWN: &str = "Unknown";

/// Longest comment, in characters, shown before truncating.
pub const COMMENT_LIMIT: usize = 1000;

/// Suffix appended to truncated comments.
const ELLIPSIS: &str = "...";

/// Presentation rules for one event kind.
struct Template {
    title: &'static str,
    color: Color,
    describe: fn(&TrelloEvent) -> String,
    fields: fn(&TrelloEvent) -> Vec<Field>,
}

static CARD_CREATED: Template = Template {
    title: "New Card Created",
    color: Color::Success,
    describe: card_headline,
    fields: created_fields,
};

static CARD_UPDATED: Template = Template {
    title: "Card Updated",
    color: Color::Warning,
    describe: card_headline,
    fields: updated_fields,
};

static CARD_DELETED: Template = Template {
    title: "Card Deleted",
    color: Color::Danger,
    describe: card_headline,
    fields: deleted_fields,
};

static CARD_COMMENTED: Template = Template {
    title: "New Comment",
    color: Color::Info,
    describe: card_headline,
    fields: commented_fields,
};

static GENERIC: Template = Template {
    title: "Generic Update",
    color: Color::Neutral,
    describe: action_headline,
    fields: generic_fields,
};

fn template(kind: EventKind) -> &'static Template {
    match kind {
        EventKind::CardCreated => &CARD_CREATED,
        EventKind::CardUpdated => &CARD_UPDATED,
        EventKind::CardDeleted => &CARD_DELETED,
        EventKind::CardCommented => &CARD_COMMENTED,
        EventKind::Unknown => &GENERIC,
    }
}

/// Build the notification for an event.
///
/// Never fails. Missing names render as `Unknown` and missing text as an
/// empty string. A date that cannot be parsed is logged and leaves the
/// timestamp empty.
#[must_use]
pub fn format_event(event: &TrelloEvent) -> NotificationMessage {
    let template = template(event.kind());

    NotificationMessage {
        title: template.title.to_string(),
        description: (template.describe)(event),
        color: template.color,
        timestamp: event_timestamp(event),
        fields: (template.fields)(event),
    }
}

/// Parse an ISO-8601 Trello date into UTC.
///
/// Accepts a trailing `Z` or an explicit offset; a date without any zone is
/// taken to be UTC.
///
/// # Errors
/// Returns the chrono parse error if the string is not a recognizable date.
pub fn parse_timestamp(date: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(date)
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|e| {
            NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .map_err(|_| e)
        })
}

/// Shorten a comment to [`COMMENT_LIMIT`] characters plus an ellipsis.
#[must_use]
pub fn truncate_comment(text: &str) -> String {
    match text.char_indices().nth(COMMENT_LIMIT) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

fn event_timestamp(event: &TrelloEvent) -> Option<DateTime<Utc>> {
    let Some(date) = event.date() else {
        debug!(action_type = ?event.action_type(), "Trello action has no date");
        return None;
    };

    match parse_timestamp(date) {
        Ok(ts) => Some(ts),
        Err(e) => {
            error!(
                date = %date,
                action_type = ?event.action_type(),
                error = %e,
                "Unparseable Trello action date, sending without timestamp"
            );
            None
        }
    }
}

fn member(event: &TrelloEvent) -> &str {
    event.member_name().unwrap_or(UNKNOWN)
}

fn card_headline(event: &TrelloEvent) -> String {
    format!("**{}**", event.card_name().unwrap_or(UNKNOWN))
}

fn action_headline(event: &TrelloEvent) -> String {
    format!("Action: {}", event.action_type().unwrap_or(UNKNOWN))
}

fn created_fields(event: &TrelloEvent) -> Vec<Field> {
    vec![
        Field::inline("List", event.list_name().unwrap_or(UNKNOWN)),
        Field::inline("Creator", member(event)),
    ]
}

fn updated_fields(event: &TrelloEvent) -> Vec<Field> {
    let mut fields = vec![];

    if let Some(old_name) = event.old_value("name") {
        fields.push(Field::block(
            "Name Changed",
            format!(
                "From: {}\nTo: {}",
                display_value(old_name),
                event.card_name().unwrap_or(UNKNOWN)
            ),
        ));
    }
    if event.old_value("desc").is_some() {
        fields.push(Field::block(
            "Description Updated",
            "Description was modified",
        ));
    }
    if event.old_value("pos").is_some() {
        fields.push(Field::block("Position Changed", "Card was moved"));
    }

    fields.push(Field::inline("Updated by", member(event)));
    fields
}

fn deleted_fields(event: &TrelloEvent) -> Vec<Field> {
    vec![Field::inline("Deleted by", member(event))]
}

fn commented_fields(event: &TrelloEvent) -> Vec<Field> {
    vec![
        Field::block(
            "Comment",
            truncate_comment(event.comment_text().unwrap_or_default()),
        ),
        Field::inline("Comment by", member(event)),
    ]
}

fn generic_fields(event: &TrelloEvent) -> Vec<Field> {
    vec![Field::inline("User", member(event))]
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => UNKNOWN.to_string(),
        other => other.to_string(),
    }
}
