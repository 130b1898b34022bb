//! Server line classifier.
//!
//! Maps one complete server line onto an [`Event`]. Patterns are tried in a
//! fixed order and the first match wins:
//!
//! | Line                          | Event                    |
//! |-------------------------------|--------------------------|
//! | `OK:<group>`                  | `Joined`                 |
//! | `[SYSTEM] <text>`             | `SystemNotice`           |
//! | `[<group>] <author>: <text>`  | `ChatMessage`            |
//! | `AUTH_FAILED`                 | `AuthRejected`           |
//! | anything else                 | `Unrecognized`           |

use super::event::Event;

const JOINED_PREFIX: &str = "OK:";
const SYSTEM_PREFIX: &str = "[SYSTEM]";
const AUTH_FAILED: &str = "AUTH_FAILED";

/// Classify a single newline-stripped server line.
pub fn classify(line: &str) -> Event {
    if let Some(group) = line.strip_prefix(JOINED_PREFIX) {
        return Event::Joined {
            group: group.to_string(),
        };
    }

    if let Some(rest) = line.strip_prefix(SYSTEM_PREFIX) {
        let text = rest.strip_prefix(' ').unwrap_or(rest);
        return Event::SystemNotice {
            text: text.to_string(),
        };
    }

    if let Some(event) = parse_chat(line) {
        return event;
    }

    if line.trim() == AUTH_FAILED {
        return Event::AuthRejected;
    }

    Event::Unrecognized {
        raw: line.to_string(),
    }
}

/// Parse `[<group>] <author>: <text>`.
///
/// The first `]` closes the group and the first `:` after it separates author
/// from text, so colons inside the message body are preserved.
fn parse_chat(line: &str) -> Option<Event> {
    let inner = line.strip_prefix('[')?;
    let (group, body) = inner.split_once(']')?;
    let (author, text) = body.split_once(':')?;

    let group = group.trim();
    Some(Event::ChatMessage {
        group: (!group.is_empty()).then(|| group.to_string()),
        author: author.trim().to_string(),
        text: text.trim().to_string(),
    })
}
