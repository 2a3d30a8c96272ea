//! Structural change notifications emitted by the tree engine.

use std::fmt;

/// One structural change, rendered as a single change-log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// An insertion passed through `parent` on its way down.
    Welcomed { parent: String, newcomer: String },
    /// A member was removed; `replacement` took its place (None for a leaf).
    Departed {
        departed: String,
        replacement: Option<String>,
    },
}

impl ChangeEvent {
    pub fn welcomed(parent: &str, newcomer: &str) -> Self {
        Self::Welcomed {
            parent: parent.to_string(),
            newcomer: newcomer.to_string(),
        }
    }

    pub fn departed(departed: &str, replacement: Option<&str>) -> Self {
        Self::Departed {
            departed: departed.to_string(),
            replacement: replacement.map(str::to_string),
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeEvent::Welcomed { parent, newcomer } => {
                write!(f, "{} welcomed {}", parent, newcomer)
            }
            ChangeEvent::Departed {
                departed,
                replacement,
            } => write!(
                f,
                "{} left the family, replaced by {}",
                departed,
                replacement.as_deref().unwrap_or("nobody")
            ),
        }
    }
}

/// Append-only sink for change events, fed in emission order.
pub trait ChangeLog {
    fn record(&mut self, event: ChangeEvent);
}

impl ChangeLog for Vec<ChangeEvent> {
    fn record(&mut self, event: ChangeEvent) {
        self.push(event);
    }
}

/// Change log that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl ChangeLog for Discard {
    fn record(&mut self, _event: ChangeEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_welcome_when_displayed_then_names_parent_first() {
        let event = ChangeEvent::welcomed("Vito", "Michael");
        assert_eq!(event.to_string(), "Vito welcomed Michael");
    }

    #[test]
    fn given_departure_without_replacement_when_displayed_then_says_nobody() {
        let event = ChangeEvent::departed("Sonny", None);
        assert_eq!(event.to_string(), "Sonny left the family, replaced by nobody");
    }

    #[test]
    fn given_departure_with_replacement_when_displayed_then_names_heir() {
        let event = ChangeEvent::departed("Vito", Some("Michael"));
        assert_eq!(
            event.to_string(),
            "Vito left the family, replaced by Michael"
        );
    }

    #[test]
    fn given_discard_when_recording_then_nothing_is_kept() {
        let mut log = Discard;
        log.record(ChangeEvent::welcomed("a", "b"));

        let mut kept: Vec<ChangeEvent> = Vec::new();
        kept.record(ChangeEvent::welcomed("a", "b"));
        assert_eq!(kept.len(), 1);
    }
}
