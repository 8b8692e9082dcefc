//! "Ask about this trait" hand-off from the profile view to chat

use std::time::{Duration, Instant};

use crate::profile::format_trait;

/// Navigation payload carried from a trait card into the chat view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDeepLink {
    pub trait_key: String,
    pub label: String,
}

impl ChatDeepLink {
    pub fn new(trait_key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            trait_key: trait_key.into(),
            label: label.into(),
        }
    }

    /// Question pre-filled into the chat input
    pub fn question(&self) -> String {
        format!(
            "Why is my {} \"{}\"? What does that mean for my study options?",
            format_trait(&self.trait_key).to_lowercase(),
            self.label
        )
    }
}

/// Pending deep link. Fires once after a short settle delay, then is gone
/// for good so returning to the chat view never re-sends it.
#[derive(Debug, Default)]
pub struct DeepLinkSlot {
    pending: Option<(ChatDeepLink, Instant)>,
}

impl DeepLinkSlot {
    /// Arm the slot; the question becomes due after `delay`
    pub fn arm(&mut self, link: ChatDeepLink, delay: Duration) {
        self.pending = Some((link, Instant::now() + delay));
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Text to show in the input while waiting
    pub fn preview(&self) -> Option<String> {
        self.pending.as_ref().map(|(link, _)| link.question())
    }

    /// The question to send if it is due at `now`; clears the slot
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        let due = matches!(&self.pending, Some((_, due)) if now >= *due);
        if !due {
            return None;
        }
        self.pending.take().map(|(link, _)| link.question())
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_template() {
        let link = ChatDeepLink::new("learning_style", "Hands-on");
        assert_eq!(
            link.question(),
            "Why is my learning style \"Hands-on\"? What does that mean for my study options?"
        );
    }

    #[test]
    fn test_fires_once_after_delay() {
        let mut slot = DeepLinkSlot::default();
        slot.arm(ChatDeepLink::new("goal", "Become a doctor"), Duration::from_millis(500));
        let now = Instant::now();
        assert!(slot.take_due(now).is_none());
        assert!(slot.preview().is_some());

        let later = now + Duration::from_secs(1);
        assert!(slot.take_due(later).is_some());
        assert!(slot.take_due(later).is_none());
        assert!(!slot.is_armed());
    }
}
