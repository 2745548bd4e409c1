//! Discussion thread for one bill detail view.

use crate::model::{ChatMessage, PARTICIPANT_ROSTER};

const OPENING_LINES: [&str; 2] = [
    "Finally, they're discussing this. It's long overdue.",
    "I'm not so sure. The details matter a lot here. Thoda skeptical hoon main.",
];

/// Append-only message log with a single in-flight turn.
#[derive(Debug, Clone)]
pub struct ChatThread {
    messages: Vec<ChatMessage>,
    in_flight: bool,
}

impl Default for ChatThread {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatThread {
    /// A thread seeded with the two scripted opening messages.
    pub fn new() -> Self {
        let messages = PARTICIPANT_ROSTER
            .iter()
            .zip(OPENING_LINES)
            .enumerate()
            .map(|(i, (name, text))| ChatMessage::ai(i as u64 + 1, *name, text))
            .collect();
        Self {
            messages,
            in_flight: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Append the user's message and mark a turn in flight. Returns the thread to send to the
    /// gateway, or None (thread unchanged) when `text` is blank or a turn is already running.
    pub fn begin_submit(&mut self, text: &str) -> Option<Vec<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() || self.in_flight {
            return None;
        }
        let id = self.next_id(chrono::Utc::now().timestamp_millis().max(0) as u64);
        self.messages.push(ChatMessage::user(id, text));
        self.in_flight = true;
        Some(self.messages.clone())
    }

    /// Finish the running turn by appending `replies`. Ids are re-stamped where needed so they
    /// stay unique and increasing within the thread.
    pub fn complete(&mut self, replies: Vec<ChatMessage>) {
        self.in_flight = false;
        for mut reply in replies {
            reply.id = self.next_id(reply.id);
            self.messages.push(reply);
        }
    }

    fn next_id(&self, candidate: u64) -> u64 {
        match self.messages.last() {
            Some(last) => candidate.max(last.id + 1),
            None => candidate.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Author, USER_DISPLAY_NAME};
    use std::collections::HashSet;

    #[test]
    fn starts_with_two_seeded_messages() {
        let thread = ChatThread::new();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread.messages()[0].name, "Priya K.");
        assert_eq!(thread.messages()[1].name, "Rohan S.");
        assert!(!thread.in_flight());
    }

    #[test]
    fn blank_submit_is_a_no_op() {
        let mut thread = ChatThread::new();
        assert!(thread.begin_submit("   \n").is_none());
        assert_eq!(thread.len(), 2);
        assert!(!thread.in_flight());
    }

    #[test]
    fn submit_is_optimistic_and_blocks_a_second_turn() {
        let mut thread = ChatThread::new();
        let snapshot = thread.begin_submit("  What about farmers? ").unwrap();
        assert_eq!(snapshot.len(), 3);
        let last = snapshot.last().unwrap();
        assert_eq!(last.author, Author::User);
        assert_eq!(last.name, USER_DISPLAY_NAME);
        assert_eq!(last.text, "What about farmers?");

        assert!(thread.begin_submit("again").is_none());
        assert_eq!(thread.len(), 3);

        thread.complete(vec![ChatMessage::ai(5, "Neha G.", "Farmers benefit.")]);
        assert!(!thread.in_flight());
        assert_eq!(thread.len(), 4);
        assert!(thread.begin_submit("again").is_some());
    }

    #[test]
    fn ids_stay_unique_and_increasing() {
        let mut thread = ChatThread::new();
        thread.begin_submit("hi").unwrap();
        thread.complete(vec![
            ChatMessage::ai(1, "Anjali M.", "one"),
            ChatMessage::ai(1, "Vikram C.", "two"),
        ]);
        let ids: Vec<u64> = thread.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "{ids:?}");
        let unique: HashSet<u64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
