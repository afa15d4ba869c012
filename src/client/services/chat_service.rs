//! Client-local chat sessions. Nothing here touches the store: message
//! history exists only while the chat view is open, matching the original
//! product behavior.

use crate::common::models::{ChatMessage, ChatSession, Profile, LOCAL_SENDER};
use chrono::Utc;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ChatService;

impl ChatService {
    /// Opens a fresh, empty session with a matched participant.
    pub fn open_session(participant: Profile) -> ChatSession {
        ChatSession {
            participant,
            messages: Vec::new(),
        }
    }

    /// Appends a message from the local user. Blank input is ignored.
    pub fn send_message<'a>(session: &'a mut ChatSession, text: &str) -> Option<&'a ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        session.messages.push(ChatMessage {
            id: Uuid::new_v4().to_string(),
            sender_id: LOCAL_SENDER.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        });
        session.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::models::UserRole;

    fn participant() -> Profile {
        Profile {
            id: "cg-anna".to_string(),
            name: "Anna".to_string(),
            role: UserRole::Caregiver,
            photo: String::new(),
            location: "Berlin".to_string(),
            bio: String::new(),
            tags: Vec::new(),
            rating: 5.0,
        }
    }

    #[test]
    fn send_message_returns_the_appended_message() {
        let mut session = ChatService::open_session(participant());
        let sent = ChatService::send_message(&mut session, "  hello  ").unwrap();
        assert_eq!(sent.text, "hello");
        assert_eq!(sent.sender_id, LOCAL_SENDER);
        assert_eq!(session.messages.len(), 1);
    }

    #[test]
    fn blank_input_is_dropped() {
        let mut session = ChatService::open_session(participant());
        assert!(ChatService::send_message(&mut session, "   ").is_none());
        assert!(session.messages.is_empty());
    }
}
